//! Validation Rules
//!
//! Field-level and cross-field checks that guard the estimation engine.
//! Everything here is pure: a value goes in, an optional message comes out.

mod construction;
pub mod rules;

pub use construction::{requirement, ConstructionRequirement};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{ConstructionType, ContactDetails, CoverageLevel, IntakeForm, SiteProfile};

/// Form fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    SiteSize,
    Floors,
    Stairs,
    ConstructionType,
    CoverageLevel,
    Name,
    CompanyName,
    Email,
    Phone,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::SiteSize,
        Field::Floors,
        Field::Stairs,
        Field::ConstructionType,
        Field::CoverageLevel,
        Field::Name,
        Field::CompanyName,
        Field::Email,
        Field::Phone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::SiteSize => "siteSize",
            Field::Floors => "floors",
            Field::Stairs => "stairs",
            Field::ConstructionType => "constructionType",
            Field::CoverageLevel => "coverageLevel",
            Field::Name => "name",
            Field::CompanyName => "companyName",
            Field::Email => "email",
            Field::Phone => "phone",
        }
    }

    /// Site fields must be present; contact fields are checked only when filled in.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Field::SiteSize | Field::Floors | Field::Stairs | Field::ConstructionType | Field::CoverageLevel
        )
    }

    fn value<'a>(&self, form: &'a IntakeForm) -> &'a str {
        match self {
            Field::SiteSize => &form.site_size,
            Field::Floors => &form.floors,
            Field::Stairs => &form.stairs,
            Field::ConstructionType => &form.construction_type,
            Field::CoverageLevel => &form.coverage_level,
            Field::Name => &form.name,
            Field::CompanyName => &form.company_name,
            Field::Email => &form.email,
            Field::Phone => &form.phone,
        }
    }

    fn required_message(&self) -> &'static str {
        match self {
            Field::SiteSize => rules::SITE_SIZE_REQUIRED,
            Field::Floors => rules::FLOORS_REQUIRED,
            Field::Stairs => rules::STAIRS_REQUIRED,
            _ => rules::REQUIRED,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Field → message map. Empty means the input is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Add `other`'s messages for fields that do not already have one.
    pub fn merge_missing(&mut self, other: ValidationErrors) {
        for (field, message) in other.0 {
            self.0.entry(field).or_insert(message);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(field, msg)| format!("{}: {}", field, msg)).collect();
        write!(f, "validation failed ({})", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a single field. `form` supplies context for rules that depend on
/// other fields (staircases are bounded by the floor count).
pub fn validate_field(field: Field, value: &str, form: &IntakeForm) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return field.is_required().then(|| field.required_message().to_string());
    }

    match field {
        Field::SiteSize => match rules::parse_number(value) {
            None => Some(rules::SITE_SIZE_INVALID.to_string()),
            Some(size) => rules::site_size_error(size),
        },
        Field::Floors => match rules::parse_number(value) {
            None => Some(rules::FLOORS_INVALID.to_string()),
            Some(floors) => rules::floors_error(floors),
        },
        Field::Stairs => match rules::parse_number(value) {
            None => Some(rules::STAIRS_INVALID.to_string()),
            Some(stairs) => {
                let floors = rules::parse_number(&form.floors).filter(|f| rules::floors_error(*f).is_none());
                rules::stairs_error(stairs, floors)
            }
        },
        Field::ConstructionType => value
            .parse::<ConstructionType>()
            .err()
            .map(|_| rules::CONSTRUCTION_TYPE_INVALID.to_string()),
        Field::CoverageLevel => value
            .parse::<CoverageLevel>()
            .err()
            .map(|_| rules::COVERAGE_LEVEL_INVALID.to_string()),
        Field::Name => (!rules::NAME.is_match(value)).then(|| rules::NAME_INVALID.to_string()),
        Field::CompanyName => {
            (!rules::COMPANY_NAME.is_match(value)).then(|| rules::COMPANY_NAME_INVALID.to_string())
        }
        Field::Email => (!rules::EMAIL.is_match(value)).then(|| rules::EMAIL_INVALID.to_string()),
        Field::Phone => (!rules::PHONE.is_match(value)).then(|| rules::PHONE_INVALID.to_string()),
    }
}

/// Rules that span more than one field.
pub fn validate_cross_fields(profile: &SiteProfile) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if profile.floors == 0 {
        // Nothing to relate the other fields to; the floors rule reports this.
        return errors;
    }

    let floors = profile.floors as f64;
    if profile.staircases as f64 / floors > rules::STAIRS_PER_FLOOR_MAX {
        errors.insert(Field::Stairs, rules::stairs_per_floor_msg());
    }
    if profile.site_size_sq_ft / floors < rules::MIN_AREA_PER_FLOOR {
        errors.insert(Field::SiteSize, rules::area_per_floor_msg());
    }
    errors
}

/// Full check of an already-typed profile: bounds first, then cross-field rules.
pub fn validate_profile(profile: &SiteProfile) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let floors = profile.floors as f64;

    if !profile.site_size_sq_ft.is_finite() {
        errors.insert(Field::SiteSize, rules::SITE_SIZE_INVALID);
    } else if let Some(msg) = rules::site_size_error(profile.site_size_sq_ft) {
        errors.insert(Field::SiteSize, msg);
    }
    let floors_msg = rules::floors_error(floors);
    if let Some(msg) = floors_msg.clone() {
        errors.insert(Field::Floors, msg);
    }
    let floors_ctx = floors_msg.is_none().then_some(floors);
    if let Some(msg) = rules::stairs_error(profile.staircases as f64, floors_ctx) {
        errors.insert(Field::Stairs, msg);
    }

    errors.merge_missing(validate_cross_fields(profile));
    errors.into_result()
}

impl IntakeForm {
    /// Run every field rule, then the cross-field rules, and produce typed records.
    pub fn validate(&self) -> Result<(SiteProfile, ContactDetails), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in Field::ALL {
            if let Some(msg) = validate_field(field, field.value(self), self) {
                errors.insert(field, msg);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let profile = self.to_profile().ok_or_else(|| {
            let mut e = ValidationErrors::new();
            e.insert(Field::SiteSize, rules::SITE_SIZE_INVALID);
            e
        })?;
        validate_cross_fields(&profile).into_result()?;
        Ok((profile, self.contact()))
    }

    fn to_profile(&self) -> Option<SiteProfile> {
        Some(SiteProfile {
            site_size_sq_ft: rules::parse_number(&self.site_size)?,
            floors: rules::parse_number(&self.floors)? as u32,
            staircases: rules::parse_number(&self.stairs)? as u32,
            construction_type: self.construction_type.parse().ok()?,
            coverage_level: self.coverage_level.parse().ok()?,
            interface_integration: self.interface_integration,
            react_integration: self.react_integration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(site: &str, floors: &str, stairs: &str) -> IntakeForm {
        IntakeForm {
            site_size: site.into(),
            floors: floors.into(),
            stairs: stairs.into(),
            construction_type: "commercial".into(),
            coverage_level: "max".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_required_precedes_type_checks() {
        let f = form("", "", "");
        assert_eq!(validate_field(Field::SiteSize, "", &f).unwrap(), rules::SITE_SIZE_REQUIRED);
        assert_eq!(validate_field(Field::Floors, "  ", &f).unwrap(), rules::FLOORS_REQUIRED);
        assert_eq!(validate_field(Field::ConstructionType, "", &f).unwrap(), rules::REQUIRED);
    }

    #[test]
    fn test_optional_contact_fields_skip_when_blank() {
        let f = form("1000", "1", "1");
        assert!(validate_field(Field::Email, "", &f).is_none());
        assert!(validate_field(Field::Phone, "", &f).is_none());
        assert_eq!(validate_field(Field::Email, "nope", &f).unwrap(), rules::EMAIL_INVALID);
        assert_eq!(validate_field(Field::Name, "A", &f).unwrap(), rules::NAME_INVALID);
    }

    #[test]
    fn test_numeric_bounds() {
        let f = form("1000", "2", "1");
        assert!(validate_field(Field::SiteSize, "100", &f).is_none());
        assert_eq!(validate_field(Field::SiteSize, "99", &f).unwrap(), rules::SITE_SIZE_MIN_MSG);
        assert_eq!(validate_field(Field::SiteSize, "1000001", &f).unwrap(), rules::SITE_SIZE_MAX_MSG);
        assert_eq!(validate_field(Field::SiteSize, "big", &f).unwrap(), rules::SITE_SIZE_INVALID);
        assert_eq!(validate_field(Field::Floors, "0", &f).unwrap(), rules::FLOORS_MIN_MSG);
        assert_eq!(validate_field(Field::Floors, "201", &f).unwrap(), rules::FLOORS_MAX_MSG);
        assert_eq!(validate_field(Field::Floors, "2.5", &f).unwrap(), rules::FLOORS_INVALID);
        assert_eq!(validate_field(Field::Stairs, "0", &f).unwrap(), rules::STAIRS_MIN_MSG);
        assert!(validate_field(Field::Stairs, "40", &f).is_none());
        assert_eq!(
            validate_field(Field::Stairs, "41", &f).unwrap(),
            "Maximum 40 staircases allowed for 2 floors"
        );
    }

    #[test]
    fn test_cross_field_area_per_floor() {
        let profile = SiteProfile {
            site_size_sq_ft: 500.0,
            floors: 10,
            staircases: 1,
            construction_type: ConstructionType::Residential,
            coverage_level: CoverageLevel::Low,
            interface_integration: false,
            react_integration: false,
        };
        let errors = validate_cross_fields(&profile);
        assert_eq!(errors.get(Field::SiteSize), Some("Minimum 100 sq ft required per floor"));
        assert!(!errors.contains(Field::Stairs));
    }

    #[test]
    fn test_cross_field_stairs_per_floor() {
        let profile = SiteProfile {
            site_size_sq_ft: 5000.0,
            floors: 1,
            staircases: 21,
            construction_type: ConstructionType::Residential,
            coverage_level: CoverageLevel::Low,
            interface_integration: false,
            react_integration: false,
        };
        let errors = validate_cross_fields(&profile);
        assert_eq!(errors.get(Field::Stairs), Some("Maximum 20 staircases allowed per floor"));
    }

    #[test]
    fn test_form_validate_minimum_boundary() {
        let (profile, contact) = form("100", "1", "1").validate().unwrap();
        assert_eq!(profile.site_size_sq_ft, 100.0);
        assert_eq!(profile.floors, 1);
        assert_eq!(contact, ContactDetails::default());
    }

    #[test]
    fn test_form_validate_collects_every_error() {
        let mut f = form("99", "abc", "");
        f.email = "bad".into();
        let errors = f.validate().unwrap_err();
        assert_eq!(errors.get(Field::SiteSize), Some(rules::SITE_SIZE_MIN_MSG));
        assert_eq!(errors.get(Field::Floors), Some(rules::FLOORS_INVALID));
        assert_eq!(errors.get(Field::Stairs), Some(rules::STAIRS_REQUIRED));
        assert_eq!(errors.get(Field::Email), Some(rules::EMAIL_INVALID));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_form_validate_cross_field_failure() {
        let errors = form("1000", "20", "1").validate().unwrap_err();
        assert_eq!(errors.get(Field::SiteSize), Some("Minimum 100 sq ft required per floor"));
    }

    #[test]
    fn test_validate_profile_prefers_field_message() {
        let profile = SiteProfile {
            site_size_sq_ft: 99.0,
            floors: 1,
            staircases: 1,
            construction_type: ConstructionType::Marine,
            coverage_level: CoverageLevel::Max,
            interface_integration: false,
            react_integration: false,
        };
        let errors = validate_profile(&profile).unwrap_err();
        assert_eq!(errors.get(Field::SiteSize), Some(rules::SITE_SIZE_MIN_MSG));
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::SiteSize, "x");
        assert_eq!(serde_json::to_string(&errors).unwrap(), r#"{"siteSize":"x"}"#);
    }
}
