use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Building construction category. Drives the minimum detector density,
/// egress call-point bonus and interface hardware ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructionType {
    Residential,
    Commercial,
    Industrial,
    Marine,
}

impl ConstructionType {
    pub const ALL: [ConstructionType; 4] = [
        ConstructionType::Residential,
        ConstructionType::Commercial,
        ConstructionType::Industrial,
        ConstructionType::Marine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructionType::Residential => "residential",
            ConstructionType::Commercial => "commercial",
            ConstructionType::Industrial => "industrial",
            ConstructionType::Marine => "marine",
        }
    }
}

impl std::fmt::Display for ConstructionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConstructionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "residential" => Ok(ConstructionType::Residential),
            "commercial" => Ok(ConstructionType::Commercial),
            "industrial" => Ok(ConstructionType::Industrial),
            "marine" => Ok(ConstructionType::Marine),
            other => Err(format!("unknown construction type '{}'", other)),
        }
    }
}

/// Requested coverage level. `Max` is the strictest (densest) layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLevel {
    Max,
    Medium,
    Low,
}

impl CoverageLevel {
    pub const ALL: [CoverageLevel; 3] = [CoverageLevel::Max, CoverageLevel::Medium, CoverageLevel::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageLevel::Max => "max",
            CoverageLevel::Medium => "medium",
            CoverageLevel::Low => "low",
        }
    }
}

impl std::fmt::Display for CoverageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CoverageLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "max" => Ok(CoverageLevel::Max),
            "medium" => Ok(CoverageLevel::Medium),
            "low" => Ok(CoverageLevel::Low),
            other => Err(format!("unknown coverage level '{}'", other)),
        }
    }
}

/// Validated site parameters. Only constructed through validation, so every
/// calculator can assume positive floors, staircases and area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProfile {
    pub site_size_sq_ft: f64,
    pub floors: u32,
    pub staircases: u32,
    pub construction_type: ConstructionType,
    pub coverage_level: CoverageLevel,
    #[serde(default)]
    pub interface_integration: bool,
    #[serde(default)]
    pub react_integration: bool,
}

impl SiteProfile {
    /// Usable area of a single floor.
    pub fn per_floor_area(&self) -> f64 {
        self.site_size_sq_ft / self.floors as f64
    }
}

/// Contact and project notes carried alongside an estimate. The engine never
/// interprets these; they exist for export and delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_details: Option<String>,
}

/// Numeric inputs may arrive as JSON numbers from API clients; keep them as
/// text so they go through the same validation as typed input.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("expected a string or number, got {}", other))),
    }
}

/// Raw intake record as the form layer submits it: every value is text until
/// it has been through validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeForm {
    #[serde(deserialize_with = "string_or_number")]
    pub site_size: String,
    #[serde(deserialize_with = "string_or_number")]
    pub floors: String,
    #[serde(deserialize_with = "string_or_number")]
    pub stairs: String,
    pub construction_type: String,
    pub coverage_level: String,
    pub interface_integration: bool,
    pub react_integration: bool,
    pub name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub construction_phase: String,
    pub interface_details: String,
}

impl IntakeForm {
    /// Pull the pass-through contact block out of the form, dropping blanks.
    pub fn contact(&self) -> ContactDetails {
        fn non_empty(value: &str) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }

        ContactDetails {
            name: non_empty(&self.name),
            company_name: non_empty(&self.company_name),
            email: non_empty(&self.email),
            phone: non_empty(&self.phone),
            construction_phase: non_empty(&self.construction_phase),
            interface_details: if self.interface_integration {
                non_empty(&self.interface_details)
            } else {
                None
            },
        }
    }
}
