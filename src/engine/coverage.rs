//! Coverage Model
//!
//! Static spacing tables per detector type and coverage level. All detector
//! geometry lives here; callers treat the figures as opaque.

use serde::Serialize;
use std::f64::consts::{PI, SQRT_2};

use crate::model::{ConstructionType, CoverageDetails, CoverageLevel, DetectorSpacing};
use crate::validation::{requirement, ConstructionRequirement};

/// Base coverage radius of a smoke detector, feet.
pub const SMOKE_BASE_RADIUS_FT: f64 = 25.0;
/// Base coverage radius of a heat detector, feet.
pub const HEAT_BASE_RADIUS_FT: f64 = 17.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorType {
    Smoke,
    Heat,
}

impl DetectorType {
    pub fn base_radius_ft(&self) -> f64 {
        match self {
            DetectorType::Smoke => SMOKE_BASE_RADIUS_FT,
            DetectorType::Heat => HEAT_BASE_RADIUS_FT,
        }
    }
}

/// Per-level spacing multiplier and smoke:heat split.
///
/// The split is kept in whole percent so that `ceil(total * ratio)` is
/// computed exactly; the two shares always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageProfile {
    pub level: CoverageLevel,
    pub spacing_multiplier: f64,
    pub smoke_percent: u32,
    pub heat_percent: u32,
}

const MAX: CoverageProfile = CoverageProfile {
    level: CoverageLevel::Max,
    spacing_multiplier: 1.0,
    smoke_percent: 90,
    heat_percent: 10,
};

const MEDIUM: CoverageProfile = CoverageProfile {
    level: CoverageLevel::Medium,
    spacing_multiplier: 1.25,
    smoke_percent: 80,
    heat_percent: 20,
};

const LOW: CoverageProfile = CoverageProfile {
    level: CoverageLevel::Low,
    spacing_multiplier: 1.5,
    smoke_percent: 70,
    heat_percent: 30,
};

impl CoverageProfile {
    pub fn for_level(level: CoverageLevel) -> &'static CoverageProfile {
        match level {
            CoverageLevel::Max => &MAX,
            CoverageLevel::Medium => &MEDIUM,
            CoverageLevel::Low => &LOW,
        }
    }

    pub fn smoke_ratio(&self) -> f64 {
        self.smoke_percent as f64 / 100.0
    }

    pub fn heat_ratio(&self) -> f64 {
        self.heat_percent as f64 / 100.0
    }

    pub fn effective_radius_ft(&self, detector: DetectorType) -> f64 {
        detector.base_radius_ft() * self.spacing_multiplier
    }

    /// Floor area one detector covers: π r².
    pub fn coverage_area_sq_ft(&self, detector: DetectorType) -> f64 {
        let r = self.effective_radius_ft(detector);
        PI * r * r
    }

    /// Centre-to-centre spacing on a square grid whose cells fit inside the
    /// coverage circle.
    pub fn spacing_ft(&self, detector: DetectorType) -> f64 {
        self.effective_radius_ft(detector) * SQRT_2
    }

    /// Maximum distance from a wall to the nearest detector.
    pub fn wall_clearance_ft(&self, detector: DetectorType) -> f64 {
        self.spacing_ft(detector) / 2.0
    }

    pub fn spacing(&self, detector: DetectorType) -> DetectorSpacing {
        DetectorSpacing {
            radius_ft: self.effective_radius_ft(detector),
            spacing_ft: self.spacing_ft(detector),
            wall_clearance_ft: self.wall_clearance_ft(detector),
            coverage_area_sq_ft: self.coverage_area_sq_ft(detector),
        }
    }
}

/// Construction lookup.
pub fn construction(construction: ConstructionType) -> &'static ConstructionRequirement {
    requirement(construction)
}

/// Spacing figures reported alongside an estimate.
pub fn coverage_details(construction_type: ConstructionType, level: CoverageLevel) -> CoverageDetails {
    let req = construction(construction_type);
    let profile = CoverageProfile::for_level(level);
    CoverageDetails {
        level,
        construction_type,
        multiplier: profile.spacing_multiplier,
        max_spacing_ft: req.max_spacing_ft,
        min_detectors_per_floor: req.min_detectors_per_floor,
        interface_required: req.interface_required,
        smoke_ratio: profile.smoke_ratio(),
        heat_ratio: profile.heat_ratio(),
        smoke: profile.spacing(DetectorType::Smoke),
        heat: profile.spacing(DetectorType::Heat),
    }
}

/// Presentation copy for a coverage level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageCatalogEntry {
    pub level: CoverageLevel,
    pub title: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub recommended_for: &'static str,
}

const CATALOG: [CoverageCatalogEntry; 3] = [
    CoverageCatalogEntry {
        level: CoverageLevel::Max,
        title: "Maximum Coverage",
        description: "Complete protection for high-risk areas with 24/7 monitoring",
        features: &["Instant alerts", "Full building coverage", "Priority response", "24/7 monitoring"],
        recommended_for: "Large commercial buildings, hospitals, data centers",
    },
    CoverageCatalogEntry {
        level: CoverageLevel::Medium,
        title: "Medium Coverage",
        description: "Balanced protection suitable for most commercial spaces",
        features: &["Quick alerts", "Standard coverage", "Regular monitoring", "Cost-effective solution"],
        recommended_for: "Office buildings, retail spaces, schools",
    },
    CoverageCatalogEntry {
        level: CoverageLevel::Low,
        title: "Low Coverage",
        description: "Basic protection for low-risk areas",
        features: &["Basic alerts", "Essential coverage", "Standard response time", "Budget-friendly"],
        recommended_for: "Small businesses, storage facilities, low-risk areas",
    },
];

pub fn catalog() -> &'static [CoverageCatalogEntry] {
    &CATALOG
}

pub fn catalog_entry(level: CoverageLevel) -> &'static CoverageCatalogEntry {
    match level {
        CoverageLevel::Max => &CATALOG[0],
        CoverageLevel::Medium => &CATALOG[1],
        CoverageLevel::Low => &CATALOG[2],
    }
}
