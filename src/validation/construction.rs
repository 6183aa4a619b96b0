//! Construction-type requirement table.

use serde::Serialize;

use crate::model::ConstructionType;

/// Static per-construction-type requirements. Never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionRequirement {
    pub min_detectors_per_floor: u32,
    /// Nominal maximum spacing between devices, in feet.
    pub max_spacing_ft: f64,
    pub interface_required: bool,
}

const RESIDENTIAL: ConstructionRequirement = ConstructionRequirement {
    min_detectors_per_floor: 2,
    max_spacing_ft: 30.0,
    interface_required: false,
};

const COMMERCIAL: ConstructionRequirement = ConstructionRequirement {
    min_detectors_per_floor: 4,
    max_spacing_ft: 25.0,
    interface_required: true,
};

const INDUSTRIAL: ConstructionRequirement = ConstructionRequirement {
    min_detectors_per_floor: 6,
    max_spacing_ft: 20.0,
    interface_required: true,
};

const MARINE: ConstructionRequirement = ConstructionRequirement {
    min_detectors_per_floor: 8,
    max_spacing_ft: 15.0,
    interface_required: true,
};

pub fn requirement(construction: ConstructionType) -> &'static ConstructionRequirement {
    match construction {
        ConstructionType::Residential => &RESIDENTIAL,
        ConstructionType::Commercial => &COMMERCIAL,
        ConstructionType::Industrial => &INDUSTRIAL,
        ConstructionType::Marine => &MARINE,
    }
}
