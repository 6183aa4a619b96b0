//! Call-point and interface-unit counts.

use super::ComputationError;
use crate::model::{ConstructionType, SiteProfile};

/// Extra call points per floor, in half units, for egress complexity.
fn egress_bonus_halves(construction: ConstructionType) -> u64 {
    match construction {
        ConstructionType::Residential => 0,
        ConstructionType::Commercial => 1,
        ConstructionType::Industrial => 2,
        ConstructionType::Marine => 3,
    }
}

/// Floors served by a single interface unit.
pub fn floors_per_interface_unit(construction: ConstructionType) -> u32 {
    match construction {
        ConstructionType::Residential => 20,
        ConstructionType::Commercial => 10,
        ConstructionType::Industrial => 5,
        ConstructionType::Marine => 3,
    }
}

/// One call point per staircase per floor, plus `ceil(floors * bonus)`.
pub fn compute_call_points(
    floors: u32,
    staircases: u32,
    construction: ConstructionType,
) -> Result<u32, ComputationError> {
    let base = floors as u64 * staircases as u64;
    let bonus = (floors as u64 * egress_bonus_halves(construction)).div_ceil(2);
    u32::try_from(base + bonus).map_err(|_| ComputationError::Overflow("call points"))
}

pub fn compute_interface_units(profile: &SiteProfile) -> u32 {
    if !profile.interface_integration {
        return 0;
    }
    let per_unit = floors_per_interface_unit(profile.construction_type);
    profile.floors.div_ceil(per_unit).max(1)
}
