//! Detector Calculator
//!
//! Site geometry + coverage model → smoke/heat detector counts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::coverage::{construction, CoverageProfile, DetectorType};
use super::{ensure_computable, ComputationError};
use crate::model::SiteProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorCounts {
    pub smoke: u32,
    pub heat: u32,
}

impl DetectorCounts {
    pub fn total(&self) -> u32 {
        self.smoke + self.heat
    }
}

/// `ceil(total * percent / 100)` in integers.
fn ceil_share(total: u64, percent: u32) -> u64 {
    (total * percent as u64).div_ceil(100)
}

/// Detectors of one type needed to blanket a floor of `area` sq ft.
fn per_floor(area: f64, profile: &CoverageProfile, detector: DetectorType) -> u64 {
    (area / profile.coverage_area_sq_ft(detector)).ceil() as u64
}

/// Size the detector layout for a site.
///
/// The per-type area calculation sets a sizing floor per storey, lifted to the
/// construction minimum; the coverage level's ratio then decides the
/// smoke/heat split. Every step rounds up.
pub fn compute_detectors(profile: &SiteProfile) -> Result<DetectorCounts, ComputationError> {
    ensure_computable(profile)?;

    let coverage = CoverageProfile::for_level(profile.coverage_level);
    let min_per_floor = construction(profile.construction_type).min_detectors_per_floor as u64;
    let area = profile.per_floor_area();

    let smoke_needed = per_floor(area, coverage, DetectorType::Smoke);
    let heat_needed = per_floor(area, coverage, DetectorType::Heat);
    let per_floor_total = min_per_floor.max(smoke_needed + heat_needed);
    let total = per_floor_total * profile.floors as u64;

    let smoke = ceil_share(total, coverage.smoke_percent);
    let heat = ceil_share(total, coverage.heat_percent);

    debug!(
        per_floor_area = area,
        smoke_needed, heat_needed, per_floor_total, total, smoke, heat,
        "sized detector layout"
    );

    Ok(DetectorCounts {
        smoke: u32::try_from(smoke).map_err(|_| ComputationError::Overflow("smoke detectors"))?,
        heat: u32::try_from(heat).map_err(|_| ComputationError::Overflow("heat detectors"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstructionType, CoverageLevel};

    fn site(size: f64, floors: u32, ty: ConstructionType, level: CoverageLevel) -> SiteProfile {
        SiteProfile {
            site_size_sq_ft: size,
            floors,
            staircases: 1,
            construction_type: ty,
            coverage_level: level,
            interface_integration: false,
            react_integration: false,
        }
    }

    #[test]
    fn test_commercial_max_scenario() {
        // 10,000 sq ft per floor: 6 smoke-sized + 11 heat-sized = 17 per floor, 85 total
        let counts =
            compute_detectors(&site(50_000.0, 5, ConstructionType::Commercial, CoverageLevel::Max)).unwrap();
        assert_eq!(counts, DetectorCounts { smoke: 77, heat: 9 });
    }

    #[test]
    fn test_construction_minimum_applies_to_small_sites() {
        let counts =
            compute_detectors(&site(100.0, 1, ConstructionType::Marine, CoverageLevel::Max)).unwrap();
        // 8 per floor minimum, split 90/10 upward
        assert_eq!(counts, DetectorCounts { smoke: 8, heat: 1 });
        assert!(counts.total() >= 8);
    }

    #[test]
    fn test_split_is_exact_on_round_totals() {
        // 1 + 1 sizing is lifted to the residential minimum of 2 per floor, 10 floors
        let counts =
            compute_detectors(&site(1_000.0, 10, ConstructionType::Residential, CoverageLevel::Max)).unwrap();
        assert_eq!(counts, DetectorCounts { smoke: 18, heat: 2 });
    }

    #[test]
    fn test_never_below_construction_minimum() {
        for ty in ConstructionType::ALL {
            for level in CoverageLevel::ALL {
                for floors in [1u32, 3, 7, 50] {
                    let p = site(floors as f64 * 150.0, floors, ty, level);
                    let counts = compute_detectors(&p).unwrap();
                    let min = construction(ty).min_detectors_per_floor * floors;
                    assert!(counts.total() >= min, "{:?} {:?} {} floors", ty, level, floors);
                }
            }
        }
    }

    #[test]
    fn test_monotonic_in_site_size() {
        for level in CoverageLevel::ALL {
            let mut previous = 0;
            for size in (100..=200_000).step_by(997) {
                let counts =
                    compute_detectors(&site(size as f64, 1, ConstructionType::Industrial, level)).unwrap();
                assert!(counts.total() >= previous);
                previous = counts.total();
            }
        }
    }

    #[test]
    fn test_stricter_level_never_needs_fewer() {
        for size in [100.0, 2_500.0, 12_345.0, 80_000.0, 1_000_000.0] {
            let totals: Vec<u32> = CoverageLevel::ALL
                .iter()
                .map(|l| compute_detectors(&site(size, 2, ConstructionType::Commercial, *l)).unwrap().total())
                .collect();
            assert!(totals[0] >= totals[1] && totals[1] >= totals[2], "{} sq ft: {:?}", size, totals);
        }
    }

    #[test]
    fn test_rejects_zero_floors() {
        let err = compute_detectors(&site(1_000.0, 0, ConstructionType::Residential, CoverageLevel::Max));
        assert!(matches!(err, Err(ComputationError::ZeroFloors)));
    }
}
