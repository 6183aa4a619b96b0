//! Estimation Engine
//!
//! Pure calculators (coverage, detectors, call points, costs) and the
//! estimator that composes them into one immutable `Estimate`.

pub mod auxiliary;
pub mod costs;
pub mod coverage;
pub mod detectors;
mod estimator;

pub use auxiliary::{compute_call_points, compute_interface_units};
pub use costs::{compute_costs, compute_costs_with, PriceTable};
pub use detectors::{compute_detectors, DetectorCounts};
pub use estimator::{compute_estimate, Estimator, DEFAULT_ADVISORY_TIMEOUT};

use thiserror::Error;
use tracing::error;

use crate::model::SiteProfile;
use crate::validation::ValidationErrors;

/// An input reached the calculators that validation should have rejected.
/// This is a contract violation, not a user error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("site has zero floors")]
    ZeroFloors,
    #[error("site has zero staircases")]
    ZeroStaircases,
    #[error("site size {0} is not a positive area")]
    InvalidSiteSize(f64),
    #[error("{0} count does not fit the device counter")]
    Overflow(&'static str),
}

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("estimate computation failed: {0}")]
    Computation(#[from] ComputationError),
}

/// Guard the invariants every calculator divides by.
pub(crate) fn ensure_computable(profile: &SiteProfile) -> Result<(), ComputationError> {
    let violation = if profile.floors == 0 {
        Some(ComputationError::ZeroFloors)
    } else if profile.staircases == 0 {
        Some(ComputationError::ZeroStaircases)
    } else if !profile.site_size_sq_ft.is_finite() || profile.site_size_sq_ft <= 0.0 {
        Some(ComputationError::InvalidSiteSize(profile.site_size_sq_ft))
    } else {
        None
    };

    match violation {
        Some(err) => {
            error!(?profile, "unvalidated profile reached the estimation engine: {}", err);
            Err(err)
        }
        None => Ok(()),
    }
}
