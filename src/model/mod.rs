//! Data Model
//!
//! Site inputs, contact pass-through and the estimate aggregate.

mod estimate;
mod profile;

pub use estimate::{
    CostBreakdown, CostLine, CoverageDetails, DetectorSpacing, DeviceCounts, DeviceKind, Estimate, Money,
};
pub use profile::{ConstructionType, ContactDetails, CoverageLevel, IntakeForm, SiteProfile};
