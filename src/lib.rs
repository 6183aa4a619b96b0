//! WES3 Budget Estimator
//!
//! Turns a short description of a construction site into a budget estimate
//! for a wireless fire-alarm system:
//! - Validated intake form with per-field messages
//! - Coverage-level and construction-type driven device counts
//! - Exact cost breakdown with installation, maintenance and subscription
//! - Optional LLM narrative that never affects the numbers
//! - Mail relay for submitting estimates, plus draft autosave

pub mod advisory;
pub mod config;
pub mod engine;
pub mod export;
pub mod model;
pub mod services;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use engine::{compute_estimate, EstimateError, Estimator, PriceTable};
pub use model::{ContactDetails, CoverageLevel, ConstructionType, Estimate, IntakeForm, SiteProfile};
pub use validation::{Field, ValidationErrors};
