//! Utils Module
pub mod telemetry;
pub mod truncate;

pub use telemetry::{init_telemetry, DEFAULT_DIRECTIVES};
pub use truncate::{cap_text, TruncationPolicy};
