//! Export
//!
//! Presentation-ready views of an estimate: a text document and chart data.

mod chart;
mod report;

pub use chart::{ChartBar, DeviceChart};
pub use report::render_report;
