//! Logging setup
//!
//! A single global subscriber: `RUST_LOG` wins, otherwise the given default
//! directives apply.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const DEFAULT_DIRECTIVES: &str = "wes3_budget=info,tower_http=info";

pub fn init_telemetry(default_directives: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;

    Ok(())
}
