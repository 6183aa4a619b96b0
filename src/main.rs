//! WES3 Budget relay
//!
//! Serves the estimate API and relays submitted estimates over SMTP, or to
//! the outbox directory when no SMTP password is configured.

use anyhow::Result;
use tracing::info;

use wes3_budget::config::{AdvisoryConfig, RelayConfig};
use wes3_budget::services::run_relay_server;
use wes3_budget::utils::{init_telemetry, DEFAULT_DIRECTIVES};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    init_telemetry(DEFAULT_DIRECTIVES)?;

    let relay = RelayConfig::from_env()?;
    let advisory = AdvisoryConfig::from_env()?;
    let estimator = advisory.build_estimator()?;

    if !estimator.has_advisor() {
        info!("advisory narrative disabled");
    }

    run_relay_server(relay, estimator).await
}
