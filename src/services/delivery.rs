//! Estimate Delivery
//!
//! Posts an estimate and its contact block to the mail relay. Failures are
//! retryable: the estimate itself stays valid and can be resent.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{ConstructionType, CoverageLevel, Estimate};

pub const SEND_ESTIMATE_PATH: &str = "/api/send-estimate";

/// Upper bound on one delivery round trip, mail hand-off included.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Flat JSON body understood by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSubmission {
    pub name: String,
    #[serde(default)]
    pub company_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub site_size: f64,
    pub floors: u32,
    pub stairs: u32,
    pub construction_type: ConstructionType,
    #[serde(default)]
    pub construction_phase: Option<String>,
    pub coverage_level: CoverageLevel,
    pub smoke_detectors: u32,
    pub heat_detectors: u32,
    pub call_points: u32,
    #[serde(default)]
    pub interface_units: u32,
    pub total_devices: u32,
    pub interface_integration: bool,
    #[serde(default)]
    pub interface_details: Option<String>,
    pub react_integration: bool,
    #[serde(default)]
    pub react_annual_cost: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
}

impl EstimateSubmission {
    pub fn from_estimate(estimate: &Estimate) -> Result<Self, DeliveryError> {
        let contact = &estimate.contact;
        let name = contact.name.clone().ok_or(DeliveryError::MissingContact("name"))?;
        let email = contact.email.clone().ok_or(DeliveryError::MissingContact("email"))?;
        let counts = &estimate.device_counts;
        let profile = &estimate.profile;

        Ok(Self {
            name,
            company_name: contact.company_name.clone().unwrap_or_default(),
            email,
            phone: contact.phone.clone(),
            site_size: profile.site_size_sq_ft,
            floors: profile.floors,
            stairs: profile.staircases,
            construction_type: profile.construction_type,
            construction_phase: contact.construction_phase.clone(),
            coverage_level: profile.coverage_level,
            smoke_detectors: counts.smoke,
            heat_detectors: counts.heat,
            call_points: counts.call_points,
            interface_units: counts.interface_units,
            total_devices: counts.total(),
            interface_integration: profile.interface_integration,
            interface_details: contact.interface_details.clone(),
            react_integration: profile.react_integration,
            react_annual_cost: estimate.costs.react_subscription.map(|m| m.as_dollars()),
            total_cost: Some(estimate.costs.total.as_dollars()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAck {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("estimate has no contact {0}; it is required for delivery")]
    MissingContact(&'static str),
    #[error("could not reach the mail relay: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail relay rejected the estimate ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("mail relay sent an unreadable acknowledgment: {0}")]
    MalformedAck(String),
}

impl DeliveryError {
    /// Whether resending the same estimate could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DeliveryError::MissingContact(_))
    }
}

/// Error body the relay returns on failure.
#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

pub struct DeliveryClient {
    client: Client,
    base_url: String,
}

impl DeliveryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DeliveryError> {
        Self::with_timeout(base_url, DEFAULT_DELIVERY_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEND_ESTIMATE_PATH)
    }

    pub async fn send(&self, estimate: &Estimate) -> Result<DeliveryAck, DeliveryError> {
        let submission = EstimateSubmission::from_estimate(estimate)?;
        self.send_submission(&submission).await.inspect_err(|e| {
            warn!(id = %estimate.id, retryable = e.is_retryable(), "estimate delivery failed: {}", e);
        })
    }

    pub async fn send_submission(&self, submission: &EstimateSubmission) -> Result<DeliveryAck, DeliveryError> {
        let res = self.client.post(self.endpoint()).json(submission).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if status != StatusCode::OK {
            let message = match serde_json::from_str::<RelayErrorBody>(&body) {
                Ok(err) => match err.details {
                    Some(details) => format!("{} ({})", err.error, details),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(DeliveryError::Rejected { status, message });
        }

        let ack: DeliveryAck =
            serde_json::from_str(&body).map_err(|e| DeliveryError::MalformedAck(e.to_string()))?;
        info!(to = %submission.email, "estimate delivered: {}", ack.message);
        Ok(ack)
    }
}
