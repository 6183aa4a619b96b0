//! Mail Relay Server
//!
//! Receives estimate submissions over HTTP and forwards them as plain-text
//! mail. Also exposes the estimator so a form front end can request an
//! estimate and the coverage catalog from the same origin.

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::delivery::{EstimateSubmission, SEND_ESTIMATE_PATH};
use super::mailer::{MailError, Mailer, OutgoingMail};
use super::rate_limiter::RateLimiter;
use crate::config::RelayConfig;
use crate::engine::coverage::catalog;
use crate::engine::{EstimateError, Estimator};
use crate::model::{Estimate, IntakeForm, Money};
use crate::utils::{cap_text, TruncationPolicy};
use crate::validation::{rules, validate_field, Field, ValidationErrors};

pub const SUBJECT: &str = "New WES3 Budget Estimate Request";

pub struct RelayState {
    pub mailer: Arc<dyn Mailer>,
    pub estimator: Arc<Estimator>,
    pub limiter: Mutex<RateLimiter>,
    pub sender_name: String,
    pub sender_address: String,
    pub recipient: String,
}

impl RelayState {
    pub fn new(config: &RelayConfig, mailer: Arc<dyn Mailer>, estimator: Arc<Estimator>) -> Self {
        Self {
            mailer,
            estimator,
            limiter: Mutex::new(RateLimiter::per_minute(config.sends_per_minute)),
            sender_name: config.sender_name.clone(),
            sender_address: config.sender_address.clone(),
            recipient: config.recipient.clone(),
        }
    }
}

enum RelayError {
    Mail(MailError),
    RateLimited,
    Estimate(EstimateError),
    Submission(ValidationErrors),
    Body(JsonRejection),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::Mail(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to send estimate",
                    "details": cap_text(&e.to_string(), TruncationPolicy::Bytes(500)),
                })),
            )
                .into_response(),
            RelayError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "Too many estimate requests, please try again shortly" })),
            )
                .into_response(),
            RelayError::Estimate(EstimateError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": "Invalid site details", "errors": errors })),
            )
                .into_response(),
            RelayError::Estimate(e @ EstimateError::Computation(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to compute estimate", "details": e.to_string() })),
            )
                .into_response(),
            RelayError::Submission(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": "Invalid estimate submission", "errors": errors })),
            )
                .into_response(),
            RelayError::Body(rejection) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "Invalid request body",
                    "details": cap_text(&rejection.body_text(), TruncationPolicy::Bytes(500)),
                })),
            )
                .into_response(),
        }
    }
}

/// Contact checks for a submission. The reply-to address ends up in a mail
/// header, so it has to pass the email rule before anything is sent.
pub fn validate_submission(submission: &EstimateSubmission) -> Result<(), ValidationErrors> {
    let context = IntakeForm::default();
    let mut errors = ValidationErrors::new();
    let checks = [
        (Field::Name, Some(submission.name.as_str()), true),
        (Field::Email, Some(submission.email.as_str()), true),
        (Field::CompanyName, Some(submission.company_name.as_str()), false),
        (Field::Phone, submission.phone.as_deref(), false),
    ];
    for (field, value, required) in checks {
        let value = value.unwrap_or("");
        if value.trim().is_empty() {
            if required {
                errors.insert(field, rules::REQUIRED);
            }
            continue;
        }
        if let Some(message) = validate_field(field, value, &context) {
            errors.insert(field, message);
        } else if value.contains(['\r', '\n']) {
            errors.insert(field, "Line breaks are not allowed");
        }
    }
    errors.into_result()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Plain-text body of the notification sent to the estimates inbox.
pub fn compose_mail(submission: &EstimateSubmission, sender_name: &str, sender_address: &str, recipient: &str) -> OutgoingMail {
    let s = submission;
    let mut text = String::new();
    text.push_str("New Budget Estimate Request\n\n");

    text.push_str("Contact Information:\n");
    text.push_str(&format!("Name: {}\n", s.name));
    text.push_str(&format!("Company: {}\n", s.company_name));
    text.push_str(&format!("Email: {}\n", s.email));
    text.push_str(&format!("Phone: {}\n\n", s.phone.as_deref().unwrap_or("Not provided")));

    text.push_str("Site Details:\n");
    text.push_str(&format!("Site Size: {} sq. ft\n", s.site_size));
    text.push_str(&format!("Number of Floors: {}\n", s.floors));
    text.push_str(&format!("Number of Staircases: {}\n", s.stairs));
    text.push_str(&format!("Construction Type: {}\n", s.construction_type));
    text.push_str(&format!(
        "Construction Phase: {}\n",
        s.construction_phase.as_deref().unwrap_or("Not provided")
    ));
    text.push_str(&format!("Coverage Level: {}\n\n", s.coverage_level));

    text.push_str("Device Estimate:\n");
    text.push_str(&format!("Smoke Detectors: {}\n", s.smoke_detectors));
    text.push_str(&format!("Heat Detectors: {}\n", s.heat_detectors));
    text.push_str(&format!("Call Points: {}\n", s.call_points));
    text.push_str(&format!("Interface Units: {}\n", s.interface_units));
    text.push_str(&format!("Total Devices: {}\n", s.total_devices));
    if let Some(total) = s.total_cost.and_then(Money::try_from_dollars) {
        text.push_str(&format!("Estimated One-Time Cost: {}\n", total));
    }
    text.push('\n');

    text.push_str("Additional Services:\n");
    text.push_str(&format!("Interface Integration: {}\n", yes_no(s.interface_integration)));
    if s.interface_integration {
        text.push_str(&format!(
            "Interface Details: {}\n",
            s.interface_details.as_deref().unwrap_or("Not provided")
        ));
    }
    text.push_str(&format!("REACT Integration: {}\n", yes_no(s.react_integration)));
    if s.react_integration {
        if let Some(cost) = s.react_annual_cost.and_then(Money::try_from_dollars) {
            text.push_str(&format!("REACT Subscription: {}/year\n", cost));
        }
    }

    OutgoingMail {
        from_name: sender_name.to_string(),
        from_address: sender_address.to_string(),
        to: recipient.to_string(),
        reply_to: s.email.clone(),
        subject: SUBJECT.to_string(),
        text,
    }
}

pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/coverage-levels", get(coverage_levels_handler))
        .route("/api/estimate", post(estimate_handler))
        .route(SEND_ESTIMATE_PATH, post(send_estimate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_relay_server(config: RelayConfig, estimator: Estimator) -> anyhow::Result<()> {
    info!("📨 Starting estimate mail relay...");

    let mailer = config.build_mailer()?;
    let state = Arc::new(RelayState::new(&config, mailer, Arc::new(estimator)));
    let app = router(state);

    let addr = config.socket_addr()?;
    info!("🚀 Relay listening at http://{} ({})", addr, config.mail_transport());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn coverage_levels_handler() -> Json<Value> {
    Json(json!(catalog()))
}

async fn estimate_handler(
    State(state): State<Arc<RelayState>>,
    body: Result<Json<IntakeForm>, JsonRejection>,
) -> Result<Json<Estimate>, RelayError> {
    let Json(form) = body.map_err(RelayError::Body)?;
    let estimate = state.estimator.generate_estimate(&form).await.map_err(RelayError::Estimate)?;
    Ok(Json(estimate))
}

async fn send_estimate_handler(
    State(state): State<Arc<RelayState>>,
    Json(submission): Json<EstimateSubmission>,
) -> Result<Json<Value>, RelayError> {
    if let Err(errors) = validate_submission(&submission) {
        warn!(fields = errors.len(), "estimate submission rejected");
        return Err(RelayError::Submission(errors));
    }

    if !state.limiter.lock().await.check(&submission.email) {
        warn!(reply_to = %submission.email, "estimate send rate limited");
        return Err(RelayError::RateLimited);
    }

    let mail = compose_mail(&submission, &state.sender_name, &state.sender_address, &state.recipient);
    if let Err(e) = state.mailer.send(&mail).await {
        warn!(reply_to = %submission.email, "error sending estimate mail: {}", e);
        return Err(RelayError::Mail(e));
    }

    info!(reply_to = %submission.email, devices = submission.total_devices, "estimate relayed");
    Ok(Json(json!({ "message": "Estimate sent successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstructionType, CoverageLevel};

    fn submission() -> EstimateSubmission {
        EstimateSubmission {
            name: "Jo Bloggs".into(),
            company_name: "Bloggs & Co".into(),
            email: "jo@example.com".into(),
            phone: None,
            site_size: 50_000.0,
            floors: 5,
            stairs: 2,
            construction_type: ConstructionType::Commercial,
            construction_phase: Some("Design".into()),
            coverage_level: CoverageLevel::Max,
            smoke_detectors: 77,
            heat_detectors: 9,
            call_points: 13,
            interface_units: 1,
            total_devices: 100,
            interface_integration: true,
            interface_details: None,
            react_integration: true,
            react_annual_cost: Some(2500.0),
            total_cost: Some(19_695.0),
        }
    }

    #[test]
    fn test_compose_mail_sections() {
        let mail = compose_mail(&submission(), "WES3 Budget Tool", "tool@example.com", "sales@example.com");
        assert_eq!(mail.subject, SUBJECT);
        assert_eq!(mail.reply_to, "jo@example.com");
        assert!(mail.text.contains("Phone: Not provided"));
        assert!(mail.text.contains("Construction Type: commercial"));
        assert!(mail.text.contains("Total Devices: 100"));
        assert!(mail.text.contains("Estimated One-Time Cost: $19,695.00"));
        assert!(mail.text.contains("REACT Subscription: $2,500.00/year"));
        assert!(mail.text.contains("Interface Details: Not provided"));
    }

    #[test]
    fn test_compose_mail_omits_unrequested_services() {
        let mut s = submission();
        s.react_integration = false;
        s.interface_integration = false;
        let mail = compose_mail(&s, "n", "a", "r");
        assert!(mail.text.contains("REACT Integration: No"));
        assert!(!mail.text.contains("REACT Subscription"));
        assert!(!mail.text.contains("Interface Details"));
    }

    #[test]
    fn test_submission_contact_checks() {
        assert!(validate_submission(&submission()).is_ok());

        let mut s = submission();
        s.email = "jo@example.com\nBcc: someone@example.net".into();
        s.name = String::new();
        s.phone = Some("   ".into());
        let errors = validate_submission(&s).unwrap_err();
        assert_eq!(errors.get(Field::Email), Some(rules::EMAIL_INVALID));
        assert_eq!(errors.get(Field::Name), Some(rules::REQUIRED));
        assert!(!errors.contains(Field::Phone));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_submission_name_cannot_span_lines() {
        let mut s = submission();
        s.name = "Jo\nBloggs".into();
        let errors = validate_submission(&s).unwrap_err();
        assert!(errors.contains(Field::Name));
    }
}
