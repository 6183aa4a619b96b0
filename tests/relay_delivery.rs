use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use wes3_budget::config::RelayConfig;
use wes3_budget::services::delivery::SEND_ESTIMATE_PATH;
use wes3_budget::services::relay::SUBJECT;
use wes3_budget::services::{
    router, DeliveryClient, DeliveryError, EstimateSubmission, MailError, Mailer, OutboxMailer, OutgoingMail,
    RelayState,
};
use wes3_budget::{Estimate, Estimator, IntakeForm};

struct BrokenMailer;

#[async_trait]
impl Mailer for BrokenMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
        Err(MailError::Transport("535 authentication failed".into()))
    }
}

async fn spawn_relay(config: RelayConfig, mailer: Arc<dyn Mailer>) -> SocketAddr {
    let state = Arc::new(RelayState::new(&config, mailer, Arc::new(Estimator::new())));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    addr
}

async fn estimate() -> Estimate {
    let form = IntakeForm {
        site_size: "12000".into(),
        floors: "3".into(),
        stairs: "2".into(),
        construction_type: "industrial".into(),
        coverage_level: "medium".into(),
        interface_integration: true,
        interface_details: "Tie into existing Gent panel".into(),
        name: "Sam Carter".into(),
        company_name: "Carter Build".into(),
        email: "sam@carterbuild.co.uk".into(),
        construction_phase: "Fit-out".into(),
        ..Default::default()
    };
    Estimator::new().generate_estimate(&form).await.unwrap()
}

#[tokio::test]
async fn test_estimate_is_relayed_to_outbox() {
    let outbox = tempfile::tempdir().unwrap();
    let mailer = Arc::new(OutboxMailer::new(outbox.path()));
    let addr = spawn_relay(RelayConfig::default(), mailer).await;

    let client = DeliveryClient::new(format!("http://{}", addr)).unwrap();
    let ack = client.send(&estimate().await).await.unwrap();
    assert_eq!(ack.message, "Estimate sent successfully");

    let files: Vec<_> = std::fs::read_dir(outbox.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
    let mail = std::fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
    assert!(mail.contains(SUBJECT));
    assert!(mail.contains("Reply-To: sam@carterbuild.co.uk"));
    assert!(mail.contains("Tie into existing Gent panel"));
}

#[tokio::test]
async fn test_mail_failure_is_reported_and_retryable() {
    let addr = spawn_relay(RelayConfig::default(), Arc::new(BrokenMailer)).await;

    let err = DeliveryClient::new(format!("http://{}/", addr))
        .unwrap()
        .send(&estimate().await)
        .await
        .unwrap_err();

    match &err {
        DeliveryError::Rejected { status, message } => {
            assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(message.contains("Failed to send estimate"));
            assert!(message.contains("535 authentication failed"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_sends_are_rate_limited_per_address() {
    let outbox = tempfile::tempdir().unwrap();
    let config = RelayConfig {
        sends_per_minute: 1,
        ..Default::default()
    };
    let addr = spawn_relay(config, Arc::new(OutboxMailer::new(outbox.path()))).await;
    let client = DeliveryClient::new(format!("http://{}", addr)).unwrap();
    let estimate = estimate().await;

    client.send(&estimate).await.unwrap();
    match client.send(&estimate).await {
        Err(DeliveryError::Rejected { status, .. }) => assert_eq!(status, StatusCode::TOO_MANY_REQUESTS),
        other => panic!("second send should be limited, got {:?}", other.map(|a| a.message)),
    }
}

#[tokio::test]
async fn test_unreachable_relay_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = DeliveryClient::new(format!("http://{}", addr))
        .unwrap()
        .send(&estimate().await)
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Transport(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_stalled_relay_times_out() {
    // Accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = DeliveryClient::with_timeout(format!("http://{}", addr), Duration::from_millis(200)).unwrap();
    let started = std::time::Instant::now();
    let err = client.send(&estimate().await).await.unwrap_err();

    match &err {
        DeliveryError::Transport(e) => assert!(e.is_timeout()),
        other => panic!("expected a timeout, got {}", other),
    }
    assert!(err.is_retryable());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_injected_reply_to_is_refused() {
    let outbox = tempfile::tempdir().unwrap();
    let addr = spawn_relay(RelayConfig::default(), Arc::new(OutboxMailer::new(outbox.path()))).await;
    let mut submission = EstimateSubmission::from_estimate(&estimate().await).unwrap();
    submission.email = "sam@carterbuild.co.uk\r\nBcc: everyone@example.net".into();

    let res = reqwest::Client::new()
        .post(format!("http://{}{}", addr, SEND_ESTIMATE_PATH))
        .json(&submission)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid estimate submission");
    assert!(body["errors"]["email"].is_string());
    assert_eq!(std::fs::read_dir(outbox.path()).unwrap().count(), 0);

    let err = DeliveryClient::new(format!("http://{}", addr))
        .unwrap()
        .send_submission(&submission)
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Rejected { status, .. } if status == StatusCode::UNPROCESSABLE_ENTITY));
}

#[tokio::test]
async fn test_estimate_endpoint_accepts_numbers_and_reports_bad_bodies() {
    let outbox = tempfile::tempdir().unwrap();
    let addr = spawn_relay(RelayConfig::default(), Arc::new(OutboxMailer::new(outbox.path()))).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{}/api/estimate", addr))
        .json(&json!({ "siteSize": 50000, "floors": 5, "stairs": 2, "constructionType": "commercial", "coverageLevel": "max" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let estimate: Value = res.json().await.unwrap();
    assert_eq!(estimate["deviceCounts"]["smoke"], 77);

    let res = client
        .post(format!("http://{}/api/estimate", addr))
        .json(&json!({ "siteSize": ["50000"], "floors": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_estimate_endpoint_returns_field_errors() {
    let outbox = tempfile::tempdir().unwrap();
    let addr = spawn_relay(RelayConfig::default(), Arc::new(OutboxMailer::new(outbox.path()))).await;

    let res = reqwest::Client::new()
        .post(format!("http://{}/api/estimate", addr))
        .json(&json!({ "siteSize": "50", "floors": "2", "stairs": "1", "constructionType": "commercial", "coverageLevel": "max" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert!(body["errors"]["siteSize"].is_string());
    assert!(body["errors"].get("floors").is_none());
}

#[tokio::test]
async fn test_coverage_catalog_and_estimate_endpoints() {
    let outbox = tempfile::tempdir().unwrap();
    let addr = spawn_relay(RelayConfig::default(), Arc::new(OutboxMailer::new(outbox.path()))).await;
    let client = reqwest::Client::new();

    let catalog: Value = client
        .get(format!("http://{}/api/coverage-levels", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog.as_array().map(|a| a.len()), Some(3));

    let estimate: Value = client
        .post(format!("http://{}/api/estimate", addr))
        .json(&json!({ "siteSize": "50000", "floors": "5", "stairs": "2", "constructionType": "commercial", "coverageLevel": "max" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(estimate["deviceCounts"]["smoke"], 77);
    assert_eq!(estimate["costs"]["total"], 19_045.0);
}
