//! Advisory Narrative
//!
//! Optional collaborator that explains the spacing rationale of an estimate in
//! plain language. It is a soft dependency: the estimator bounds every call
//! with a timeout and drops the narrative on any failure.

mod provider;

pub use provider::{CompletionProvider, CompletionRequest, OllamaProvider, OpenAICompatibleProvider};

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::engine::coverage::catalog_entry;
use crate::model::{CoverageDetails, DeviceCounts, SiteProfile};
use crate::utils::{cap_text, TruncationPolicy};

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory service unavailable: {0}")]
    Unavailable(String),
    #[error("advisory service timed out after {0:?}")]
    Timeout(Duration),
    #[error("advisory service returned an empty narrative")]
    EmptyResponse,
}

/// What the advisor gets to see: the site and the figures already computed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    pub profile: SiteProfile,
    pub coverage: CoverageDetails,
    pub device_counts: DeviceCounts,
}

#[async_trait]
pub trait NarrativeAdvisor: Send + Sync {
    async fn explain(&self, request: &NarrativeRequest) -> Result<String, AdvisoryError>;
}

const SYSTEM_PROMPT: &str = "You are a fire detection design assistant. Explain, in two short \
paragraphs, why the detector spacing and device mix in the estimate suit the building. Use only \
the figures provided. Do not change any quantity or price. Note that the figures are budget \
approximations, not a certified fire-code design.";

/// Low: the narrative should restate figures, not invent them.
const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 400;

/// Narrative advisor backed by any `CompletionProvider`.
pub struct LlmAdvisor {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    policy: TruncationPolicy,
}

impl LlmAdvisor {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            policy: TruncationPolicy::Bytes(2_000),
        }
    }

    pub fn with_policy(mut self, policy: TruncationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn completion_request(&self, request: &NarrativeRequest) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: Self::build_prompt(request),
            temperature: TEMPERATURE,
            max_tokens: Some(MAX_TOKENS),
        }
    }

    pub fn build_prompt(request: &NarrativeRequest) -> String {
        let p = &request.profile;
        let c = &request.coverage;
        let d = &request.device_counts;
        format!(
            "SITE: {:.0} sq ft over {} floor(s), {} staircase(s), {} construction.\n\
             COVERAGE: {} ({}), spacing multiplier {:.2}, construction max spacing {:.0} ft, \
             minimum {} detectors per floor.\n\
             SMOKE: radius {:.1} ft, spacing {:.1} ft, wall clearance {:.1} ft, {:.0} sq ft each, {:.0}% of detectors.\n\
             HEAT: radius {:.1} ft, spacing {:.1} ft, wall clearance {:.1} ft, {:.0} sq ft each, {:.0}% of detectors.\n\
             DEVICES: {} smoke, {} heat, {} call points, {} interface units.",
            p.site_size_sq_ft,
            p.floors,
            p.staircases,
            p.construction_type,
            catalog_entry(c.level).title,
            c.level,
            c.multiplier,
            c.max_spacing_ft,
            c.min_detectors_per_floor,
            c.smoke.radius_ft,
            c.smoke.spacing_ft,
            c.smoke.wall_clearance_ft,
            c.smoke.coverage_area_sq_ft,
            c.smoke_ratio * 100.0,
            c.heat.radius_ft,
            c.heat.spacing_ft,
            c.heat.wall_clearance_ft,
            c.heat.coverage_area_sq_ft,
            c.heat_ratio * 100.0,
            d.smoke,
            d.heat,
            d.call_points,
            d.interface_units,
        )
    }
}

#[async_trait]
impl NarrativeAdvisor for LlmAdvisor {
    async fn explain(&self, request: &NarrativeRequest) -> Result<String, AdvisoryError> {
        debug!(model = %self.model, "requesting spacing narrative");

        let raw = self
            .provider
            .complete(&self.completion_request(request))
            .await
            .map_err(|e| AdvisoryError::Unavailable(e.to_string()))?;

        let text = raw.trim();
        if text.is_empty() {
            return Err(AdvisoryError::EmptyResponse);
        }
        Ok(cap_text(text, self.policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::coverage::coverage_details;
    use crate::model::{ConstructionType, CoverageLevel};

    struct EchoProvider(String);

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<String> {
            Ok(self.0.clone())
        }
    }

    struct DownProvider;

    #[async_trait]
    impl CompletionProvider for DownProvider {
        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    fn request() -> NarrativeRequest {
        NarrativeRequest {
            profile: SiteProfile {
                site_size_sq_ft: 50_000.0,
                floors: 5,
                staircases: 2,
                construction_type: ConstructionType::Commercial,
                coverage_level: CoverageLevel::Max,
                interface_integration: true,
                react_integration: true,
            },
            coverage: coverage_details(ConstructionType::Commercial, CoverageLevel::Max),
            device_counts: DeviceCounts { smoke: 77, heat: 9, call_points: 13, interface_units: 1 },
        }
    }

    #[test]
    fn test_prompt_carries_figures() {
        let prompt = LlmAdvisor::build_prompt(&request());
        assert!(prompt.contains("50000 sq ft over 5 floor(s)"));
        assert!(prompt.contains("Maximum Coverage"));
        assert!(prompt.contains("77 smoke, 9 heat, 13 call points, 1 interface units"));
        assert!(prompt.contains("90% of detectors"));
    }

    #[test]
    fn test_advisor_shapes_the_completion() {
        let advisor = LlmAdvisor::new(Arc::new(DownProvider), "llama3.2:3b");
        let completion = advisor.completion_request(&request());
        assert_eq!(completion.model, "llama3.2:3b");
        assert_eq!(completion.system, SYSTEM_PROMPT);
        assert_eq!(completion.temperature, TEMPERATURE);
        assert_eq!(completion.max_tokens, Some(MAX_TOKENS));
        assert!(completion.prompt.starts_with("SITE: 50000 sq ft"));
    }

    #[tokio::test]
    async fn test_explain_trims_and_caps() {
        let advisor = LlmAdvisor::new(Arc::new(EchoProvider(format!("  {}  ", "word ".repeat(50)))), "m")
            .with_policy(TruncationPolicy::Bytes(40));
        let text = advisor.explain(&request()).await.unwrap();
        assert!(text.len() <= 40 + 3);
        assert!(text.ends_with("..."));
    }

    #[tokio::test]
    async fn test_explain_maps_failures() {
        let down = LlmAdvisor::new(Arc::new(DownProvider), "m");
        assert!(matches!(down.explain(&request()).await, Err(AdvisoryError::Unavailable(_))));

        let blank = LlmAdvisor::new(Arc::new(EchoProvider("   ".into())), "m");
        assert!(matches!(blank.explain(&request()).await, Err(AdvisoryError::EmptyResponse)));
    }
}
