use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::auxiliary::{compute_call_points, compute_interface_units};
use super::costs::{compute_costs_with, PriceTable};
use super::coverage::coverage_details;
use super::detectors::compute_detectors;
use super::{ComputationError, EstimateError};
use crate::advisory::{AdvisoryError, NarrativeAdvisor, NarrativeRequest};
use crate::model::{ContactDetails, DeviceCounts, Estimate, IntakeForm, SiteProfile};
use crate::validation::validate_profile;

pub const DEFAULT_ADVISORY_TIMEOUT: Duration = Duration::from_secs(8);

/// The synchronous part of an estimate: counts, costs and coverage details.
pub fn compute_estimate(
    profile: &SiteProfile,
    contact: ContactDetails,
    prices: &PriceTable,
) -> Result<Estimate, ComputationError> {
    let detectors = compute_detectors(profile)?;
    let device_counts = DeviceCounts {
        smoke: detectors.smoke,
        heat: detectors.heat,
        call_points: compute_call_points(profile.floors, profile.staircases, profile.construction_type)?,
        interface_units: compute_interface_units(profile),
    };
    let costs = compute_costs_with(prices, &device_counts, profile.react_integration);

    Ok(Estimate {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        profile: profile.clone(),
        contact,
        device_counts,
        costs,
        coverage: coverage_details(profile.construction_type, profile.coverage_level),
        narrative: None,
    })
}

/// Composes validation, the calculators and the optional narrative advisor.
pub struct Estimator {
    advisor: Option<Arc<dyn NarrativeAdvisor>>,
    advisory_timeout: Duration,
    prices: PriceTable,
}

impl Estimator {
    pub fn new() -> Self {
        Self {
            advisor: None,
            advisory_timeout: DEFAULT_ADVISORY_TIMEOUT,
            prices: PriceTable::default(),
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn NarrativeAdvisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn with_advisory_timeout(mut self, timeout: Duration) -> Self {
        self.advisory_timeout = timeout;
        self
    }

    pub fn with_prices(mut self, prices: PriceTable) -> Self {
        self.prices = prices;
        self
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    /// Validate a raw intake record and produce an estimate.
    ///
    /// Validation failures come back with every field message at once. Once
    /// validation passes the numeric estimate is always returned; the narrative
    /// is attached only if the advisor answers within the timeout.
    pub async fn generate_estimate(&self, form: &IntakeForm) -> Result<Estimate, EstimateError> {
        let (profile, contact) = form.validate().map_err(|errors| {
            debug!(fields = errors.len(), "intake form rejected");
            errors
        })?;
        self.finish(&profile, contact).await
    }

    /// Same as `generate_estimate` for callers that already hold a typed profile.
    pub async fn estimate_profile(
        &self,
        profile: &SiteProfile,
        contact: ContactDetails,
    ) -> Result<Estimate, EstimateError> {
        validate_profile(profile)?;
        self.finish(profile, contact).await
    }

    async fn finish(&self, profile: &SiteProfile, contact: ContactDetails) -> Result<Estimate, EstimateError> {
        let mut estimate = compute_estimate(profile, contact, &self.prices)?;
        info!(
            id = %estimate.id,
            construction = %profile.construction_type,
            coverage = %profile.coverage_level,
            devices = estimate.total_devices(),
            total = %estimate.costs.total,
            "estimate computed"
        );

        estimate.narrative = self.narrate(&estimate).await;
        Ok(estimate)
    }

    async fn narrate(&self, estimate: &Estimate) -> Option<String> {
        let advisor = self.advisor.as_ref()?;
        let request = NarrativeRequest {
            profile: estimate.profile.clone(),
            coverage: estimate.coverage.clone(),
            device_counts: estimate.device_counts,
        };

        let outcome = match tokio::time::timeout(self.advisory_timeout, advisor.explain(&request)).await {
            Ok(result) => result,
            Err(_) => Err(AdvisoryError::Timeout(self.advisory_timeout)),
        };

        match outcome {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(id = %estimate.id, "continuing without narrative: {}", e);
                None
            }
        }
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedAdvisor(&'static str);

    #[async_trait]
    impl NarrativeAdvisor for FixedAdvisor {
        async fn explain(&self, _request: &NarrativeRequest) -> Result<String, AdvisoryError> {
            Ok(self.0.to_string())
        }
    }

    struct SlowAdvisor;

    #[async_trait]
    impl NarrativeAdvisor for SlowAdvisor {
        async fn explain(&self, _request: &NarrativeRequest) -> Result<String, AdvisoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".into())
        }
    }

    fn form() -> IntakeForm {
        IntakeForm {
            site_size: "50000".into(),
            floors: "5".into(),
            stairs: "2".into(),
            construction_type: "commercial".into(),
            coverage_level: "max".into(),
            interface_integration: true,
            react_integration: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_estimate_without_advisor() {
        let estimate = Estimator::new().generate_estimate(&form()).await.unwrap();
        assert_eq!(
            estimate.device_counts,
            DeviceCounts { smoke: 77, heat: 9, call_points: 13, interface_units: 1 }
        );
        assert!(estimate.narrative.is_none());
    }

    #[tokio::test]
    async fn test_narrative_attached() {
        let estimator = Estimator::new().with_advisor(Arc::new(FixedAdvisor("Spacing suits an office floor.")));
        let estimate = estimator.generate_estimate(&form()).await.unwrap();
        assert_eq!(estimate.narrative.as_deref(), Some("Spacing suits an office floor."));
    }

    #[tokio::test]
    async fn test_slow_advisor_is_abandoned() {
        let estimator = Estimator::new()
            .with_advisor(Arc::new(SlowAdvisor))
            .with_advisory_timeout(Duration::from_millis(50));
        let estimate = estimator.generate_estimate(&form()).await.unwrap();
        assert!(estimate.narrative.is_none());
        assert_eq!(estimate.device_counts.call_points, 13);
    }

    #[tokio::test]
    async fn test_validation_errors_block_estimate() {
        let mut bad = form();
        bad.site_size = "99".into();
        match Estimator::new().generate_estimate(&bad).await {
            Err(EstimateError::Validation(errors)) => {
                assert_eq!(errors.get(crate::validation::Field::SiteSize), Some("Site size must be at least 100 sq ft"));
            }
            other => panic!("expected validation error, got {:?}", other.map(|e| e.id)),
        }
    }

    #[test]
    fn test_compute_estimate_rejects_unvalidated_profile() {
        let profile = SiteProfile {
            site_size_sq_ft: 1_000.0,
            floors: 0,
            staircases: 1,
            construction_type: crate::model::ConstructionType::Residential,
            coverage_level: crate::model::CoverageLevel::Max,
            interface_integration: false,
            react_integration: false,
        };
        let err = compute_estimate(&profile, ContactDetails::default(), &PriceTable::default()).unwrap_err();
        assert_eq!(err, ComputationError::ZeroFloors);
    }
}
