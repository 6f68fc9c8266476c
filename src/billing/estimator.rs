use crate::billing::{calculate_cost, Rate};
use crate::error::CostError;
use crate::freetier::{find_matching_item, FreeTierService};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Full breakdown of one cost estimate.
#[derive(Debug, Clone, Serialize)]
pub struct CostEstimate {
    pub total_usage: f64,
    pub free_tier_applied: f64,
    pub billable_usage: f64,
    pub estimated_cost: f64,
    pub currency_code: String,
    pub unit: String,
    pub price_per_unit: f64,
    pub tiered_pricing: bool,
    pub number_of_tiers: usize,
    pub cost_breakdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_tier_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_tier_source_url: Option<String>,
}

/// Produces cost estimates from a rate table and usage amount, deducting
/// any free tier allowance resolved for the service first.
///
/// Free tier resolution is best effort: when it fails or finds nothing,
/// the estimate proceeds with zero deduction.
pub struct CostEstimator {
    free_tier: Arc<FreeTierService>,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl CostEstimator {
    pub fn new() -> Self {
        Self::with_free_tier_service(Arc::new(FreeTierService::new()))
    }

    pub fn with_free_tier_service(free_tier: Arc<FreeTierService>) -> Self {
        Self { free_tier }
    }

    /// Estimate the cost of `usage_amount` units against `rate`. When a
    /// service name is supplied, its free tier allowance (if any) is
    /// matched against the rate's usage unit and deducted before pricing.
    pub async fn estimate(
        &self,
        rate: Option<&Rate>,
        usage_amount: f64,
        service_name: Option<&str>,
    ) -> Result<CostEstimate, CostError> {
        if usage_amount < 0.0 {
            return Err(CostError::InvalidUsage);
        }

        let rate = rate.ok_or(CostError::InvalidRate)?;
        if rate.tiers.is_empty() {
            return Err(CostError::NoPricingTiers);
        }

        let total_usage = usage_amount;
        let mut billable_usage = usage_amount;
        let mut free_tier_applied = 0.0;
        let mut free_tier_note = None;
        let mut free_tier_source_url = None;

        if let Some(name) = service_name {
            if let Some(record) = self.free_tier.get_free_tier(name).await {
                if let Some(item) = find_matching_item(&record, &rate.usage_unit) {
                    free_tier_applied = total_usage.min(item.amount);
                    billable_usage = (total_usage - item.amount).max(0.0);
                    free_tier_note = Some(format!(
                        "Free tier applied: {:.0} {} ({}, {})",
                        item.amount, item.resource, record.scope, record.period
                    ));
                    free_tier_source_url = Some(record.source_url.clone());

                    debug!(
                        service = name,
                        deducted = free_tier_applied,
                        billable = billable_usage,
                        "free tier deducted"
                    );
                }
            }
        }

        let estimated_cost = calculate_cost(Some(rate), billable_usage)?;

        let price_per_unit = if billable_usage > 0.0 {
            estimated_cost / billable_usage
        } else {
            rate.tiers[0].list_price.per_unit()
        };

        let mut cost_breakdown = String::new();
        if free_tier_applied > 0.0 {
            cost_breakdown.push_str(&format!(
                "Total usage: {:.2} {unit}. Free tier deducted: {:.2} {unit}. Billable usage: {:.2} {unit}. ",
                total_usage,
                free_tier_applied,
                billable_usage,
                unit = rate.usage_unit
            ));
        }
        if rate.is_tiered() {
            cost_breakdown.push_str(&format!(
                "Calculated using {} pricing tiers. Estimated cost: {:.6} {}",
                rate.tiers.len(),
                estimated_cost,
                rate.currency_code
            ));
        } else {
            cost_breakdown.push_str(&format!(
                "Flat rate: {:.6} {currency} per unit = {:.6} {currency}",
                price_per_unit,
                estimated_cost,
                currency = rate.currency_code
            ));
        }

        Ok(CostEstimate {
            total_usage,
            free_tier_applied,
            billable_usage,
            estimated_cost,
            currency_code: rate.currency_code.clone(),
            unit: rate.usage_unit.clone(),
            price_per_unit,
            tiered_pricing: rate.is_tiered(),
            number_of_tiers: rate.tiers.len(),
            cost_breakdown,
            free_tier_note,
            free_tier_source_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freetier::{DocScraper, FreeTierCache, SearchClient};
    use httpmock::prelude::*;

    fn per_second_rate() -> Rate {
        Rate::flat("USD", "s", 0, 24_000) // $0.000024/s
    }

    #[tokio::test]
    async fn test_estimate_without_service_name() {
        let estimator = CostEstimator::new();
        let rate = per_second_rate();
        let estimate = estimator
            .estimate(Some(&rate), 2_628_000.0, None)
            .await
            .unwrap();

        assert!((estimate.estimated_cost - 63.072).abs() < 1e-6);
        assert_eq!(estimate.free_tier_applied, 0.0);
        assert_eq!(estimate.billable_usage, 2_628_000.0);
        assert!(estimate.free_tier_note.is_none());
        assert!(!estimate.tiered_pricing);
    }

    #[tokio::test]
    async fn test_estimate_rejects_negative_usage() {
        let estimator = CostEstimator::new();
        let rate = per_second_rate();
        let err = estimator
            .estimate(Some(&rate), -1.0, None)
            .await
            .unwrap_err();
        assert_eq!(err, CostError::InvalidUsage);
    }

    #[tokio::test]
    async fn test_estimate_requires_rate() {
        let estimator = CostEstimator::new();
        let err = estimator.estimate(None, 100.0, None).await.unwrap_err();
        assert_eq!(err, CostError::InvalidRate);

        let empty = Rate::default();
        let err = estimator
            .estimate(Some(&empty), 100.0, None)
            .await
            .unwrap_err();
        assert_eq!(err, CostError::NoPricingTiers);
    }

    #[tokio::test]
    async fn test_estimate_applies_free_tier() {
        let server = MockServer::start_async().await;
        let body = serde_json::json!({
            "AbstractURL": server.url("/run/pricing"),
            "AbstractText": "Cloud Run pricing",
            "RelatedTopics": []
        });
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(body);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/run/pricing");
                then.status(200).body(
                    "<html><body><main><p>Pricing: 240,000 vCPU-seconds \
                     per month free of charge, per billing account.</p></main></body></html>",
                );
            })
            .await;

        let free_tier = Arc::new(FreeTierService::with_parts(
            SearchClient::with_endpoints(server.url("/search"), "127.0.0.1"),
            DocScraper::with_base_url(server.base_url()),
            FreeTierCache::new(),
        ));
        let estimator = CostEstimator::with_free_tier_service(free_tier);

        let rate = per_second_rate();
        let estimate = estimator
            .estimate(Some(&rate), 1_000_000.0, Some("Cloud Run"))
            .await
            .unwrap();

        assert_eq!(estimate.free_tier_applied, 240_000.0);
        assert_eq!(estimate.billable_usage, 760_000.0);
        assert!((estimate.estimated_cost - 760_000.0 * 0.000024).abs() < 1e-9);
        let note = estimate.free_tier_note.unwrap();
        assert!(note.contains("240000 vCPU-seconds"));
        assert!(note.contains("account"));
        assert!(estimate.free_tier_source_url.is_some());
        assert!(estimate.cost_breakdown.contains("Free tier deducted"));
    }

    #[tokio::test]
    async fn test_usage_fully_inside_free_tier() {
        let server = MockServer::start_async().await;
        let body = serde_json::json!({
            "AbstractURL": server.url("/run/pricing"),
            "AbstractText": "Cloud Run pricing",
            "RelatedTopics": []
        });
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(body);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/run/pricing");
                then.status(200).body(
                    "<html><body><p>Pricing: 240,000 vCPU-seconds per month free.</p></body></html>",
                );
            })
            .await;

        let free_tier = Arc::new(FreeTierService::with_parts(
            SearchClient::with_endpoints(server.url("/search"), "127.0.0.1"),
            DocScraper::with_base_url(server.base_url()),
            FreeTierCache::new(),
        ));
        let estimator = CostEstimator::with_free_tier_service(free_tier);

        let rate = per_second_rate();
        let estimate = estimator
            .estimate(Some(&rate), 100_000.0, Some("Cloud Run"))
            .await
            .unwrap();

        assert_eq!(estimate.free_tier_applied, 100_000.0);
        assert_eq!(estimate.billable_usage, 0.0);
        assert_eq!(estimate.estimated_cost, 0.0);
        // Display price falls back to the first tier when nothing is billed
        assert!((estimate.price_per_unit - 0.000024).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_resolution_failure_degrades_to_zero_deduction() {
        // Search endpoint unreachable and fallback URLs point at the real
        // host, which the mock scraper refuses: no free tier, no error.
        let free_tier = Arc::new(FreeTierService::with_parts(
            SearchClient::with_endpoints("http://127.0.0.1:1/", "cloud.google.com"),
            DocScraper::with_base_url("http://127.0.0.1:1"),
            FreeTierCache::new(),
        ));
        let estimator = CostEstimator::with_free_tier_service(free_tier);

        let rate = per_second_rate();
        let estimate = estimator
            .estimate(Some(&rate), 1000.0, Some("Cloud Run"))
            .await
            .unwrap();

        assert_eq!(estimate.free_tier_applied, 0.0);
        assert!((estimate.estimated_cost - 1000.0 * 0.000024).abs() < 1e-9);
    }
}
