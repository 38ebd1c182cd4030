//! Bounded-concurrency estimation over a resource graph.
//!
//! Each top-level resource is one unit of work: its batch is dispatched as
//! one request and its prices applied together, so a resource is either fully
//! priced or reported as failed. Breakdowns are sorted once every unit has
//! finished.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use plancost_core::Config;
use plancost_resource::{Resource, ResourceGraph};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::aggregator::{CostBreakdown, apply_prices, breakdown, sort_breakdowns};
use crate::error::Result;
use crate::query::batch;
use crate::service::PricingService;

/// Default number of top-level resources priced in parallel.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// A top-level resource whose batch failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateFailure {
    pub address: String,
    pub error: String,
}

/// Result of one estimation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    /// Breakdowns sorted by address
    pub breakdowns: Vec<CostBreakdown>,
    /// Resources whose pricing batch failed
    pub failures: Vec<EstimateFailure>,
    /// Addresses of resources with an unsupported type
    pub unsupported: Vec<String>,
    /// Number of resources in the plan
    pub total_resources: usize,
}

impl EstimateReport {
    pub fn total_hourly_cost(&self) -> Decimal {
        self.breakdowns
            .iter()
            .map(CostBreakdown::total_hourly_cost)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn total_monthly_cost(&self) -> Decimal {
        self.breakdowns
            .iter()
            .map(CostBreakdown::total_monthly_cost)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Find a top-level breakdown by address.
    pub fn breakdown(&self, address: &str) -> Option<&CostBreakdown> {
        self.breakdowns.iter().find(|b| b.resource_address == address)
    }

    /// "N of M resources not estimated", when any resource type was unsupported.
    pub fn advisory(&self) -> Option<String> {
        (!self.unsupported.is_empty()).then(|| {
            format!(
                "{} of {} resources not estimated (unsupported resource types)",
                self.unsupported.len(),
                self.total_resources
            )
        })
    }
}

/// Prices a resource graph through a [`PricingService`].
pub struct Estimator {
    service: Arc<dyn PricingService>,
    concurrency: usize,
}

impl Estimator {
    pub fn new(service: Arc<dyn PricingService>) -> Self {
        Self {
            service,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Estimator with the configured concurrency limit.
    pub fn from_config(service: Arc<dyn PricingService>, config: &Config) -> Self {
        Self::new(service).with_concurrency(config.concurrency)
    }

    /// Set the concurrency limit (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Price every top-level resource of `graph`.
    #[instrument(level = "debug", skip_all, fields(service = self.service.name(), concurrency = self.concurrency))]
    pub async fn estimate(&self, graph: ResourceGraph) -> EstimateReport {
        let (resources, unsupported, total_resources) = graph.into_parts();

        let outcomes: Vec<(String, Result<Option<CostBreakdown>>)> = stream::iter(resources)
            .map(|resource| async move {
                let address = resource.address().to_string();
                (address, self.price_resource(resource).await)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = EstimateReport {
            unsupported,
            total_resources,
            ..EstimateReport::default()
        };
        for (address, outcome) in outcomes {
            match outcome {
                Ok(Some(breakdown)) => report.breakdowns.push(breakdown),
                Ok(None) => debug!(address = %address, "resource has no cost"),
                Err(e) => {
                    warn!(address = %address, error = %e, "pricing failed for resource");
                    report.failures.push(EstimateFailure {
                        address,
                        error: e.to_string(),
                    });
                }
            }
        }
        sort_breakdowns(&mut report.breakdowns);
        report.failures.sort_by(|a, b| a.address.cmp(&b.address));

        info!(
            estimated = report.breakdowns.len(),
            failed = report.failures.len(),
            unsupported = report.unsupported.len(),
            total = report.total_resources,
            "estimate complete"
        );
        report
    }

    /// Price one top-level resource and build its breakdown.
    ///
    /// Returns `None` for resources without cost.
    pub async fn price_resource(&self, mut resource: Resource) -> Result<Option<CostBreakdown>> {
        if !resource.has_cost() {
            return Ok(None);
        }

        let batch = batch(&resource);
        debug!(address = resource.address(), queries = batch.len(), "pricing resource");

        let results = self.service.query_batch(&batch.queries).await?;
        let results = batch.zip(results)?;
        apply_prices(&mut resource, &results)?;

        breakdown(&resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;

    #[test]
    fn test_concurrency_is_at_least_one() {
        let estimator = Estimator::new(Arc::new(StaticCatalog::default())).with_concurrency(0);
        assert_eq!(estimator.concurrency(), 1);

        let configured = Estimator::from_config(
            Arc::new(StaticCatalog::default()),
            &Config::default().with_concurrency(8),
        );
        assert_eq!(configured.concurrency(), 8);
    }

    #[test]
    fn test_advisory_only_with_unsupported() {
        let mut report = EstimateReport {
            total_resources: 5,
            ..EstimateReport::default()
        };
        assert_eq!(report.advisory(), None);

        report.unsupported = vec!["aws_s3_bucket.a".to_string(), "aws_sqs_queue.b".to_string()];
        assert_eq!(
            report.advisory().as_deref(),
            Some("2 of 5 resources not estimated (unsupported resource types)")
        );
    }
}
