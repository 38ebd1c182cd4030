//! Pricing service abstraction.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::query::PriceQuery;

/// Resolves a batch of price queries in one round trip.
///
/// The returned array must line up 1:1 with `queries`. Each slot has the
/// shape `{"data": {"products": [{"prices": [{"priceHash": .., "USD": ..}]}]}}`.
#[async_trait]
pub trait PricingService: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn query_batch(&self, queries: &[PriceQuery]) -> Result<Vec<Value>>;
}
