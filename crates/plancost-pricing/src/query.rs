//! Batching of pricing queries per top-level resource.
//!
//! One query is built per priced component across a resource and its
//! sub-resources. The response array lines up index for index
//! with the outbound queries, and [`zip`] pairs each slot back with the
//! `(address, component)` key that produced it.

use plancost_resource::{PriceFilter, ProductFilter, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{PricingError, Result};

/// GraphQL document sent for every query in a batch.
pub const PRICES_QUERY: &str = "query($productFilter: ProductFilter!, $priceFilter: PriceFilter) { products(filter: $productFilter) { prices(filter: $priceFilter) { priceHash USD } } }";

/// Identifies the component a query was built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub address: String,
    pub component: String,
}

impl QueryKey {
    pub fn new(address: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            component: component.into(),
        }
    }
}

/// Product and price filters of one component, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    pub product_filter: ProductFilter,
    pub price_filter: PriceFilter,
}

/// One entry of the GraphQL batch request body.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQLQuery<'a> {
    pub query: &'static str,
    pub variables: &'a PriceQuery,
}

impl<'a> From<&'a PriceQuery> for GraphQLQuery<'a> {
    fn from(variables: &'a PriceQuery) -> Self {
        Self {
            query: PRICES_QUERY,
            variables,
        }
    }
}

/// A response slot paired with the component it prices.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub key: QueryKey,
    pub result: Value,
}

/// Queries for one top-level resource, in dispatch order.
#[derive(Debug, Clone, Default)]
pub struct QueryBatch {
    pub keys: Vec<QueryKey>,
    pub queries: Vec<PriceQuery>,
}

impl QueryBatch {
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Pair the response array with the keys, slot for slot.
    pub fn zip(self, results: Vec<Value>) -> Result<Vec<QueryResult>> {
        zip(self.keys, results)
    }

    /// Add `owner`'s components, then its sub-resources' in pre-order.
    ///
    /// A resource without cost contributes nothing, and neither do its
    /// descendants: they are never part of a breakdown.
    fn push_tree(&mut self, owner: &Resource) {
        if !owner.has_cost() {
            debug!(address = owner.address(), "resource without cost excluded from batch");
            return;
        }
        for component in owner.price_components() {
            if component.should_skip(owner) {
                debug!(
                    address = owner.address(),
                    component = component.name(),
                    "component skipped"
                );
                continue;
            }
            self.keys.push(QueryKey::new(owner.address(), component.name()));
            self.queries.push(PriceQuery {
                product_filter: component.product_filter().clone(),
                price_filter: component.price_filter().clone(),
            });
        }
        for sub in owner.sub_resources() {
            self.push_tree(sub);
        }
    }
}

/// Build the batch for a top-level resource: its own components first,
/// then each sub-resource's in pre-order.
///
/// Resources without cost, their subtrees and skipped components
/// contribute nothing.
pub fn batch(resource: &Resource) -> QueryBatch {
    let mut batch = QueryBatch::default();
    batch.push_tree(resource);
    batch
}

/// Pair keys with response slots by index.
pub fn zip(keys: Vec<QueryKey>, results: Vec<Value>) -> Result<Vec<QueryResult>> {
    if keys.len() != results.len() {
        return Err(PricingError::ResponseLength {
            expected: keys.len(),
            actual: results.len(),
        });
    }
    Ok(keys
        .into_iter()
        .zip(results)
        .map(|(key, result)| QueryResult { key, result })
        .collect())
}
