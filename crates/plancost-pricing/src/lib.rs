//! # plancost-pricing
//!
//! Pricing queries and cost aggregation for plancost resource graphs.
//!
//! This crate provides:
//! - [`query`] - One batched query per priced component of a top-level resource
//! - [`PricingService`] - The seam to a pricing backend
//! - [`PricingClient`] - GraphQL pricing API client over HTTP
//! - [`StaticCatalog`] - In-memory catalog loaded from JSON or YAML
//! - [`aggregator`] - First-wins price selection and cost breakdown trees
//! - [`Estimator`] - Bounded-concurrency pricing of a whole graph
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use plancost_pricing::{Estimator, StaticCatalog};
//! use plancost_resource::{GraphBuilder, Plan, Registry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let plan = Plan::from_json(&std::fs::read_to_string("plan.json")?)?;
//!     let graph = GraphBuilder::new(&Registry::with_aws()).build(&plan);
//!
//!     let catalog = StaticCatalog::load("catalog.yaml").await?;
//!     let report = Estimator::new(Arc::new(catalog)).estimate(graph).await;
//!
//!     println!("Monthly cost: {}", report.total_monthly_cost());
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod catalog;
pub mod client;
pub mod error;
pub mod estimator;
pub mod query;
pub mod service;

// Re-export main types
pub use aggregator::{ComponentCost, CostBreakdown};
pub use catalog::{CatalogPrice, CatalogProduct, StaticCatalog};
pub use client::PricingClient;
pub use error::{PricingError, Result};
pub use estimator::{EstimateFailure, EstimateReport, Estimator};
pub use query::{PriceQuery, QueryBatch, QueryKey, QueryResult};
pub use service::PricingService;
