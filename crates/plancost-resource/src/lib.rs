//! # plancost-resource
//!
//! The resource and price component model for plancost.
//!
//! This crate provides:
//! - [`Filter`], [`ProductFilter`], [`PriceFilter`] - Catalog lookup filters and filter merging
//! - [`PriceComponent`] - A billable dimension with its quantity rule and resolved price
//! - [`Resource`] - A node in the resource tree
//! - [`Plan`] - The normalized plan snapshot consumed by the builder
//! - [`GraphBuilder`] - Builds and links resources from a plan through a type [`Registry`]
//!
//! ## Example
//!
//! ```no_run
//! use plancost_resource::{GraphBuilder, Plan, Registry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let plan = Plan::from_json(&std::fs::read_to_string("plan.json")?)?;
//!
//!     let registry = Registry::with_aws();
//!     let graph = GraphBuilder::new(&registry).build(&plan);
//!
//!     for resource in graph.resources() {
//!         println!("{} ({} components)", resource.address(), resource.price_components().len());
//!     }
//!     println!("{} of {} resources not supported", graph.unsupported().len(), graph.total());
//!
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod attributes;
pub mod aws;
pub mod error;
pub mod filter;
pub mod graph;
pub mod plan;
pub mod price_component;
pub mod region;
pub mod registry;
pub mod resource;

// Re-export main types
pub use attributes::Attributes;
pub use error::{ResourceError, Result};
pub use filter::{AttributeFilter, Filter, FilterOperation, PriceFilter, ProductFilter, ValueMapping};
pub use graph::{GraphBuilder, ResourceGraph};
pub use plan::{ConfiguredResource, ModuleCall, ModuleConfiguration, Plan, PlanResource, ReferenceEdge};
pub use price_component::{HOURS_IN_MONTH, PriceComponent, ResolvedPrice, TimeUnit, round_cost};
pub use registry::{BuildContext, Registry, ResourceKind};
pub use resource::Resource;
