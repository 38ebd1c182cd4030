//! Normalized plan representation.
//!
//! A [`Plan`] is the already-parsed snapshot the graph builder consumes:
//! planned resources with their attribute values, the configuration tree
//! that records which attributes refer to which other resources, and any
//! reference edges the producer resolved itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address;
use crate::attributes::Attributes;
use crate::error::Result;

/// A planned resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResource {
    pub address: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub values: Attributes,
}

impl PlanResource {
    pub fn new(address: impl Into<String>, resource_type: impl Into<String>, values: Attributes) -> Self {
        Self {
            address: address.into(),
            resource_type: resource_type.into(),
            values,
        }
    }
}

/// Configuration of one resource block.
///
/// `address` is module-relative and carries no instance index. Each
/// expression is either `{"references": [...]}`, a nested block object, or
/// an array of nested blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredResource {
    pub address: String,
    #[serde(default)]
    pub expressions: serde_json::Map<String, Value>,
}

/// A module call in the configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleCall {
    #[serde(default)]
    pub module: ModuleConfiguration,
}

/// Configuration of one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfiguration {
    #[serde(default)]
    pub resources: Vec<ConfiguredResource>,
    #[serde(default)]
    pub module_calls: BTreeMap<String, ModuleCall>,
}

impl ModuleConfiguration {
    /// Walk `module_calls` along a module path.
    pub fn module(&self, names: &[String]) -> Option<&ModuleConfiguration> {
        names.iter().try_fold(self, |config, name| {
            config.module_calls.get(name).map(|call| &call.module)
        })
    }
}

/// A named, directed edge between two resource addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEdge {
    /// Source resource address
    pub address: String,
    /// Reference name (the attribute path that declared it)
    pub attribute: String,
    /// Target resource address
    pub target: String,
}

impl ReferenceEdge {
    pub fn new(
        address: impl Into<String>,
        attribute: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            attribute: attribute.into(),
            target: target.into(),
        }
    }
}

/// Normalized plan snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Provider region, when the plan sets one
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub resources: Vec<PlanResource>,
    #[serde(default)]
    pub configuration: ModuleConfiguration,
    /// Edges resolved by the plan producer
    #[serde(default)]
    pub references: Vec<ReferenceEdge>,
}

impl Plan {
    /// Parse a plan from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a plan from JSON bytes.
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Find the configuration block for a (possibly module-nested, indexed)
    /// resource address.
    pub fn configuration_for(&self, resource_address: &str) -> Option<&ConfiguredResource> {
        let module_names = address::module_names(resource_address).ok()?;
        let key = address::strip_array_indices(&address::resource_part(resource_address).ok()?);
        self.configuration
            .module(&module_names)?
            .resources
            .iter()
            .find(|r| r.address == key)
    }

    /// All reference edges: explicit ones first, then those extracted from
    /// configuration expressions.
    ///
    /// Extracted targets are qualified with the source's module chain.
    /// Whether a target exists is left to the graph builder.
    pub fn reference_edges(&self) -> Vec<ReferenceEdge> {
        let mut edges = self.references.clone();

        for resource in &self.resources {
            let Some(config) = self.configuration_for(&resource.address) else {
                continue;
            };
            let Ok(module) = address::module_part(&resource.address) else {
                continue;
            };

            let mut found = Vec::new();
            for (attribute, expression) in &config.expressions {
                collect_references(attribute, expression, &mut found);
            }
            edges.extend(found.into_iter().map(|(attribute, target)| {
                ReferenceEdge::new(&resource.address, attribute, address::qualify(&module, &target))
            }));
        }

        edges
    }
}

fn collect_references(attribute: &str, expression: &Value, out: &mut Vec<(String, String)>) {
    match expression {
        Value::Object(obj) => match obj.get("references") {
            Some(Value::Array(refs)) => {
                out.extend(
                    refs.iter()
                        .filter_map(Value::as_str)
                        .map(|target| (attribute.to_string(), target.to_string())),
                );
            }
            Some(_) => {}
            None => {
                for (child, value) in obj {
                    collect_references(&format!("{attribute}.{child}"), value, out);
                }
            }
        },
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_references(&format!("{attribute}.{i}"), item, out);
            }
        }
        _ => {}
    }
}
