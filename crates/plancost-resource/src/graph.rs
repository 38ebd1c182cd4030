//! Resource graph construction.
//!
//! Building runs in three stages:
//!
//! 1. **build**: every planned resource with a registered type is
//!    constructed by its [`ResourceKind`]. Unknown types are recorded as
//!    unsupported and otherwise ignored.
//! 2. **link**: reference edges are wired once every resource exists, so
//!    forward and cross-module references resolve. Kinds that react to
//!    references are linked last and re-derive themselves from their
//!    targets as each edge is wired. Edges whose target does not exist are
//!    dropped.
//! 3. **finalize**: each kind gets a last look at its fully linked resource.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::address;
use crate::plan::{Plan, ReferenceEdge};
use crate::region;
use crate::registry::{BuildContext, Registry, ResourceKind};
use crate::resource::Resource;

/// Default region when neither a resource nor the plan names one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Top-level resources of one plan, ordered by address.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    resources: Vec<Resource>,
    unsupported: Vec<String>,
    total: usize,
}

impl ResourceGraph {
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, address: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.address() == address)
    }

    /// Addresses of planned resources whose type is not supported.
    pub fn unsupported(&self) -> &[String] {
        &self.unsupported
    }

    /// Number of resources in the plan.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Split into resources, unsupported addresses and the plan total.
    pub fn into_parts(self) -> (Vec<Resource>, Vec<String>, usize) {
        (self.resources, self.unsupported, self.total)
    }
}

/// Builds a [`ResourceGraph`] from a [`Plan`].
#[derive(Debug, Clone)]
pub struct GraphBuilder<'r> {
    registry: &'r Registry,
    default_region: String,
}

impl<'r> GraphBuilder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            default_region: DEFAULT_REGION.to_string(),
        }
    }

    pub fn with_default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = region.into();
        self
    }

    /// Run all three stages over a plan.
    #[instrument(level = "debug", skip_all, fields(planned = plan.resources.len()))]
    pub fn build(&self, plan: &Plan) -> ResourceGraph {
        let (mut resources, kinds, unsupported) = self.build_resources(plan);
        link(&mut resources, &kinds, &plan.reference_edges());
        finalize(&mut resources, &kinds);

        info!(
            built = resources.len(),
            unsupported = unsupported.len(),
            "resource graph built"
        );

        ResourceGraph {
            resources: resources.into_values().collect(),
            unsupported,
            total: plan.resources.len(),
        }
    }

    fn build_resources(
        &self,
        plan: &Plan,
    ) -> (
        BTreeMap<String, Resource>,
        BTreeMap<String, Arc<dyn ResourceKind>>,
        Vec<String>,
    ) {
        let mut resources = BTreeMap::new();
        let mut kinds = BTreeMap::new();
        let mut unsupported = Vec::new();

        for planned in &plan.resources {
            let Some(kind) = self.registry.get(&planned.resource_type) else {
                debug!(
                    address = %planned.address,
                    resource_type = %planned.resource_type,
                    "unsupported resource type"
                );
                unsupported.push(planned.address.clone());
                continue;
            };

            let region = region::resolve(
                &planned.values,
                plan.region.as_deref(),
                &self.default_region,
            );
            let resource = kind.build(&BuildContext {
                address: &planned.address,
                resource_type: &planned.resource_type,
                values: &planned.values,
                region: &region,
            });

            if resources.insert(planned.address.clone(), resource).is_some() {
                warn!(address = %planned.address, "duplicate resource address, keeping the last");
            }
            kinds.insert(planned.address.clone(), Arc::clone(kind));
        }

        unsupported.sort();
        (resources, kinds, unsupported)
    }
}

fn link(
    resources: &mut BTreeMap<String, Resource>,
    kinds: &BTreeMap<String, Arc<dyn ResourceKind>>,
    edges: &[ReferenceEdge],
) {
    let mut by_source: BTreeMap<&str, Vec<&ReferenceEdge>> = BTreeMap::new();
    for edge in edges {
        by_source.entry(edge.address.as_str()).or_default().push(edge);
    }
    let aliases = index_aliases(resources);

    for reactive in [false, true] {
        for (source, edges) in &by_source {
            let Some(kind) = kinds.get(*source) else {
                continue;
            };
            if kind.reacts_to_references() != reactive {
                continue;
            }
            // Taken out while linking so targets can be borrowed from the map.
            let Some(mut resource) = resources.remove(*source) else {
                continue;
            };

            for edge in edges {
                let target_address = aliases.get(&edge.target).unwrap_or(&edge.target);
                let Some(target) = resources.get(target_address) else {
                    debug!(
                        address = %edge.address,
                        attribute = %edge.attribute,
                        target = %edge.target,
                        "reference target not found"
                    );
                    continue;
                };
                resource.add_reference(&edge.attribute, target_address);
                if reactive {
                    kind.on_reference(&mut resource, &edge.attribute, target);
                }
            }

            resources.insert((*source).to_string(), resource);
        }
    }
}

/// Map each unindexed address to the single indexed resource it names, so
/// a reference to `aws_launch_template.lt` reaches `aws_launch_template.lt[0]`.
/// Addresses shared by several instances, or planned as written, get no alias.
fn index_aliases(resources: &BTreeMap<String, Resource>) -> BTreeMap<String, String> {
    let mut candidates: BTreeMap<String, Vec<&String>> = BTreeMap::new();
    for planned in resources.keys() {
        let stripped = address::strip_array_indices(planned);
        if stripped != *planned {
            candidates.entry(stripped).or_default().push(planned);
        }
    }
    candidates
        .into_iter()
        .filter(|(stripped, _)| !resources.contains_key(stripped))
        .filter_map(|(stripped, matches)| match matches.as_slice() {
            [only] => Some((stripped, (*only).clone())),
            _ => None,
        })
        .collect()
}

fn finalize(
    resources: &mut BTreeMap<String, Resource>,
    kinds: &BTreeMap<String, Arc<dyn ResourceKind>>,
) {
    for (address, resource) in resources.iter_mut() {
        if let Some(kind) = kinds.get(address) {
            kind.finalize(resource);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::plan::PlanResource;
    use std::sync::Mutex;

    struct Passive;

    impl ResourceKind for Passive {
        fn build(&self, ctx: &BuildContext<'_>) -> Resource {
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region)
        }
    }

    #[derive(Default)]
    struct Recording {
        seen: Arc<Mutex<Vec<(String, String, usize)>>>,
    }

    impl ResourceKind for Recording {
        fn build(&self, ctx: &BuildContext<'_>) -> Resource {
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone())
        }

        fn reacts_to_references(&self) -> bool {
            true
        }

        fn on_reference(&self, resource: &mut Resource, name: &str, target: &Resource) {
            self.seen.lock().unwrap().push((
                resource.address().to_string(),
                name.to_string(),
                target.references().len(),
            ));
        }
    }

    fn planned(address: &str, resource_type: &str) -> PlanResource {
        PlanResource::new(address, resource_type, Attributes::new())
    }

    #[test]
    fn test_unknown_types_are_skipped() {
        let mut registry = Registry::new();
        registry.register("known", Passive);
        let plan = Plan {
            resources: vec![planned("known.a", "known"), planned("mystery.b", "mystery")],
            ..Plan::default()
        };

        let graph = GraphBuilder::new(&registry).build(&plan);

        assert_eq!(graph.resources().len(), 1);
        assert_eq!(graph.unsupported(), ["mystery.b".to_string()]);
        assert_eq!(graph.total(), 2);
    }

    #[test]
    fn test_forward_references_resolve() {
        let mut registry = Registry::new();
        registry.register("known", Passive);
        let plan = Plan {
            resources: vec![planned("known.a", "known"), planned("known.z", "known")],
            references: vec![
                ReferenceEdge::new("known.a", "peer", "known.z"),
                ReferenceEdge::new("known.a", "ghost", "known.missing"),
                ReferenceEdge::new("known.a", "self", "known.a"),
            ],
            ..Plan::default()
        };

        let graph = GraphBuilder::new(&registry).build(&plan);
        let a = graph.get("known.a").unwrap();

        assert_eq!(a.references().len(), 1);
        assert_eq!(a.references()["peer"], "known.z");
    }

    #[test]
    fn test_reference_reaches_single_indexed_instance() {
        let mut registry = Registry::new();
        registry.register("known", Passive);
        let plan = Plan {
            resources: vec![
                planned("known.a", "known"),
                planned("known.one[0]", "known"),
                planned("known.many[0]", "known"),
                planned("known.many[1]", "known"),
            ],
            references: vec![
                ReferenceEdge::new("known.a", "single", "known.one"),
                ReferenceEdge::new("known.a", "ambiguous", "known.many"),
            ],
            ..Plan::default()
        };

        let graph = GraphBuilder::new(&registry).build(&plan);
        let a = graph.get("known.a").unwrap();

        assert_eq!(a.references().len(), 1);
        assert_eq!(a.references()["single"], "known.one[0]");
    }

    #[test]
    fn test_reacting_kinds_link_after_passive_targets() {
        let recording = Recording::default();
        let seen = Arc::clone(&recording.seen);
        let mut registry = Registry::new();
        registry.register("known", Passive);
        registry.register("group", recording);

        let plan = Plan {
            resources: vec![
                planned("a_group.g", "group"),
                planned("known.t", "known"),
                planned("known.u", "known"),
            ],
            references: vec![
                ReferenceEdge::new("a_group.g", "template", "known.t"),
                ReferenceEdge::new("known.t", "peer", "known.u"),
            ],
            ..Plan::default()
        };

        GraphBuilder::new(&registry).build(&plan);

        // The target was already linked when the group reacted to it.
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("a_group.g".to_string(), "template".to_string(), 1)]
        );
    }

    #[test]
    fn test_region_resolution() {
        let mut registry = Registry::new();
        registry.register("known", Passive);
        let plan = Plan {
            region: Some("eu-west-2".into()),
            resources: vec![planned("known.a", "known")],
            ..Plan::default()
        };

        let graph = GraphBuilder::new(&registry).build(&plan);
        assert_eq!(graph.get("known.a").unwrap().region(), Some("eu-west-2"));

        let graph = GraphBuilder::new(&registry)
            .with_default_region("ap-south-1")
            .build(&Plan {
                region: None,
                ..plan
            });
        assert_eq!(graph.get("known.a").unwrap().region(), Some("ap-south-1"));
    }
}
