//! Resource type registry.
//!
//! Each supported resource type maps to a [`ResourceKind`], which builds the
//! type's [`Resource`] from raw values and, for kinds whose cost depends on
//! another resource, re-derives it while references are wired.

use std::collections::HashMap;
use std::sync::Arc;

use crate::attributes::Attributes;
use crate::resource::Resource;

/// Everything a constructor gets to see about one planned resource.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub address: &'a str,
    pub resource_type: &'a str,
    pub values: &'a Attributes,
    pub region: &'a str,
}

/// Construction behaviour of one resource type.
pub trait ResourceKind: Send + Sync {
    /// Build the resource and its sub-resources from raw values.
    fn build(&self, ctx: &BuildContext<'_>) -> Resource;

    /// Whether [`on_reference`](Self::on_reference) does anything.
    ///
    /// Reacting kinds are linked after all other resources, so the targets
    /// they read are already fully linked.
    fn reacts_to_references(&self) -> bool {
        false
    }

    /// Called after a reference named `name` to `target` has been wired.
    fn on_reference(&self, _resource: &mut Resource, _name: &str, _target: &Resource) {}

    /// Called once every reference in the plan has been wired.
    fn finalize(&self, _resource: &mut Resource) {}
}

/// Map from resource type tag to its kind.
#[derive(Clone, Default)]
pub struct Registry {
    kinds: HashMap<&'static str, Arc<dyn ResourceKind>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in AWS resource type.
    pub fn with_aws() -> Self {
        let mut registry = Self::new();
        crate::aws::register(&mut registry);
        registry
    }

    /// Register a kind, replacing any previous one for the same type.
    pub fn register(&mut self, resource_type: &'static str, kind: impl ResourceKind + 'static) {
        self.kinds.insert(resource_type, Arc::new(kind));
    }

    pub fn get(&self, resource_type: &str) -> Option<&Arc<dyn ResourceKind>> {
        self.kinds.get(resource_type)
    }

    pub fn is_supported(&self, resource_type: &str) -> bool {
        self.kinds.contains_key(resource_type)
    }

    /// Supported type tags, sorted.
    pub fn supported_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.kinds.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.supported_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl ResourceKind for Plain {
        fn build(&self, ctx: &BuildContext<'_>) -> Resource {
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        registry.register("custom_thing", Plain);

        assert!(registry.is_supported("custom_thing"));
        assert!(!registry.is_supported("aws_instance"));

        let kind = registry.get("custom_thing").unwrap();
        assert!(!kind.reacts_to_references());
        let values = Attributes::new();
        let r = kind.build(&BuildContext {
            address: "custom_thing.a",
            resource_type: "custom_thing",
            values: &values,
            region: "eu-west-1",
        });
        assert_eq!(r.address(), "custom_thing.a");
        assert_eq!(r.region(), Some("eu-west-1"));
    }

    #[test]
    fn test_aws_registry_types() {
        let registry = Registry::with_aws();
        for t in [
            "aws_instance",
            "aws_ebs_volume",
            "aws_autoscaling_group",
            "aws_launch_template",
            "aws_nat_gateway",
        ] {
            assert!(registry.is_supported(t), "{t} should be registered");
        }
        let types = registry.supported_types();
        assert!(types.windows(2).all(|w| w[0] < w[1]));
    }
}
