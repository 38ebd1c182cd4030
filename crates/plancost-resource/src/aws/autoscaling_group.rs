//! Autoscaling groups.
//!
//! A group has no price components of its own. When it is linked to its
//! launch configuration or launch template it copies the template's
//! components and mirrors the template's block devices under its own
//! address, then scales everything by `desired_capacity`.

use tracing::{debug, warn};

use crate::attributes::count_value;
use crate::registry::{BuildContext, ResourceKind};
use crate::resource::Resource;

/// Reference names that point a group at its instance template.
pub const TEMPLATE_REFERENCES: &[&str] = &[
    "launch_configuration",
    "launch_template",
    "launch_template.0.id",
    "launch_template.0.name",
];

const TEMPLATE_TYPES: &[&str] = &["aws_launch_configuration", "aws_launch_template"];

fn desired_capacity(group: &Resource) -> u32 {
    count_value(group.raw_values(), "desired_capacity").unwrap_or(1)
}

/// `aws_autoscaling_group`
#[derive(Debug, Clone, Copy)]
pub struct AutoscalingGroup;

impl ResourceKind for AutoscalingGroup {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let mut group =
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region);
        let count = desired_capacity(&group);
        group.set_resource_count(count);
        group
    }

    fn reacts_to_references(&self) -> bool {
        true
    }

    fn on_reference(&self, group: &mut Resource, name: &str, target: &Resource) {
        if !TEMPLATE_REFERENCES.contains(&name) {
            return;
        }
        if !TEMPLATE_TYPES.contains(&target.resource_type()) {
            debug!(
                address = group.address(),
                target = target.address(),
                "template reference does not point at a launch template"
            );
            return;
        }

        let components = target
            .price_components()
            .iter()
            .map(|component| component.detached_from(target))
            .collect();
        let mirrored = target
            .sub_resources()
            .iter()
            .map(|sub| sub.readdressed_under(target.address(), group.address()))
            .collect();

        group.replace_price_components(components);
        group.replace_sub_resources(mirrored);
        let count = desired_capacity(group);
        group.set_resource_count(count);

        debug!(
            address = group.address(),
            template = target.address(),
            count,
            "mirrored launch template"
        );
    }

    fn finalize(&self, group: &mut Resource) {
        if group.price_components().is_empty() {
            warn!(
                address = group.address(),
                "autoscaling group has no launch configuration or template, not estimated"
            );
        }
    }
}
