//! Launch configurations and launch templates.
//!
//! Neither costs anything by itself. Both carry the instance-hour component
//! and block devices an autoscaling group mirrors when it references them.

use crate::attributes::{first_block, str_value};
use crate::aws::ebs::{instance_block_devices, template_block_devices};
use crate::aws::instance::{ON_DEMAND, SPOT, instance_hours, tenancy};
use crate::filter::{ValueMapping, map_attributes, merge};
use crate::registry::{BuildContext, ResourceKind};
use crate::resource::Resource;

const LAUNCH_CONFIGURATION_MAPPINGS: &[ValueMapping] = &[
    ValueMapping::new("instance_type", "instanceType"),
    ValueMapping::with_transform("placement_tenancy", "tenancy", tenancy),
];

const LAUNCH_TEMPLATE_MAPPINGS: &[ValueMapping] = &[ValueMapping::new("instance_type", "instanceType")];

const PLACEMENT_MAPPINGS: &[ValueMapping] = &[ValueMapping::with_transform("tenancy", "tenancy", tenancy)];

/// `aws_launch_configuration`
#[derive(Debug, Clone, Copy)]
pub struct LaunchConfiguration;

impl ResourceKind for LaunchConfiguration {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let mut config = Resource::new(ctx.address, ctx.resource_type, ctx.values.clone())
            .in_region(ctx.region)
            .without_cost();

        let purchase_option = if str_value(ctx.values, "spot_price").is_some() {
            SPOT
        } else {
            ON_DEMAND
        };
        let overrides = map_attributes(LAUNCH_CONFIGURATION_MAPPINGS, ctx.values);
        config.add_price_component(instance_hours(ctx.region, &overrides, purchase_option));

        for device in instance_block_devices(ctx.address, ctx.region, ctx.values) {
            config.add_sub_resource(device);
        }
        config
    }
}

/// `aws_launch_template`
#[derive(Debug, Clone, Copy)]
pub struct LaunchTemplate;

impl ResourceKind for LaunchTemplate {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let mut template = Resource::new(ctx.address, ctx.resource_type, ctx.values.clone())
            .in_region(ctx.region)
            .without_cost();

        let spot = first_block(ctx.values, "instance_market_options")
            .and_then(|options| str_value(options, "market_type"))
            == Some("spot");
        let own = map_attributes(LAUNCH_TEMPLATE_MAPPINGS, ctx.values);
        let placement = first_block(ctx.values, "placement")
            .map(|p| map_attributes(PLACEMENT_MAPPINGS, p))
            .unwrap_or_default();
        let overrides = merge(&[own.as_slice(), placement.as_slice()]);

        template.add_price_component(instance_hours(
            ctx.region,
            &overrides,
            if spot { SPOT } else { ON_DEMAND },
        ));

        for device in template_block_devices(ctx.address, ctx.region, ctx.values) {
            template.add_sub_resource(device);
        }
        template
    }
}
