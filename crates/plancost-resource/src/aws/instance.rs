//! EC2 instances.

use serde_json::Value;

use crate::aws::ebs::instance_block_devices;
use crate::filter::{Filter, PriceFilter, ProductFilter, ValueMapping, map_attributes, merge};
use crate::price_component::{PriceComponent, TimeUnit};
use crate::registry::{BuildContext, ResourceKind};
use crate::resource::Resource;

/// Purchase option for on-demand capacity.
pub const ON_DEMAND: &str = "on_demand";

/// Purchase option for spot capacity.
pub const SPOT: &str = "spot";

pub(crate) const INSTANCE_MAPPINGS: &[ValueMapping] = &[
    ValueMapping::new("instance_type", "instanceType"),
    ValueMapping::with_transform("tenancy", "tenancy", tenancy),
];

/// Catalog tenancy for a plan tenancy value.
///
/// `default` maps to nothing so the shared-tenancy default applies.
pub(crate) fn tenancy(value: &Value) -> String {
    match value.as_str() {
        Some("dedicated") => "Dedicated".to_string(),
        Some("host") => "Host".to_string(),
        _ => String::new(),
    }
}

fn default_filters() -> [Filter; 4] {
    [
        Filter::equals("operatingSystem", "Linux"),
        Filter::equals("preInstalledSw", "NA"),
        Filter::equals("capacitystatus", "Used"),
        Filter::equals("tenancy", "Shared"),
    ]
}

/// "Instance hours (<type>)" for a set of attribute overrides.
pub(crate) fn instance_hours(region: &str, overrides: &[Filter], purchase_option: &str) -> PriceComponent {
    let defaults = default_filters();
    let filters = merge(&[defaults.as_slice(), overrides]);
    let instance_type = filters
        .iter()
        .find(|f| f.key == "instanceType")
        .map_or("unknown", |f| f.value.as_str());

    PriceComponent::new(
        format!("Instance hours ({instance_type})"),
        "hours",
        TimeUnit::Hour,
        ProductFilter::aws("AmazonEC2", "Compute Instance", region).with_attributes(&filters),
        PriceFilter::default()
            .with_purchase_option(purchase_option)
            .with_unit("Hrs"),
    )
}

/// `aws_instance`
#[derive(Debug, Clone, Copy)]
pub struct Instance;

impl ResourceKind for Instance {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let mut instance =
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region);

        let overrides = map_attributes(INSTANCE_MAPPINGS, ctx.values);
        instance.add_price_component(instance_hours(ctx.region, &overrides, ON_DEMAND));

        for device in instance_block_devices(ctx.address, ctx.region, ctx.values) {
            instance.add_sub_resource(device);
        }
        instance
    }
}
