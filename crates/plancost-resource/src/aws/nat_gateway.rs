//! NAT gateways.

use crate::filter::{Filter, PriceFilter, ProductFilter};
use crate::price_component::{PriceComponent, TimeUnit};
use crate::registry::{BuildContext, ResourceKind};
use crate::resource::Resource;

/// `aws_nat_gateway`
#[derive(Debug, Clone, Copy)]
pub struct NatGateway;

impl ResourceKind for NatGateway {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let mut gateway =
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region);
        gateway.add_price_component(PriceComponent::new(
            "Per NAT gateway",
            "hours",
            TimeUnit::Hour,
            ProductFilter::aws("AmazonEC2", "NAT Gateway", ctx.region)
                .with_attributes(&[Filter::regex("usagetype", "/NatGateway-Hours/")]),
            PriceFilter::on_demand(),
        ));
        gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use rust_decimal_macros::dec;

    #[test]
    fn test_nat_gateway_hours() {
        let values = Attributes::new();
        let gateway = NatGateway.build(&BuildContext {
            address: "aws_nat_gateway.main",
            resource_type: "aws_nat_gateway",
            values: &values,
            region: "us-west-2",
        });

        let hours = &gateway.price_components()[0];
        assert_eq!(hours.name(), "Per NAT gateway");
        assert_eq!(hours.quantity(&gateway).unwrap(), dec!(730));
        assert_eq!(
            hours.product_filter().attribute_filters[0].value_regex.as_deref(),
            Some("/NatGateway-Hours/")
        );
    }
}
