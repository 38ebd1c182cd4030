//! Classic, application and network load balancers.

use crate::attributes::str_value;
use crate::filter::{Filter, PriceFilter, ProductFilter};
use crate::price_component::{PriceComponent, TimeUnit};
use crate::registry::{BuildContext, ResourceKind};
use crate::resource::Resource;

/// `aws_elb` (classic) and `aws_lb` / `aws_alb`
#[derive(Debug, Clone, Copy)]
pub struct LoadBalancer {
    classic: bool,
}

impl LoadBalancer {
    pub const fn classic() -> Self {
        Self { classic: true }
    }

    pub const fn elbv2() -> Self {
        Self { classic: false }
    }

    fn family(&self, ctx: &BuildContext<'_>) -> (&'static str, &'static str) {
        if self.classic {
            return ("Per Classic Load Balancer", "Load Balancer");
        }
        match str_value(ctx.values, "load_balancer_type") {
            Some("network") => ("Per Network Load Balancer", "Load Balancer-Network"),
            Some("gateway") => ("Per Gateway Load Balancer", "Load Balancer-Gateway"),
            _ => ("Per Application Load Balancer", "Load Balancer-Application"),
        }
    }
}

impl ResourceKind for LoadBalancer {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let (name, product_family) = self.family(ctx);
        let mut lb =
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region);
        lb.add_price_component(PriceComponent::new(
            name,
            "hours",
            TimeUnit::Hour,
            ProductFilter::aws("AWSELB", product_family, ctx.region)
                .with_attributes(&[Filter::regex("usagetype", "/LoadBalancerUsage/")]),
            PriceFilter::on_demand(),
        ));
        lb
    }
}
