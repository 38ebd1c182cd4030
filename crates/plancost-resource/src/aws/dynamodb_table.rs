//! DynamoDB tables.

use rust_decimal::Decimal;
use tracing::warn;

use crate::attributes::{decimal_value, str_value};
use crate::filter::{Filter, PriceFilter, ProductFilter};
use crate::price_component::{PriceComponent, TimeUnit};
use crate::registry::{BuildContext, ResourceKind};
use crate::resource::Resource;

fn capacity_units(name: &str, unit: &str, group: &str, key: &'static str, region: &str) -> PriceComponent {
    PriceComponent::new(
        name,
        unit,
        TimeUnit::Hour,
        ProductFilter::aws("AmazonDynamoDB", "Provisioned IOPS", region)
            .with_attributes(&[Filter::equals("group", group)]),
        PriceFilter::on_demand(),
    )
    .with_quantity(move |values| decimal_value(values, key).unwrap_or(Decimal::ZERO))
}

/// `aws_dynamodb_table`
///
/// Only provisioned capacity is estimated; on-demand tables are kept in the
/// graph without cost.
#[derive(Debug, Clone, Copy)]
pub struct DynamoDbTable;

impl ResourceKind for DynamoDbTable {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let mut table =
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region);

        let billing_mode = str_value(ctx.values, "billing_mode").unwrap_or("PROVISIONED");
        if billing_mode != "PROVISIONED" {
            warn!(
                address = ctx.address,
                billing_mode, "only PROVISIONED billing mode is estimated"
            );
            return table.without_cost();
        }

        table.add_price_component(capacity_units(
            "Write capacity unit (WCU)",
            "WCU-hours",
            "DDB-WriteUnits",
            "write_capacity",
            ctx.region,
        ));
        table.add_price_component(capacity_units(
            "Read capacity unit (RCU)",
            "RCU-hours",
            "DDB-ReadUnits",
            "read_capacity",
            ctx.region,
        ));
        table
    }
}
