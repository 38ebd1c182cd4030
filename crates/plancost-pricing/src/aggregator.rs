//! Price selection and cost breakdown assembly.
//!
//! Response slots are applied to their components first-wins: the first
//! product that has prices, and its first price. Missing matches price the
//! component at zero. Both outcomes are logged, never raised.

use plancost_core::log_price_warning;
use plancost_resource::{Resource, ResolvedPrice};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{PricingError, Result};
use crate::query::{QueryKey, QueryResult};

/// Cost of one price component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCost {
    pub component_name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub hourly_cost: Decimal,
    pub monthly_cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_hash: Option<String>,
}

/// Cost tree of one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub resource_address: String,
    pub component_costs: Vec<ComponentCost>,
    pub sub_resources: Vec<CostBreakdown>,
}

impl CostBreakdown {
    /// Hourly cost including all sub-resources.
    pub fn total_hourly_cost(&self) -> Decimal {
        self.component_costs
            .iter()
            .map(|c| c.hourly_cost)
            .chain(self.sub_resources.iter().map(CostBreakdown::total_hourly_cost))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Monthly cost including all sub-resources.
    pub fn total_monthly_cost(&self) -> Decimal {
        self.component_costs
            .iter()
            .map(|c| c.monthly_cost)
            .chain(self.sub_resources.iter().map(CostBreakdown::total_monthly_cost))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Find a component cost on this node by name.
    pub fn component(&self, name: &str) -> Option<&ComponentCost> {
        self.component_costs.iter().find(|c| c.component_name == name)
    }
}

/// Pick the price for one response slot.
pub fn select_price(key: &QueryKey, result: &Value) -> Result<ResolvedPrice> {
    let products = result
        .pointer("/data/products")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if products.is_empty() {
        log_price_warning!(&key.address, &key.component, matches = 0, "no products found, using 0.00");
        return Ok(unpriced());
    }

    let with_prices: Vec<&Vec<Value>> = products
        .iter()
        .filter_map(|product| product.get("prices").and_then(Value::as_array))
        .filter(|prices| !prices.is_empty())
        .collect();

    let Some(prices) = with_prices.first() else {
        log_price_warning!(&key.address, &key.component, matches = 0, "no prices found, using 0.00");
        return Ok(unpriced());
    };
    if with_prices.len() > 1 {
        log_price_warning!(
            &key.address,
            &key.component,
            matches = with_prices.len(),
            "multiple products found, using the first"
        );
    }
    if prices.len() > 1 {
        log_price_warning!(
            &key.address,
            &key.component,
            matches = prices.len(),
            "multiple prices found, using the first"
        );
    }

    let price = &prices[0];
    Ok(ResolvedPrice {
        price: parse_usd(key, price.get("USD"))?,
        price_hash: price
            .get("priceHash")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn unpriced() -> ResolvedPrice {
    ResolvedPrice {
        price: Decimal::ZERO,
        price_hash: String::new(),
    }
}

fn parse_usd(key: &QueryKey, value: Option<&Value>) -> Result<Decimal> {
    let invalid = |value: String| PricingError::InvalidPrice {
        address: key.address.clone(),
        component: key.component.clone(),
        value,
    };
    match value {
        Some(Value::String(text)) => text.trim().parse().map_err(|_| invalid(text.clone())),
        Some(Value::Number(number)) => {
            let text = number.to_string();
            text.parse()
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|_| invalid(text))
        }
        Some(other) => Err(invalid(other.to_string())),
        None => Err(invalid("null".to_string())),
    }
}

/// Resolve every component named by `results` inside `resource`.
pub fn apply_prices(resource: &mut Resource, results: &[QueryResult]) -> Result<()> {
    for QueryResult { key, result } in results {
        let selected = select_price(key, result)?;
        debug!(
            address = %key.address,
            component = %key.component,
            price = %selected.price,
            "component priced"
        );
        resource.resolve_component_price(&key.address, &key.component, selected.price, selected.price_hash)?;
    }
    Ok(())
}

/// Build the cost tree of a resource.
///
/// Resources without cost yield `None` and are left out of their parent's
/// tree, together with their sub-resources. Skipped components are left out
/// too. Components and sub-resources keep the resource's name and address
/// ordering. Fails when a component's quantity or cost overflows.
pub fn breakdown(resource: &Resource) -> Result<Option<CostBreakdown>> {
    if !resource.has_cost() {
        return Ok(None);
    }

    let mut component_costs = Vec::new();
    for component in resource.price_components() {
        if component.should_skip(resource) {
            continue;
        }
        let resolved = component.price();
        component_costs.push(ComponentCost {
            component_name: component.name().to_string(),
            unit: component.unit().to_string(),
            quantity: component.quantity(resource)?,
            price: resolved.map_or(Decimal::ZERO, |p| p.price),
            hourly_cost: component.hourly_cost(resource)?,
            monthly_cost: component.monthly_cost(resource)?,
            price_hash: resolved
                .map(|p| p.price_hash.clone())
                .filter(|hash| !hash.is_empty()),
        });
    }

    let mut sub_resources = Vec::new();
    for sub in resource.sub_resources() {
        if let Some(tree) = breakdown(sub)? {
            sub_resources.push(tree);
        }
    }

    Ok(Some(CostBreakdown {
        resource_address: resource.address().to_string(),
        component_costs,
        sub_resources,
    }))
}

/// Order top-level breakdowns by address.
pub fn sort_breakdowns(breakdowns: &mut [CostBreakdown]) {
    breakdowns.sort_by(|a, b| a.resource_address.cmp(&b.resource_address));
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancost_resource::{Attributes, PriceComponent, PriceFilter, ProductFilter, TimeUnit};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn key() -> QueryKey {
        QueryKey::new("aws_instance.web", "Instance hours")
    }

    fn hours(name: &str) -> PriceComponent {
        PriceComponent::new(
            name,
            "hours",
            TimeUnit::Hour,
            ProductFilter::aws("AmazonEC2", "Compute Instance", "us-east-1"),
            PriceFilter::on_demand(),
        )
    }

    #[test]
    fn test_no_products_is_zero() {
        let selected = select_price(&key(), &json!({"data": {"products": []}})).unwrap();
        assert_eq!(selected.price, Decimal::ZERO);
        assert!(selected.price_hash.is_empty());

        let malformed = select_price(&key(), &json!({"errors": ["boom"]})).unwrap();
        assert_eq!(malformed.price, Decimal::ZERO);
    }

    #[test]
    fn test_first_product_with_prices_wins() {
        let result = json!({"data": {"products": [
            {"prices": []},
            {"prices": [{"priceHash": "h1", "USD": "0.0416"}, {"priceHash": "h2", "USD": "9"}]},
            {"prices": [{"priceHash": "h3", "USD": "1"}]}
        ]}});

        let selected = select_price(&key(), &result).unwrap();
        assert_eq!(selected.price, dec!(0.0416));
        assert_eq!(selected.price_hash, "h1");
    }

    #[test]
    fn test_products_without_prices_is_zero() {
        let result = json!({"data": {"products": [{"prices": []}]}});
        assert_eq!(select_price(&key(), &result).unwrap().price, Decimal::ZERO);
    }

    #[test]
    fn test_numeric_and_invalid_usd() {
        let numeric = json!({"data": {"products": [{"prices": [{"priceHash": "n", "USD": 0.25}]}]}});
        assert_eq!(select_price(&key(), &numeric).unwrap().price, dec!(0.25));

        let invalid = json!({"data": {"products": [{"prices": [{"priceHash": "x", "USD": "n/a"}]}]}});
        assert!(matches!(
            select_price(&key(), &invalid),
            Err(PricingError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_breakdown_excludes_skipped_and_costless() {
        let mut web = Resource::new("aws_instance.web", "aws_instance", Attributes::new());
        web.add_price_component(hours("Instance hours"));
        web.add_price_component(hours("Dedicated host").with_skip(|_| true));

        let mut disk = Resource::new("aws_instance.web.root_block_device", "disk", Attributes::new());
        disk.add_price_component(hours("GB"));
        web.add_sub_resource(disk);
        web.add_sub_resource(Resource::new("aws_instance.web.shadow", "shadow", Attributes::new()).without_cost());

        let results = vec![
            QueryResult {
                key: key(),
                result: json!({"data": {"products": [{"prices": [{"priceHash": "abc", "USD": "0.4"}]}]}}),
            },
            QueryResult {
                key: QueryKey::new("aws_instance.web.root_block_device", "GB"),
                result: json!({"data": {"products": []}}),
            },
        ];
        apply_prices(&mut web, &results).unwrap();

        let tree = breakdown(&web).unwrap().unwrap();
        assert_eq!(tree.component_costs.len(), 1);
        let instance = tree.component("Instance hours").unwrap();
        assert_eq!(instance.hourly_cost, dec!(0.4));
        assert_eq!(instance.monthly_cost, dec!(292));
        assert_eq!(instance.price_hash.as_deref(), Some("abc"));

        assert_eq!(tree.sub_resources.len(), 1);
        let gb = tree.sub_resources[0].component("GB").unwrap();
        assert_eq!(gb.hourly_cost, Decimal::ZERO);
        assert_eq!(gb.price_hash, None);
        assert_eq!(tree.total_monthly_cost(), dec!(292));
    }

    #[test]
    fn test_breakdown_and_batch_agree_on_costless_subtrees() {
        let mut leaf = Resource::new("aws_x.r.mid.leaf", "leaf", Attributes::new());
        leaf.add_price_component(hours("GB"));
        let mut mid = Resource::new("aws_x.r.mid", "mid", Attributes::new()).without_cost();
        mid.add_sub_resource(leaf);
        let mut root = Resource::new("aws_x.r", "aws_x", Attributes::new());
        root.add_price_component(hours("Hours"));
        root.add_sub_resource(mid);

        let batch = crate::query::batch(&root);
        let tree = breakdown(&root).unwrap().unwrap();

        let mut priced = Vec::new();
        let mut stack = vec![&tree];
        while let Some(node) = stack.pop() {
            for cost in &node.component_costs {
                priced.push(QueryKey::new(&node.resource_address, &cost.component_name));
            }
            stack.extend(&node.sub_resources);
        }
        assert_eq!(priced, batch.keys);
        assert!(tree.sub_resources.is_empty());
    }

    #[test]
    fn test_overflowing_component_fails_breakdown() {
        let mut web = Resource::new("aws_instance.web", "aws_instance", Attributes::new());
        web.add_price_component(hours("Instance hours").with_fixed_quantity(Decimal::MAX));

        assert!(matches!(
            breakdown(&web),
            Err(PricingError::Resource(plancost_resource::ResourceError::CostOverflow { .. }))
        ));
    }

    #[test]
    fn test_price_applied_once() {
        let mut web = Resource::new("aws_instance.web", "aws_instance", Attributes::new());
        web.add_price_component(hours("Instance hours"));
        let results = vec![QueryResult {
            key: key(),
            result: json!({"data": {"products": [{"prices": [{"priceHash": "a", "USD": "1"}]}]}}),
        }];

        apply_prices(&mut web, &results).unwrap();
        assert!(matches!(
            apply_prices(&mut web, &results),
            Err(PricingError::Resource(_))
        ));
    }

    #[test]
    fn test_breakdown_serializes_camel_case() {
        let mut web = Resource::new("aws_nat_gateway.gw", "aws_nat_gateway", Attributes::new());
        web.add_price_component(hours("Per NAT gateway"));

        let value = serde_json::to_value(breakdown(&web).unwrap().unwrap()).unwrap();
        assert_eq!(value["resourceAddress"], "aws_nat_gateway.gw");
        assert_eq!(value["componentCosts"][0]["componentName"], "Per NAT gateway");
        assert!(value["componentCosts"][0].get("priceHash").is_none());
    }
}
