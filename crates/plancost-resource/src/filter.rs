//! Catalog lookup filters.
//!
//! A price component selects its catalog SKU with a [`ProductFilter`] and one
//! of the SKU's price dimensions with a [`PriceFilter`]. Product attribute
//! constraints are assembled from [`Filter`] sets, which can be merged so that
//! a resource type's defaults are overridden by values mapped from the
//! resource's own attributes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::{Attributes, to_filter_value};

/// How a filter value is matched against a catalog attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperation {
    /// Exact string match
    Equals,
    /// Regular expression, written `/pattern/` or `/pattern/i`
    Regex,
}

/// A single attribute constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub value: String,
    pub operation: FilterOperation,
}

impl Filter {
    /// Exact match filter.
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            operation: FilterOperation::Equals,
        }
    }

    /// Regex filter. `pattern` uses the catalog's `/pattern/flags` notation.
    pub fn regex(key: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: pattern.into(),
            operation: FilterOperation::Regex,
        }
    }
}

/// Collapse ordered filter sets into one, keyed by filter key.
///
/// A later set's entry replaces an earlier entry with the same key in place,
/// so the result keeps the position where each key first appeared.
pub fn merge(sets: &[&[Filter]]) -> Vec<Filter> {
    let mut merged: Vec<Filter> = Vec::new();
    for filter in sets.iter().flat_map(|set| set.iter()) {
        match merged.iter_mut().find(|f| f.key == filter.key) {
            Some(existing) => *existing = filter.clone(),
            None => merged.push(filter.clone()),
        }
    }
    merged
}

/// Transform applied to a raw attribute before it becomes a filter value.
pub type ValueTransform = fn(&Value) -> String;

/// Declarative projection of one raw attribute onto one catalog attribute.
#[derive(Debug, Clone, Copy)]
pub struct ValueMapping {
    pub from_key: &'static str,
    pub to_key: &'static str,
    pub transform: Option<ValueTransform>,
}

impl ValueMapping {
    /// Copy the attribute verbatim.
    pub const fn new(from_key: &'static str, to_key: &'static str) -> Self {
        Self {
            from_key,
            to_key,
            transform: None,
        }
    }

    /// Copy the attribute through a transform.
    pub const fn with_transform(
        from_key: &'static str,
        to_key: &'static str,
        transform: ValueTransform,
    ) -> Self {
        Self {
            from_key,
            to_key,
            transform: Some(transform),
        }
    }
}

/// Project raw attributes into equality filters.
///
/// Mappings whose source attribute is absent, or whose value renders to an
/// empty string, produce no filter.
pub fn map_attributes(mappings: &[ValueMapping], attrs: &Attributes) -> Vec<Filter> {
    mappings
        .iter()
        .filter_map(|mapping| {
            let raw = attrs.get(mapping.from_key)?;
            let value = match mapping.transform {
                Some(transform) => transform(raw),
                None => to_filter_value(raw),
            };
            (!value.is_empty()).then(|| Filter::equals(mapping.to_key, value))
        })
        .collect()
}

/// Product attribute constraint in the pricing API's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilter {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_regex: Option<String>,
}

impl From<&Filter> for AttributeFilter {
    fn from(filter: &Filter) -> Self {
        match filter.operation {
            FilterOperation::Equals => Self {
                key: filter.key.clone(),
                value: Some(filter.value.clone()),
                value_regex: None,
            },
            FilterOperation::Regex => Self {
                key: filter.key.clone(),
                value: None,
                value_regex: Some(filter.value.clone()),
            },
        }
    }
}

/// Selects catalog products. Absent fields place no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_filters: Vec<AttributeFilter>,
}

impl ProductFilter {
    /// Filter for an AWS service product family in a region.
    pub fn aws(service: &str, product_family: &str, region: &str) -> Self {
        Self {
            vendor_name: Some("aws".to_string()),
            service: Some(service.to_string()),
            product_family: Some(product_family.to_string()),
            region: Some(region.to_string()),
            ..Self::default()
        }
    }

    /// Replace the attribute filters with a merged filter set.
    pub fn with_attributes(mut self, filters: &[Filter]) -> Self {
        self.attribute_filters = filters.iter().map(AttributeFilter::from).collect();
        self
    }

    /// Pin the product to a SKU.
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }
}

/// Selects one price dimension of a product. Absent fields place no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_purchase_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_offering_class: Option<String>,
}

impl PriceFilter {
    /// On-demand prices.
    pub fn on_demand() -> Self {
        Self::default().with_purchase_option("on_demand")
    }

    pub fn with_purchase_option(mut self, purchase_option: impl Into<String>) -> Self {
        self.purchase_option = Some(purchase_option.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_description_regex(mut self, pattern: impl Into<String>) -> Self {
        self.description_regex = Some(pattern.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(filters: &[Filter]) -> Vec<&str> {
        filters.iter().map(|f| f.key.as_str()).collect()
    }

    #[test]
    fn test_merge_later_set_wins() {
        let defaults = vec![
            Filter::equals("operatingSystem", "Linux"),
            Filter::equals("tenancy", "Shared"),
        ];
        let overrides = vec![
            Filter::equals("tenancy", "Dedicated"),
            Filter::equals("instanceType", "m5.large"),
        ];

        let merged = merge(&[defaults.as_slice(), overrides.as_slice()]);

        assert_eq!(keys(&merged), vec!["operatingSystem", "tenancy", "instanceType"]);
        assert_eq!(merged[1].value, "Dedicated");
    }

    #[test]
    fn test_merge_keeps_every_key_once() {
        let a = vec![Filter::equals("a", "1"), Filter::equals("b", "1")];
        let b = vec![Filter::equals("b", "2"), Filter::equals("c", "2")];
        let c = vec![Filter::regex("a", "/3/")];

        let merged = merge(&[a.as_slice(), b.as_slice(), c.as_slice()]);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], Filter::regex("a", "/3/"));
        assert_eq!(merged[1].value, "2");
        assert_eq!(merged[2].value, "2");
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge(&[]).is_empty());
    }

    #[test]
    fn test_map_attributes_drops_empty() {
        fn upper(v: &Value) -> String {
            v.as_str().map(str::to_uppercase).unwrap_or_default()
        }
        let attrs = json!({"instance_type": "t3.micro", "tenancy": "", "count": 3})
            .as_object()
            .cloned()
            .unwrap();
        let mappings = [
            ValueMapping::new("instance_type", "instanceType"),
            ValueMapping::new("tenancy", "tenancy"),
            ValueMapping::new("missing", "missing"),
            ValueMapping::new("count", "count"),
            ValueMapping::with_transform("count", "shout", upper),
        ];

        let filters = map_attributes(&mappings, &attrs);

        assert_eq!(
            filters,
            vec![
                Filter::equals("instanceType", "t3.micro"),
                Filter::equals("count", "3"),
            ]
        );
    }

    #[test]
    fn test_product_filter_wire_shape() {
        let filter = ProductFilter::aws("AmazonEC2", "Storage", "us-east-1").with_attributes(&[
            Filter::equals("volumeApiName", "gp2"),
            Filter::regex("usagetype", "/EBS:VolumeUsage/"),
        ]);

        let value = serde_json::to_value(&filter).unwrap();

        assert_eq!(
            value,
            json!({
                "vendorName": "aws",
                "service": "AmazonEC2",
                "productFamily": "Storage",
                "region": "us-east-1",
                "attributeFilters": [
                    {"key": "volumeApiName", "value": "gp2"},
                    {"key": "usagetype", "value_regex": "/EBS:VolumeUsage/"}
                ]
            })
        );
    }

    #[test]
    fn test_price_filter_omits_absent_fields() {
        let value = serde_json::to_value(PriceFilter::on_demand().with_unit("Hrs")).unwrap();
        assert_eq!(value, json!({"purchaseOption": "on_demand", "unit": "Hrs"}));
    }
}
