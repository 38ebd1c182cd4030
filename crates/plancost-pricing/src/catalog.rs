//! In-memory pricing catalog.
//!
//! [`StaticCatalog`] answers price queries from a list of product records
//! loaded from JSON or YAML, with the same response shape as the pricing
//! API. It backs offline runs and end-to-end tests.
//!
//! Regex filter values are written `/pattern/` or `/pattern/i`.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use plancost_resource::{AttributeFilter, PriceFilter, ProductFilter};
use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{PricingError, Result};
use crate::query::PriceQuery;
use crate::service::PricingService;

/// One price dimension of a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPrice {
    #[serde(default)]
    pub purchase_option: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub term_length: Option<String>,
    #[serde(default)]
    pub term_purchase_option: Option<String>,
    #[serde(default)]
    pub term_offering_class: Option<String>,
    #[serde(rename = "USD")]
    pub usd: Decimal,
    pub price_hash: String,
}

/// A catalog product with its prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub product_family: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub prices: Vec<CatalogPrice>,
}

/// Pricing service backed by a fixed product list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<CatalogProduct>,
}

impl StaticCatalog {
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let products = serde_json::from_str(json)
            .map_err(|e| PricingError::CatalogInvalid(e.to_string()))?;
        Ok(Self::new(products))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let products = serde_yaml::from_str(yaml)
            .map_err(|e| PricingError::CatalogInvalid(e.to_string()))?;
        Ok(Self::new(products))
    }

    /// Load a catalog file. `.yaml`/`.yml` files are read as YAML, anything
    /// else as JSON.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PricingError::CatalogRead {
                path: path.to_path_buf(),
                source,
            })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let catalog = if is_yaml {
            Self::from_yaml(&contents)?
        } else {
            Self::from_json(&contents)?
        };

        debug!(path = %path.display(), products = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Answer one query in the pricing API's response shape.
    pub fn lookup(&self, query: &PriceQuery) -> Result<Value> {
        let matcher = QueryMatcher::new(query)?;
        let products: Vec<Value> = self
            .products
            .iter()
            .filter(|product| matcher.product_matches(product))
            .map(|product| {
                let prices: Vec<Value> = product
                    .prices
                    .iter()
                    .filter(|price| matcher.price_matches(price))
                    .map(|price| {
                        json!({
                            "priceHash": price.price_hash,
                            "USD": price.usd.to_string(),
                        })
                    })
                    .collect();
                json!({ "prices": prices })
            })
            .collect();
        Ok(json!({ "data": { "products": products } }))
    }
}

#[async_trait]
impl PricingService for StaticCatalog {
    fn name(&self) -> &str {
        "static-catalog"
    }

    async fn query_batch(&self, queries: &[PriceQuery]) -> Result<Vec<Value>> {
        queries.iter().map(|query| self.lookup(query)).collect()
    }
}

/// A query with its regex filters compiled, reused across every product.
struct QueryMatcher<'a> {
    product_filter: &'a ProductFilter,
    price_filter: &'a PriceFilter,
    attribute_regexes: Vec<Option<Regex>>,
    description_regex: Option<Regex>,
}

impl<'a> QueryMatcher<'a> {
    fn new(query: &'a PriceQuery) -> Result<Self> {
        let attribute_regexes = query
            .product_filter
            .attribute_filters
            .iter()
            .map(|filter| filter.value_regex.as_deref().map(compile).transpose())
            .collect::<Result<_>>()?;
        let description_regex = query
            .price_filter
            .description_regex
            .as_deref()
            .map(compile)
            .transpose()?;
        Ok(Self {
            product_filter: &query.product_filter,
            price_filter: &query.price_filter,
            attribute_regexes,
            description_regex,
        })
    }

    fn product_matches(&self, product: &CatalogProduct) -> bool {
        let filter = self.product_filter;
        field_matches(filter.vendor_name.as_ref(), product.vendor_name.as_ref())
            && field_matches(filter.service.as_ref(), product.service.as_ref())
            && field_matches(filter.product_family.as_ref(), product.product_family.as_ref())
            && field_matches(filter.region.as_ref(), product.region.as_ref())
            && field_matches(filter.sku.as_ref(), product.sku.as_ref())
            && filter
                .attribute_filters
                .iter()
                .zip(&self.attribute_regexes)
                .all(|(attribute, regex)| attribute_matches(attribute, regex.as_ref(), &product.attributes))
    }

    fn price_matches(&self, price: &CatalogPrice) -> bool {
        let filter = self.price_filter;
        let fields_match = field_matches(filter.purchase_option.as_ref(), price.purchase_option.as_ref())
            && field_matches(filter.unit.as_ref(), price.unit.as_ref())
            && field_matches(filter.description.as_ref(), price.description.as_ref())
            && field_matches(filter.term_length.as_ref(), price.term_length.as_ref())
            && field_matches(filter.term_purchase_option.as_ref(), price.term_purchase_option.as_ref())
            && field_matches(filter.term_offering_class.as_ref(), price.term_offering_class.as_ref());
        if !fields_match {
            return false;
        }
        match (&self.description_regex, &price.description) {
            (Some(regex), Some(description)) => regex.is_match(description),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// Compile a `/pattern/flags` filter value. A value without slashes is used
/// as the pattern itself.
fn compile(value: &str) -> Result<Regex> {
    let (pattern, flags) = value
        .strip_prefix('/')
        .and_then(|rest| rest.rsplit_once('/'))
        .unwrap_or((value, ""));

    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .build()
        .map_err(|e| PricingError::InvalidFilter {
            pattern: value.to_string(),
            message: e.to_string(),
        })
}

fn field_matches(wanted: Option<&String>, actual: Option<&String>) -> bool {
    match wanted {
        Some(wanted) => actual == Some(wanted),
        None => true,
    }
}

fn attribute_matches(
    filter: &AttributeFilter,
    regex: Option<&Regex>,
    attributes: &BTreeMap<String, String>,
) -> bool {
    let Some(actual) = attributes.get(&filter.key) else {
        return false;
    };
    if filter.value.as_ref().is_some_and(|value| value != actual) {
        return false;
    }
    regex.is_none_or(|regex| regex.is_match(actual))
}
