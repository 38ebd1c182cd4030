//! Priced line items attached to resources.
//!
//! A [`PriceComponent`] names one billable dimension of a resource. Its
//! filters are fixed when it is built; its price is resolved exactly once,
//! after the catalog lookup for the owning top-level resource returns.

use std::fmt;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::error::{ResourceError, Result};
use crate::filter::{PriceFilter, ProductFilter};
use crate::resource::Resource;

/// Seconds in an hour.
pub const HOUR_SECONDS: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);

/// Seconds in the fixed 730-hour month.
pub const MONTH_SECONDS: Decimal = Decimal::from_parts(3600 * 730, 0, 0, false, 0);

/// Hours in the fixed month used for monthly figures.
pub const HOURS_IN_MONTH: Decimal = Decimal::from_parts(730, 0, 0, false, 0);

/// Decimal places kept for quantities and monthly costs.
pub const COST_DECIMAL_PLACES: u32 = 6;

/// Round to [`COST_DECIMAL_PLACES`], half away from zero.
pub fn round_cost(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(COST_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Time unit a catalog price is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Hour,
    Month,
}

impl TimeUnit {
    pub fn seconds(self) -> Decimal {
        match self {
            TimeUnit::Hour => HOUR_SECONDS,
            TimeUnit::Month => MONTH_SECONDS,
        }
    }

    /// How many of this unit fit in a month.
    pub fn per_month(self) -> Decimal {
        MONTH_SECONDS / self.seconds()
    }
}

/// Quantity rule over the owning resource's attributes.
pub type QuantityFn = dyn Fn(&Attributes) -> Decimal + Send + Sync;

/// Skip predicate over the owning resource's attributes.
pub type SkipFn = dyn Fn(&Attributes) -> bool + Send + Sync;

/// Price chosen from the catalog for a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub price: Decimal,
    pub price_hash: String,
}

/// One billable dimension of a resource.
#[derive(Clone)]
pub struct PriceComponent {
    name: String,
    unit: String,
    time_unit: TimeUnit,
    product_filter: ProductFilter,
    price_filter: PriceFilter,
    quantity_rule: Option<Arc<QuantityFn>>,
    skip_rule: Option<Arc<SkipFn>>,
    price: Option<ResolvedPrice>,
}

impl PriceComponent {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        time_unit: TimeUnit,
        product_filter: ProductFilter,
        price_filter: PriceFilter,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            time_unit,
            product_filter,
            price_filter,
            quantity_rule: None,
            skip_rule: None,
            price: None,
        }
    }

    /// Set the custom quantity rule.
    pub fn with_quantity<F>(mut self, rule: F) -> Self
    where
        F: Fn(&Attributes) -> Decimal + Send + Sync + 'static,
    {
        self.quantity_rule = Some(Arc::new(rule));
        self
    }

    /// Set a fixed custom quantity.
    pub fn with_fixed_quantity(self, quantity: Decimal) -> Self {
        self.with_quantity(move |_| quantity)
    }

    /// Set the skip predicate.
    pub fn with_skip<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Attributes) -> bool + Send + Sync + 'static,
    {
        self.skip_rule = Some(Arc::new(predicate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn product_filter(&self) -> &ProductFilter {
        &self.product_filter
    }

    pub fn price_filter(&self) -> &PriceFilter {
        &self.price_filter
    }

    /// Resolved price, if the component has been priced.
    pub fn price(&self) -> Option<&ResolvedPrice> {
        self.price.as_ref()
    }

    pub fn is_priced(&self) -> bool {
        self.price.is_some()
    }

    /// Record the catalog price. A component is priced at most once.
    pub fn resolve_price(&mut self, price: Decimal, price_hash: impl Into<String>) -> Result<()> {
        if self.price.is_some() {
            return Err(ResourceError::PriceAlreadyResolved {
                component: self.name.clone(),
            });
        }
        self.price = Some(ResolvedPrice {
            price,
            price_hash: price_hash.into(),
        });
        Ok(())
    }

    /// Whether the component is excluded from pricing for this owner.
    pub fn should_skip(&self, owner: &Resource) -> bool {
        self.skip_rule
            .as_ref()
            .is_some_and(|skip| skip(owner.raw_values()))
    }

    /// Monthly quantity: custom rule, scaled to the component's time unit
    /// and multiplied by the owner's replica count.
    pub fn quantity(&self, owner: &Resource) -> Result<Decimal> {
        self.quantity_for(owner.raw_values(), owner.resource_count())
            .ok_or_else(|| self.overflow(owner))
    }

    fn quantity_for(&self, attrs: &Attributes, resource_count: u32) -> Option<Decimal> {
        let custom = self
            .quantity_rule
            .as_ref()
            .map_or(Decimal::ONE, |rule| rule(attrs));
        let quantity = custom
            .checked_mul(self.time_unit.per_month())?
            .checked_mul(Decimal::from(resource_count))?;
        Some(round_cost(quantity))
    }

    /// Hourly cost at the resolved price (zero while unpriced).
    pub fn hourly_cost(&self, owner: &Resource) -> Result<Decimal> {
        let price = self.price.as_ref().map_or(Decimal::ZERO, |p| p.price);
        price
            .checked_mul(self.quantity(owner)?)
            .and_then(|total| total.checked_div(HOURS_IN_MONTH))
            .ok_or_else(|| self.overflow(owner))
    }

    /// Monthly cost at the resolved price.
    pub fn monthly_cost(&self, owner: &Resource) -> Result<Decimal> {
        self.hourly_cost(owner)?
            .checked_mul(HOURS_IN_MONTH)
            .map(round_cost)
            .ok_or_else(|| self.overflow(owner))
    }

    fn overflow(&self, owner: &Resource) -> ResourceError {
        ResourceError::CostOverflow {
            address: owner.address().to_string(),
            component: self.name.clone(),
        }
    }

    /// Copy this component for a different owner, freezing the quantity and
    /// skip rules against `source`'s attributes.
    ///
    /// The copy is unpriced. Its quantity still scales with the new owner's
    /// replica count.
    pub fn detached_from(&self, source: &Resource) -> Self {
        let custom = self
            .quantity_rule
            .as_ref()
            .map_or(Decimal::ONE, |rule| rule(source.raw_values()));
        let skip = self.should_skip(source);

        let mut copy = self.clone().with_fixed_quantity(custom);
        copy.skip_rule = skip.then(|| Arc::new(|_: &Attributes| true) as Arc<SkipFn>);
        copy.price = None;
        copy
    }
}

impl fmt::Debug for PriceComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceComponent")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("time_unit", &self.time_unit)
            .field("product_filter", &self.product_filter)
            .field("price_filter", &self.price_filter)
            .field("has_quantity_rule", &self.quantity_rule.is_some())
            .field("has_skip_rule", &self.skip_rule.is_some())
            .field("price", &self.price)
            .finish()
    }
}
