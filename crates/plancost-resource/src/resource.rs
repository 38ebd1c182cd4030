//! Resource tree nodes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::attributes::Attributes;
use crate::error::{ResourceError, Result};
use crate::price_component::PriceComponent;

/// A node in the resource tree.
///
/// Sub-resources are kept ordered by address and price components by name,
/// so every traversal of the tree is deterministic. References map a name
/// (usually the attribute that declared it) to the target's address.
#[derive(Debug, Clone)]
pub struct Resource {
    address: String,
    resource_type: String,
    region: Option<String>,
    raw_values: Attributes,
    has_cost: bool,
    resource_count: u32,
    sub_resources: Vec<Resource>,
    price_components: Vec<PriceComponent>,
    references: BTreeMap<String, String>,
}

impl Resource {
    pub fn new(
        address: impl Into<String>,
        resource_type: impl Into<String>,
        raw_values: Attributes,
    ) -> Self {
        Self {
            address: address.into(),
            resource_type: resource_type.into(),
            region: None,
            raw_values,
            has_cost: true,
            resource_count: 1,
            sub_resources: Vec::new(),
            price_components: Vec::new(),
            references: BTreeMap::new(),
        }
    }

    /// Mark the resource as not contributing to cost.
    pub fn without_cost(mut self) -> Self {
        self.has_cost = false;
        self
    }

    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn raw_values(&self) -> &Attributes {
        &self.raw_values
    }

    pub fn has_cost(&self) -> bool {
        self.has_cost
    }

    pub fn resource_count(&self) -> u32 {
        self.resource_count
    }

    /// Set the replica count on this resource and every descendant.
    pub fn set_resource_count(&mut self, count: u32) {
        self.resource_count = count;
        for sub in &mut self.sub_resources {
            sub.set_resource_count(count);
        }
    }

    pub fn sub_resources(&self) -> &[Resource] {
        &self.sub_resources
    }

    pub fn add_sub_resource(&mut self, sub_resource: Resource) {
        self.sub_resources.push(sub_resource);
        self.sub_resources.sort_by(|a, b| a.address.cmp(&b.address));
    }

    /// Replace all sub-resources.
    pub fn replace_sub_resources(&mut self, sub_resources: Vec<Resource>) {
        self.sub_resources = sub_resources;
        self.sub_resources.sort_by(|a, b| a.address.cmp(&b.address));
    }

    pub fn price_components(&self) -> &[PriceComponent] {
        &self.price_components
    }

    pub fn add_price_component(&mut self, component: PriceComponent) {
        self.price_components.push(component);
        self.price_components.sort_by(|a, b| a.name().cmp(b.name()));
    }

    /// Replace all price components.
    pub fn replace_price_components(&mut self, components: Vec<PriceComponent>) {
        self.price_components = components;
        self.price_components.sort_by(|a, b| a.name().cmp(b.name()));
    }

    pub fn references(&self) -> &BTreeMap<String, String> {
        &self.references
    }

    /// Wire a named reference. A later reference with the same name wins.
    pub fn add_reference(&mut self, name: impl Into<String>, target_address: impl Into<String>) {
        self.references.insert(name.into(), target_address.into());
    }

    /// All transitive sub-resources, pre-order.
    ///
    /// Each sub-resource is listed before its own descendants, and siblings
    /// appear in address order.
    pub fn flatten_sub_resources(&self) -> Vec<&Resource> {
        let mut flat = Vec::new();
        for sub in &self.sub_resources {
            flat.push(sub);
            flat.extend(sub.flatten_sub_resources());
        }
        flat
    }

    /// Find this resource or a descendant by address.
    pub fn find(&self, address: &str) -> Option<&Resource> {
        if self.address == address {
            return Some(self);
        }
        self.sub_resources.iter().find_map(|sub| sub.find(address))
    }

    /// Find this resource or a descendant by address, mutably.
    pub fn find_mut(&mut self, address: &str) -> Option<&mut Resource> {
        if self.address == address {
            return Some(self);
        }
        self.sub_resources
            .iter_mut()
            .find_map(|sub| sub.find_mut(address))
    }

    /// Resolve the price of one component somewhere in this tree.
    pub fn resolve_component_price(
        &mut self,
        address: &str,
        component: &str,
        price: Decimal,
        price_hash: impl Into<String>,
    ) -> Result<()> {
        let unknown = || ResourceError::UnknownComponent {
            address: address.to_string(),
            component: component.to_string(),
        };
        let target = self
            .find_mut(address)
            .and_then(|r| r.price_components.iter_mut().find(|c| c.name() == component))
            .ok_or_else(unknown)?;
        target.resolve_price(price, price_hash)
    }

    /// Deep copy of this resource re-rooted at `new_address`.
    ///
    /// Descendant addresses that start with this resource's address have that
    /// prefix replaced. Prices are kept.
    pub fn readdressed(&self, new_address: &str) -> Resource {
        self.readdressed_under(&self.address, new_address)
    }

    pub(crate) fn readdressed_under(&self, old_prefix: &str, new_prefix: &str) -> Resource {
        let mut copy = self.clone();
        copy.address = match self.address.strip_prefix(old_prefix) {
            Some(rest) => format!("{new_prefix}{rest}"),
            None => self.address.clone(),
        };
        copy.sub_resources = self
            .sub_resources
            .iter()
            .map(|sub| sub.readdressed_under(old_prefix, new_prefix))
            .collect();
        copy
    }
}
