//! EBS volumes, block devices and snapshots.

use rust_decimal::Decimal;

use crate::address::{child, indexed_child};
use crate::attributes::{Attributes, blocks, decimal_value, first_block, str_value};
use crate::filter::{Filter, PriceFilter, ProductFilter};
use crate::price_component::{PriceComponent, TimeUnit};
use crate::registry::{BuildContext, ResourceKind};
use crate::resource::Resource;

/// Size assumed for a volume that does not declare one, in GB.
pub const DEFAULT_VOLUME_SIZE: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

const DEFAULT_VOLUME_TYPE: &str = "gp2";

/// Attribute names for a volume's type and size.
#[derive(Debug, Clone, Copy)]
struct VolumeKeys {
    volume_type: &'static str,
    size: &'static str,
}

const VOLUME_KEYS: VolumeKeys = VolumeKeys {
    volume_type: "type",
    size: "size",
};

const BLOCK_DEVICE_KEYS: VolumeKeys = VolumeKeys {
    volume_type: "volume_type",
    size: "volume_size",
};

fn volume_type(attrs: &Attributes, keys: VolumeKeys) -> &str {
    str_value(attrs, keys.volume_type).unwrap_or(DEFAULT_VOLUME_TYPE)
}

fn storage_components(region: &str, attrs: &Attributes, keys: VolumeKeys) -> [PriceComponent; 2] {
    let volume_api_name = volume_type(attrs, keys);

    let gb = PriceComponent::new(
        "GB",
        "GB-months",
        TimeUnit::Month,
        ProductFilter::aws("AmazonEC2", "Storage", region)
            .with_attributes(&[Filter::equals("volumeApiName", volume_api_name)]),
        PriceFilter::on_demand(),
    )
    .with_quantity(move |attrs| decimal_value(attrs, keys.size).unwrap_or(DEFAULT_VOLUME_SIZE));

    let iops = PriceComponent::new(
        "IOPS",
        "IOPS-months",
        TimeUnit::Month,
        ProductFilter::aws("AmazonEC2", "System Operation", region).with_attributes(&[
            Filter::equals("volumeApiName", volume_api_name),
            Filter::regex("usagetype", "/EBS:VolumeP-IOPS.piops/"),
        ]),
        PriceFilter::on_demand(),
    )
    .with_quantity(|attrs| decimal_value(attrs, "iops").unwrap_or(Decimal::ZERO))
    .with_skip(move |attrs| volume_type(attrs, keys) != "io1");

    [gb, iops]
}

/// A block device attached to an instance or declared in a template.
pub fn block_device(address: String, region: &str, values: Attributes) -> Resource {
    let mut device = Resource::new(address, "aws_ebs_block_device", values).in_region(region);
    for component in storage_components(region, device.raw_values(), BLOCK_DEVICE_KEYS) {
        device.add_price_component(component);
    }
    device
}

/// `root_block_device` and `ebs_block_device[i]` sub-resources.
///
/// An absent root block device is priced with default values.
pub(crate) fn instance_block_devices(parent: &str, region: &str, values: &Attributes) -> Vec<Resource> {
    let root = first_block(values, "root_block_device").cloned().unwrap_or_default();
    let mut devices = vec![block_device(child(parent, "root_block_device"), region, root)];

    devices.extend(
        blocks(values, "ebs_block_device")
            .into_iter()
            .enumerate()
            .map(|(i, device)| {
                block_device(
                    indexed_child(parent, "ebs_block_device", i),
                    region,
                    device.clone(),
                )
            }),
    );
    devices
}

/// `block_device_mapping[i]` sub-resources of a launch template, one per
/// mapping with an `ebs` block.
pub(crate) fn template_block_devices(parent: &str, region: &str, values: &Attributes) -> Vec<Resource> {
    blocks(values, "block_device_mappings")
        .into_iter()
        .enumerate()
        .filter_map(|(i, mapping)| {
            let ebs = first_block(mapping, "ebs")?;
            Some(block_device(
                indexed_child(parent, "block_device_mapping", i),
                region,
                ebs.clone(),
            ))
        })
        .collect()
}

/// `aws_ebs_volume`
#[derive(Debug, Clone, Copy)]
pub struct EbsVolume;

impl ResourceKind for EbsVolume {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let mut volume =
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region);
        for component in storage_components(ctx.region, ctx.values, VOLUME_KEYS) {
            volume.add_price_component(component);
        }
        volume
    }
}

/// `aws_ebs_snapshot` and `aws_ebs_snapshot_copy`
#[derive(Debug, Clone, Copy)]
pub struct EbsSnapshot;

impl ResourceKind for EbsSnapshot {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let mut snapshot =
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region);
        snapshot.add_price_component(
            PriceComponent::new(
                "GB",
                "GB-months",
                TimeUnit::Month,
                ProductFilter::aws("AmazonEC2", "Storage Snapshot", ctx.region)
                    .with_attributes(&[Filter::regex("usagetype", "/EBS:SnapshotUsage$/")]),
                PriceFilter::on_demand(),
            )
            .with_quantity(|attrs| {
                decimal_value(attrs, "volume_size").unwrap_or(DEFAULT_VOLUME_SIZE)
            }),
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::AttributeFilter;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn build(kind: &dyn ResourceKind, resource_type: &str, values: serde_json::Value) -> Resource {
        let values = values.as_object().cloned().unwrap_or_default();
        kind.build(&BuildContext {
            address: "r.test",
            resource_type,
            values: &values,
            region: "us-east-1",
        })
    }

    fn component<'a>(resource: &'a Resource, name: &str) -> &'a PriceComponent {
        resource
            .price_components()
            .iter()
            .find(|c| c.name() == name)
            .unwrap()
    }

    #[test]
    fn test_volume_defaults() {
        let volume = build(&EbsVolume, "aws_ebs_volume", json!({}));
        let gb = component(&volume, "GB");

        assert_eq!(gb.quantity(&volume).unwrap(), dec!(8));
        assert_eq!(
            gb.product_filter().attribute_filters,
            vec![AttributeFilter::from(&Filter::equals("volumeApiName", "gp2"))]
        );
        assert!(component(&volume, "IOPS").should_skip(&volume));
    }

    #[test]
    fn test_io1_volume_prices_iops() {
        let volume = build(
            &EbsVolume,
            "aws_ebs_volume",
            json!({"type": "io1", "size": 100, "iops": 1000}),
        );
        let iops = component(&volume, "IOPS");

        assert!(!iops.should_skip(&volume));
        assert_eq!(iops.quantity(&volume).unwrap(), dec!(1000));
        assert_eq!(component(&volume, "GB").quantity(&volume).unwrap(), dec!(100));
    }

    #[test]
    fn test_instance_block_devices() {
        let values = json!({
            "ebs_block_device": [
                {"volume_size": 20, "volume_type": "st1"},
                {"volume_size": 30}
            ]
        });
        let devices =
            instance_block_devices("aws_instance.web", "us-east-1", values.as_object().unwrap());

        let addresses: Vec<&str> = devices.iter().map(Resource::address).collect();
        assert_eq!(
            addresses,
            vec![
                "aws_instance.web.root_block_device",
                "aws_instance.web.ebs_block_device[0]",
                "aws_instance.web.ebs_block_device[1]",
            ]
        );
        assert_eq!(component(&devices[0], "GB").quantity(&devices[0]).unwrap(), dec!(8));
        assert_eq!(component(&devices[1], "GB").quantity(&devices[1]).unwrap(), dec!(20));
    }

    #[test]
    fn test_template_block_devices_skip_non_ebs_mappings() {
        let values = json!({
            "block_device_mappings": [
                {"device_name": "/dev/sda1", "ebs": [{"volume_size": 50, "volume_type": "io1", "iops": 500}]},
                {"device_name": "/dev/sdb", "virtual_name": "ephemeral0"}
            ]
        });
        let devices =
            template_block_devices("aws_launch_template.lt", "us-east-1", values.as_object().unwrap());

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].address(), "aws_launch_template.lt.block_device_mapping[0]");
        assert!(!component(&devices[0], "IOPS").should_skip(&devices[0]));
    }

    #[test]
    fn test_snapshot_size() {
        let snapshot = build(&EbsSnapshot, "aws_ebs_snapshot", json!({"volume_size": 40}));
        assert_eq!(component(&snapshot, "GB").quantity(&snapshot).unwrap(), dec!(40));

        let copy = build(&EbsSnapshot, "aws_ebs_snapshot_copy", json!({}));
        assert_eq!(component(&copy, "GB").quantity(&copy).unwrap(), dec!(8));
    }
}
