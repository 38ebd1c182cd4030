//! RDS database instances.

use rust_decimal::Decimal;

use crate::attributes::{Attributes, bool_value, decimal_value, str_value};
use crate::filter::{Filter, PriceFilter, ProductFilter};
use crate::price_component::{PriceComponent, TimeUnit};
use crate::registry::{BuildContext, ResourceKind};
use crate::resource::Resource;

const DEFAULT_ALLOCATED_STORAGE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
const MIN_IO1_STORAGE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
const MIN_IO1_IOPS: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

fn engine(values: &Attributes) -> String {
    str_value(values, "engine").unwrap_or_default().to_ascii_lowercase()
}

fn database_engine(engine: &str) -> Option<&'static str> {
    match engine {
        "postgres" => Some("PostgreSQL"),
        "mysql" => Some("MySQL"),
        "mariadb" => Some("MariaDB"),
        "aurora" | "aurora-mysql" => Some("Aurora MySQL"),
        "aurora-postgresql" => Some("Aurora PostgreSQL"),
        "oracle-se" | "oracle-se1" | "oracle-se2" | "oracle-ee" => Some("Oracle"),
        "sqlserver-ex" | "sqlserver-web" | "sqlserver-se" | "sqlserver-ee" => Some("SQL Server"),
        _ => None,
    }
}

fn database_edition(engine: &str) -> Option<&'static str> {
    match engine {
        "oracle-se" | "sqlserver-se" => Some("Standard"),
        "oracle-se1" => Some("Standard One"),
        "oracle-se2" => Some("Standard Two"),
        "oracle-ee" | "sqlserver-ee" => Some("Enterprise"),
        "sqlserver-ex" => Some("Express"),
        "sqlserver-web" => Some("Web"),
        _ => None,
    }
}

fn license_model(engine: &str, values: &Attributes) -> Option<&'static str> {
    let byol = str_value(values, "license_model")
        .is_some_and(|m| m.eq_ignore_ascii_case("bring-your-own-license"));
    if byol {
        Some("Bring your own license")
    } else if engine == "oracle-se1" || engine == "oracle-se2" || engine.starts_with("sqlserver-") {
        Some("License included")
    } else {
        None
    }
}

fn is_io1(values: &Attributes) -> bool {
    str_value(values, "storage_type").is_some_and(|t| t.eq_ignore_ascii_case("io1"))
}

fn volume_type(values: &Attributes) -> &'static str {
    match str_value(values, "storage_type").map(str::to_ascii_lowercase).as_deref() {
        Some("io1") => "Provisioned IOPS",
        Some("standard") => "Magnetic",
        _ => "General Purpose",
    }
}

fn allocated_storage(values: &Attributes) -> Decimal {
    let storage = decimal_value(values, "allocated_storage").unwrap_or(DEFAULT_ALLOCATED_STORAGE);
    if is_io1(values) {
        storage.max(MIN_IO1_STORAGE)
    } else {
        storage
    }
}

fn provisioned_iops(values: &Attributes) -> Decimal {
    decimal_value(values, "iops")
        .unwrap_or(Decimal::ZERO)
        .max(MIN_IO1_IOPS)
}

/// `aws_db_instance`
#[derive(Debug, Clone, Copy)]
pub struct DbInstance;

impl ResourceKind for DbInstance {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let values = ctx.values;
        let mut db = Resource::new(ctx.address, ctx.resource_type, values.clone()).in_region(ctx.region);

        let engine_name = engine(values);
        let instance_class = str_value(values, "instance_class").unwrap_or("unknown");
        let deployment_option = if bool_value(values, "multi_az") {
            "Multi-AZ"
        } else {
            "Single-AZ"
        };

        let mut instance_filters = vec![
            Filter::equals("instanceType", instance_class),
            Filter::equals("deploymentOption", deployment_option),
        ];
        if let Some(db_engine) = database_engine(&engine_name) {
            instance_filters.push(Filter::equals("databaseEngine", db_engine));
        }
        if let Some(edition) = database_edition(&engine_name) {
            instance_filters.push(Filter::equals("databaseEdition", edition));
        }
        if let Some(license) = license_model(&engine_name, values) {
            instance_filters.push(Filter::equals("licenseModel", license));
        }

        db.add_price_component(PriceComponent::new(
            format!("Database instance ({deployment_option}, {instance_class})"),
            "hours",
            TimeUnit::Hour,
            ProductFilter::aws("AmazonRDS", "Database Instance", ctx.region)
                .with_attributes(&instance_filters),
            PriceFilter::on_demand(),
        ));

        db.add_price_component(
            PriceComponent::new(
                "GB",
                "GB-months",
                TimeUnit::Month,
                ProductFilter::aws("AmazonRDS", "Database Storage", ctx.region).with_attributes(&[
                    Filter::equals("volumeType", volume_type(values)),
                    Filter::equals("deploymentOption", deployment_option),
                ]),
                PriceFilter::on_demand(),
            )
            .with_quantity(allocated_storage),
        );

        db.add_price_component(
            PriceComponent::new(
                "IOPS",
                "IOPS-months",
                TimeUnit::Month,
                ProductFilter::aws("AmazonRDS", "Provisioned IOPS", ctx.region)
                    .with_attributes(&[Filter::equals("deploymentOption", deployment_option)]),
                PriceFilter::on_demand(),
            )
            .with_quantity(provisioned_iops)
            .with_skip(|values| !is_io1(values)),
        );

        db
    }
}
