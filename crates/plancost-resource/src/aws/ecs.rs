//! ECS services and task definitions.
//!
//! A Fargate service is priced from the memory and CPU its task definition
//! asks for, so its components are derived when the `task_definition`
//! reference is wired.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use crate::attributes::{Attributes, count_value, first_block, str_value, to_decimal};
use crate::filter::{Filter, PriceFilter, ProductFilter};
use crate::graph::DEFAULT_REGION;
use crate::price_component::{PriceComponent, TimeUnit};
use crate::registry::{BuildContext, ResourceKind};
use crate::resource::Resource;

const MIB_PER_GB: Decimal = Decimal::from_parts(1024, 0, 0, false, 0);
const CPU_UNITS_PER_VCPU: Decimal = Decimal::from_parts(1024, 0, 0, false, 0);

/// Parse `"2 GB"`, or a plain MiB figure.
pub fn memory_gb(value: &Value) -> Option<Decimal> {
    with_suffix(value, "gb").or_else(|| to_decimal(value).map(|mib| mib / MIB_PER_GB))
}

/// Parse `"1 vCPU"`, or a plain CPU-unit figure.
pub fn vcpu(value: &Value) -> Option<Decimal> {
    with_suffix(value, "vcpu").or_else(|| to_decimal(value).map(|units| units / CPU_UNITS_PER_VCPU))
}

fn with_suffix(value: &Value, suffix: &str) -> Option<Decimal> {
    let text = value.as_str()?.trim().to_ascii_lowercase();
    text.strip_suffix(suffix)?.trim().parse().ok()
}

fn is_fargate(service: &Resource) -> bool {
    str_value(service.raw_values(), "launch_type") == Some("FARGATE")
}

fn fargate_components(region: &str, task: &Attributes) -> Vec<PriceComponent> {
    let memory = task.get("memory").and_then(memory_gb).unwrap_or(Decimal::ZERO);
    let cpu = task.get("cpu").and_then(vcpu).unwrap_or(Decimal::ZERO);

    let mut components = vec![
        PriceComponent::new(
            "GB hours",
            "GB-hours",
            TimeUnit::Hour,
            ProductFilter::aws("AmazonECS", "Compute", region)
                .with_attributes(&[Filter::regex("usagetype", "/Fargate-GB-Hours/")]),
            PriceFilter::on_demand(),
        )
        .with_fixed_quantity(memory),
        PriceComponent::new(
            "CPU hours",
            "CPU-hours",
            TimeUnit::Hour,
            ProductFilter::aws("AmazonECS", "Compute", region)
                .with_attributes(&[Filter::regex("usagetype", "/Fargate-vCPU-Hours:perCPU/")]),
            PriceFilter::on_demand(),
        )
        .with_fixed_quantity(cpu),
    ];

    let accelerator = first_block(task, "inference_accelerator")
        .and_then(|accelerator| str_value(accelerator, "device_type"));
    if let Some(device_type) = accelerator {
        components.push(PriceComponent::new(
            format!("Inference accelerator ({device_type})"),
            "hours",
            TimeUnit::Hour,
            ProductFilter::aws("AmazonEI", "Elastic Inference", region)
                .with_attributes(&[Filter::regex("usagetype", format!("/{device_type}/"))]),
            PriceFilter::on_demand(),
        ));
    }
    components
}

/// `aws_ecs_task_definition`
#[derive(Debug, Clone, Copy)]
pub struct EcsTaskDefinition;

impl ResourceKind for EcsTaskDefinition {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        Resource::new(ctx.address, ctx.resource_type, ctx.values.clone())
            .in_region(ctx.region)
            .without_cost()
    }
}

/// `aws_ecs_service`
#[derive(Debug, Clone, Copy)]
pub struct EcsService;

impl ResourceKind for EcsService {
    fn build(&self, ctx: &BuildContext<'_>) -> Resource {
        let mut service =
            Resource::new(ctx.address, ctx.resource_type, ctx.values.clone()).in_region(ctx.region);
        service.set_resource_count(count_value(ctx.values, "desired_count").unwrap_or(1));
        service
    }

    fn reacts_to_references(&self) -> bool {
        true
    }

    fn on_reference(&self, service: &mut Resource, name: &str, target: &Resource) {
        if name != "task_definition" || target.resource_type() != "aws_ecs_task_definition" {
            return;
        }
        if !is_fargate(service) {
            debug!(address = service.address(), "only Fargate services are estimated");
            return;
        }
        let region = service.region().unwrap_or(DEFAULT_REGION).to_string();
        service.replace_price_components(fargate_components(&region, target.raw_values()));
    }

    fn finalize(&self, service: &mut Resource) {
        if is_fargate(service) && service.price_components().is_empty() {
            warn!(
                address = service.address(),
                "Fargate service has no task definition, not estimated"
            );
        }
    }
}
