//! Built-in AWS resource types.

pub mod autoscaling_group;
pub mod db_instance;
pub mod dynamodb_table;
pub mod ebs;
pub mod ecs;
pub mod instance;
pub mod launch;
pub mod load_balancer;
pub mod nat_gateway;

pub use autoscaling_group::AutoscalingGroup;
pub use db_instance::DbInstance;
pub use dynamodb_table::DynamoDbTable;
pub use ebs::{EbsSnapshot, EbsVolume};
pub use ecs::{EcsService, EcsTaskDefinition};
pub use instance::Instance;
pub use launch::{LaunchConfiguration, LaunchTemplate};
pub use load_balancer::LoadBalancer;
pub use nat_gateway::NatGateway;

use crate::registry::Registry;

/// Register every built-in AWS resource type.
pub fn register(registry: &mut Registry) {
    registry.register("aws_instance", Instance);
    registry.register("aws_ebs_volume", EbsVolume);
    registry.register("aws_ebs_snapshot", EbsSnapshot);
    registry.register("aws_ebs_snapshot_copy", EbsSnapshot);
    registry.register("aws_launch_configuration", LaunchConfiguration);
    registry.register("aws_launch_template", LaunchTemplate);
    registry.register("aws_autoscaling_group", AutoscalingGroup);
    registry.register("aws_nat_gateway", NatGateway);
    registry.register("aws_db_instance", DbInstance);
    registry.register("aws_elb", LoadBalancer::classic());
    registry.register("aws_lb", LoadBalancer::elbv2());
    registry.register("aws_alb", LoadBalancer::elbv2());
    registry.register("aws_dynamodb_table", DynamoDbTable);
    registry.register("aws_ecs_task_definition", EcsTaskDefinition);
    registry.register("aws_ecs_service", EcsService);
}
