//! Integration tests for building resource graphs from plan JSON.

use plancost_resource::{GraphBuilder, Plan, PriceComponent, Registry, Resource, ResourceGraph};
use rust_decimal_macros::dec;

fn build(plan_json: &str) -> ResourceGraph {
    let plan = Plan::from_json(plan_json).unwrap();
    GraphBuilder::new(&Registry::with_aws()).build(&plan)
}

fn component<'a>(resource: &'a Resource, name: &str) -> &'a PriceComponent {
    resource
        .price_components()
        .iter()
        .find(|c| c.name() == name)
        .unwrap_or_else(|| panic!("{} has no component {name}", resource.address()))
}

/// Autoscaling group inside a module, defined before the launch template it
/// references, with an explicit capacity of 2.
const MODULE_ASG_PLAN: &str = r#"{
  "region": "eu-west-1",
  "resources": [
    {
      "address": "module.web.aws_autoscaling_group.asg",
      "type": "aws_autoscaling_group",
      "values": {"desired_capacity": 2, "max_size": 4, "min_size": 1}
    },
    {
      "address": "module.web.aws_launch_template.lt",
      "type": "aws_launch_template",
      "values": {
        "instance_type": "t3.medium",
        "block_device_mappings": [
          {"device_name": "/dev/xvda", "ebs": [{"volume_size": 30, "volume_type": "gp3"}]}
        ]
      }
    },
    {
      "address": "aws_s3_bucket.logs",
      "type": "aws_s3_bucket",
      "values": {}
    }
  ],
  "configuration": {
    "module_calls": {
      "web": {
        "module": {
          "resources": [
            {
              "address": "aws_autoscaling_group.asg",
              "expressions": {
                "launch_template": [
                  {"id": {"references": ["aws_launch_template.lt.id", "aws_launch_template.lt"]}}
                ],
                "vpc_zone_identifier": {"references": ["aws_subnet.missing"]}
              }
            },
            {"address": "aws_launch_template.lt", "expressions": {}}
          ]
        }
      }
    }
  }
}"#;

#[test]
fn test_volume_without_size_uses_default() {
    let graph = build(
        r#"{"resources": [{"address": "aws_ebs_volume.data", "type": "aws_ebs_volume", "values": {}}]}"#,
    );
    let volume = graph.get("aws_ebs_volume.data").unwrap();

    assert_eq!(component(volume, "GB").quantity(volume).unwrap(), dec!(8));
}

#[test]
fn test_iops_component_only_priced_for_io1() {
    let graph = build(
        r#"{"resources": [
            {"address": "aws_ebs_volume.fast", "type": "aws_ebs_volume", "values": {"type": "io1", "size": 10, "iops": 300}},
            {"address": "aws_ebs_volume.slow", "type": "aws_ebs_volume", "values": {"type": "st1", "size": 500}}
        ]}"#,
    );

    let fast = graph.get("aws_ebs_volume.fast").unwrap();
    assert!(!component(fast, "IOPS").should_skip(fast));

    let slow = graph.get("aws_ebs_volume.slow").unwrap();
    assert!(component(slow, "IOPS").should_skip(slow));
}

#[test]
fn test_autoscaling_group_mirrors_launch_template_across_module() {
    let graph = build(MODULE_ASG_PLAN);

    let asg = graph.get("module.web.aws_autoscaling_group.asg").unwrap();
    assert_eq!(
        asg.references()["launch_template.0.id"],
        "module.web.aws_launch_template.lt"
    );
    assert!(!asg.references().contains_key("vpc_zone_identifier"));

    let hours = component(asg, "Instance hours (t3.medium)");
    assert_eq!(hours.quantity(asg).unwrap(), dec!(1460));
    assert_eq!(hours.product_filter().region.as_deref(), Some("eu-west-1"));

    let subs: Vec<&str> = asg.sub_resources().iter().map(Resource::address).collect();
    assert_eq!(
        subs,
        vec!["module.web.aws_autoscaling_group.asg.block_device_mapping[0]"]
    );
    let device = &asg.sub_resources()[0];
    assert_eq!(device.resource_count(), 2);
    assert_eq!(component(device, "GB").quantity(device).unwrap(), dec!(60));
}

#[test]
fn test_launch_template_kept_without_cost() {
    let graph = build(MODULE_ASG_PLAN);

    let lt = graph.get("module.web.aws_launch_template.lt").unwrap();
    assert!(!lt.has_cost());
    assert_eq!(lt.resource_count(), 1);
    assert_eq!(component(lt, "Instance hours (t3.medium)").quantity(lt).unwrap(), dec!(730));
}

#[test]
fn test_unsupported_resources_are_counted() {
    let graph = build(MODULE_ASG_PLAN);

    assert_eq!(graph.total(), 3);
    assert_eq!(graph.resources().len(), 2);
    assert_eq!(graph.unsupported(), ["aws_s3_bucket.logs".to_string()]);
}

#[test]
fn test_top_level_resources_sorted_by_address() {
    let graph = build(
        r#"{"resources": [
            {"address": "aws_nat_gateway.z", "type": "aws_nat_gateway"},
            {"address": "aws_instance.b", "type": "aws_instance", "values": {"instance_type": "t3.nano"}},
            {"address": "aws_elb.a", "type": "aws_elb"}
        ]}"#,
    );

    let addresses: Vec<&str> = graph.resources().iter().map(Resource::address).collect();
    assert_eq!(addresses, vec!["aws_elb.a", "aws_instance.b", "aws_nat_gateway.z"]);
}

#[test]
fn test_group_without_template_has_no_components() {
    let graph = build(
        r#"{"resources": [
            {"address": "aws_autoscaling_group.lonely", "type": "aws_autoscaling_group", "values": {"desired_capacity": 3}}
        ]}"#,
    );

    let asg = graph.get("aws_autoscaling_group.lonely").unwrap();
    assert!(asg.price_components().is_empty());
    assert_eq!(asg.resource_count(), 3);
}

#[test]
fn test_launch_configuration_reference_with_instance_devices() {
    let graph = build(
        r#"{
        "resources": [
            {"address": "aws_launch_configuration.lc", "type": "aws_launch_configuration",
             "values": {"instance_type": "m5.large", "ebs_block_device": [{"volume_size": 100}]}},
            {"address": "aws_autoscaling_group.asg", "type": "aws_autoscaling_group",
             "values": {"desired_capacity": 3}}
        ],
        "references": [
            {"address": "aws_autoscaling_group.asg", "attribute": "launch_configuration",
             "target": "aws_launch_configuration.lc"}
        ]
    }"#,
    );

    let asg = graph.get("aws_autoscaling_group.asg").unwrap();
    let subs: Vec<&str> = asg.sub_resources().iter().map(Resource::address).collect();
    assert_eq!(
        subs,
        vec![
            "aws_autoscaling_group.asg.ebs_block_device[0]",
            "aws_autoscaling_group.asg.root_block_device",
        ]
    );
    assert_eq!(component(asg, "Instance hours (m5.large)").quantity(asg).unwrap(), dec!(2190));
    for device in asg.flatten_sub_resources() {
        assert_eq!(device.resource_count(), 3);
    }
}

#[test]
fn test_group_mirrors_counted_launch_template() {
    let graph = build(
        r#"{
        "resources": [
            {"address": "aws_autoscaling_group.asg", "type": "aws_autoscaling_group",
             "values": {"desired_capacity": 2}},
            {"address": "aws_launch_template.lt[0]", "type": "aws_launch_template",
             "values": {"instance_type": "t3.small"}}
        ],
        "configuration": {"resources": [
            {"address": "aws_autoscaling_group.asg",
             "expressions": {"launch_template": [{"id": {"references": ["aws_launch_template.lt"]}}]}}
        ]}
    }"#,
    );

    let asg = graph.get("aws_autoscaling_group.asg").unwrap();
    assert_eq!(
        asg.references().get("launch_template.0.id").map(String::as_str),
        Some("aws_launch_template.lt[0]")
    );
    assert_eq!(component(asg, "Instance hours (t3.small)").quantity(asg).unwrap(), dec!(1460));
}

#[test]
fn test_ecs_service_priced_from_task_definition() {
    let graph = build(
        r#"{
        "resources": [
            {"address": "aws_ecs_service.api", "type": "aws_ecs_service",
             "values": {"launch_type": "FARGATE", "desired_count": 2}},
            {"address": "aws_ecs_task_definition.api", "type": "aws_ecs_task_definition",
             "values": {"memory": "4 GB", "cpu": "2 vCPU"}}
        ],
        "configuration": {"resources": [
            {"address": "aws_ecs_service.api",
             "expressions": {"task_definition": {"references": ["aws_ecs_task_definition.api"]}}}
        ]}
    }"#,
    );

    let service = graph.get("aws_ecs_service.api").unwrap();
    assert_eq!(component(service, "GB hours").quantity(service).unwrap(), dec!(5840));
    assert_eq!(component(service, "CPU hours").quantity(service).unwrap(), dec!(2920));
    assert!(!graph.get("aws_ecs_task_definition.api").unwrap().has_cost());
}
