//! AWS region lookup.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::attributes::{Attributes, str_value};

const AWS_REGIONS: &[(&str, &str)] = &[
    ("af-south-1", "Africa (Cape Town)"),
    ("ap-east-1", "Asia Pacific (Hong Kong)"),
    ("ap-northeast-1", "Asia Pacific (Tokyo)"),
    ("ap-northeast-2", "Asia Pacific (Seoul)"),
    ("ap-northeast-3", "Asia Pacific (Osaka)"),
    ("ap-south-1", "Asia Pacific (Mumbai)"),
    ("ap-southeast-1", "Asia Pacific (Singapore)"),
    ("ap-southeast-2", "Asia Pacific (Sydney)"),
    ("ca-central-1", "Canada (Central)"),
    ("cn-north-1", "China (Beijing)"),
    ("cn-northwest-1", "China (Ningxia)"),
    ("eu-central-1", "EU (Frankfurt)"),
    ("eu-north-1", "EU (Stockholm)"),
    ("eu-south-1", "EU (Milan)"),
    ("eu-west-1", "EU (Ireland)"),
    ("eu-west-2", "EU (London)"),
    ("eu-west-3", "EU (Paris)"),
    ("me-south-1", "Middle East (Bahrain)"),
    ("sa-east-1", "South America (Sao Paulo)"),
    ("us-east-1", "US East (N. Virginia)"),
    ("us-east-2", "US East (Ohio)"),
    ("us-gov-east-1", "AWS GovCloud (US-East)"),
    ("us-gov-west-1", "AWS GovCloud (US-West)"),
    ("us-west-1", "US West (N. California)"),
    ("us-west-2", "US West (Oregon)"),
];

fn regions() -> &'static HashMap<&'static str, &'static str> {
    static REGIONS: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    REGIONS.get_or_init(|| AWS_REGIONS.iter().copied().collect())
}

/// Catalog location name for a region code.
pub fn location(region: &str) -> Option<&'static str> {
    regions().get(region).copied()
}

/// Region a resource is priced in.
///
/// The region embedded in the resource's ARN wins, then the plan's provider
/// region, then `default_region`.
pub fn resolve(values: &Attributes, plan_region: Option<&str>, default_region: &str) -> String {
    let from_arn = str_value(values, "arn")
        .and_then(|arn| arn.split(':').nth(3))
        .filter(|region| !region.is_empty());

    let region = from_arn
        .or(plan_region.filter(|r| !r.is_empty()))
        .unwrap_or(default_region);

    if location(region).is_none() {
        tracing::debug!(region, "region not in the location table");
    }
    region.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: serde_json::Value) -> Attributes {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_location() {
        assert_eq!(location("eu-west-2"), Some("EU (London)"));
        assert_eq!(location("mars-north-1"), None);
    }

    #[test]
    fn test_arn_region_wins() {
        let v = values(json!({"arn": "arn:aws:ec2:eu-west-1:123456789012:instance/i-0abc"}));
        assert_eq!(resolve(&v, Some("us-west-2"), "us-east-1"), "eu-west-1");
    }

    #[test]
    fn test_plan_region_then_default() {
        assert_eq!(resolve(&values(json!({})), Some("us-west-2"), "us-east-1"), "us-west-2");
        assert_eq!(resolve(&values(json!({})), None, "us-east-1"), "us-east-1");
    }

    #[test]
    fn test_global_arn_falls_back() {
        let v = values(json!({"arn": "arn:aws:iam::123456789012:role/x"}));
        assert_eq!(resolve(&v, None, "ap-south-1"), "ap-south-1");
    }

    #[test]
    fn test_unknown_region_is_kept() {
        assert_eq!(resolve(&values(json!({})), Some("xx-test-9"), "us-east-1"), "xx-test-9");
    }
}
