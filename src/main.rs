//! plancost - cost estimation for infrastructure-as-code plans
//!
//! Reads a normalized plan (JSON), builds the resource graph, prices it
//! against the pricing API or a local catalog and prints the cost
//! breakdown as JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Price a plan against the configured pricing API
//! plancost plan.json
//!
//! # Price offline from a catalog file
//! plancost plan.json --catalog prices.yaml
//!
//! # With verbose logging and an explicit config file
//! plancost plan.json -v --config ./plancost.yaml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use plancost_core::{Config, LogGuard, init_logging};
use plancost_pricing::{EstimateReport, Estimator, PricingClient, PricingService, StaticCatalog};
use plancost_resource::{GraphBuilder, Plan, Registry};
use tracing::{error, info};

/// Estimate the monthly cost of an infrastructure plan.
#[derive(Parser, Debug)]
#[command(name = "plancost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Normalized plan JSON file
    plan: PathBuf,

    /// Configuration file (defaults to ~/.plancost/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Price from a local JSON or YAML catalog instead of the pricing API
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Region for resources whose plan does not set one
    #[arg(long)]
    region: Option<String>,

    /// Directory for log files (defaults to ~/.plancost/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(1);
        }
    };

    let _guard = match setup_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::from(1);
        }
    };

    match run(&cli, &config).await {
        Ok(report) => {
            if let Some(advisory) = report.advisory() {
                eprintln!("{advisory}");
            }
            for failure in &report.failures {
                eprintln!("Failed to price {}: {}", failure.address, failure.error);
            }
            if report.failures.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            error!("estimation failed: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Load configuration, then apply environment and command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let mut config = config.with_env_overrides();
    if let Some(region) = &cli.region {
        config = config.with_default_region(region);
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn setup_logging(cli: &Cli, config: &Config) -> plancost_core::Result<LogGuard> {
    init_logging(config.log_dir.clone(), cli.verbose > 0)
}

fn read_plan(path: &Path) -> anyhow::Result<Plan> {
    let bytes = std::fs::read(path).with_context(|| format!("reading plan {}", path.display()))?;
    Plan::from_slice(&bytes).with_context(|| format!("parsing plan {}", path.display()))
}

async fn pricing_service(cli: &Cli, config: &Config) -> anyhow::Result<Arc<dyn PricingService>> {
    let service: Arc<dyn PricingService> = match &cli.catalog {
        Some(path) => Arc::new(StaticCatalog::load(path).await?),
        None => Arc::new(PricingClient::from_config(config)?),
    };
    Ok(service)
}

/// Build, price and print the estimate for the plan named on the command line.
async fn run(cli: &Cli, config: &Config) -> anyhow::Result<EstimateReport> {
    let plan = read_plan(&cli.plan)?;
    info!(plan = %cli.plan.display(), resources = plan.resources.len(), "plan loaded");

    let registry = Registry::with_aws();
    let graph = GraphBuilder::new(&registry)
        .with_default_region(&config.default_region)
        .build(&plan);

    let service = pricing_service(cli, config).await?;
    let report = Estimator::from_config(service, config).estimate(graph).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    info!(monthly_cost = %report.total_monthly_cost(), "estimate printed");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    const PLAN: &str = r#"{"resources": [
        {"address": "aws_ebs_volume.data", "type": "aws_ebs_volume", "values": {"size": 50}},
        {"address": "aws_s3_bucket.assets", "type": "aws_s3_bucket"}
    ]}"#;

    const CATALOG: &str = r#"[{
        "vendorName": "aws", "service": "AmazonEC2", "productFamily": "Storage", "region": "eu-west-1",
        "attributes": {"volumeApiName": "gp2"},
        "prices": [{"purchaseOption": "on_demand", "USD": "0.11", "priceHash": "gp2-eu"}]
    }]"#;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "plancost", "plan.json", "--catalog", "prices.yaml", "--region", "eu-west-1", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.plan, PathBuf::from("plan.json"));
        assert_eq!(cli.catalog, Some(PathBuf::from("prices.yaml")));
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_requires_plan() {
        assert!(Cli::try_parse_from(["plancost"]).is_err());
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let cli = Cli::try_parse_from(["plancost", "plan.json", "--config", "/nonexistent/plancost.yaml"])
            .unwrap();
        assert!(load_config(&cli).is_err());
    }

    #[tokio::test]
    async fn test_run_with_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let plan_path = dir.path().join("plan.json");
        let catalog_path = dir.path().join("catalog.json");
        std::fs::write(&plan_path, PLAN).unwrap();
        std::fs::write(&catalog_path, CATALOG).unwrap();

        let cli = Cli::try_parse_from([
            OsString::from("plancost"),
            plan_path.into_os_string(),
            OsString::from("--catalog"),
            catalog_path.into_os_string(),
        ])
        .unwrap();
        let config = Config::default().with_default_region("eu-west-1");

        let report = run(&cli, &config).await.unwrap();

        assert_eq!(report.total_resources, 2);
        assert_eq!(report.unsupported, vec!["aws_s3_bucket.assets".to_string()]);
        let volume = report.breakdown("aws_ebs_volume.data").unwrap();
        assert_eq!(volume.total_monthly_cost().normalize().to_string(), "5.5");
    }
}
