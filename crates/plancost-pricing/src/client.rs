//! Pricing API client using direct HTTP requests.
//!
//! [`PricingClient`] posts a whole batch of GraphQL queries as one JSON array
//! and expects a JSON array of the same length back.
//!
//! ## Example
//!
//! ```no_run
//! use plancost_core::Config;
//! use plancost_pricing::{PricingClient, PricingService};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = PricingClient::from_config(&Config::default())?;
//! let results = client.query_batch(&[]).await?;
//! assert!(results.is_empty());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use plancost_core::Config;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::error::{PricingError, Result};
use crate::query::{GraphQLQuery, PriceQuery};
use crate::service::PricingService;

/// Header carrying the pricing API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// `User-Agent` sent with every request.
pub fn user_agent() -> String {
    format!("plancost-{}", env!("CARGO_PKG_VERSION"))
}

/// GraphQL pricing API client.
pub struct PricingClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl PricingClient {
    /// Create a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PricingError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
            timeout_secs,
        })
    }

    /// Create a client from config, reading the API key from the configured
    /// environment variable when it is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::new(&config.pricing_api_endpoint, config.timeout_secs)?;
        Ok(match config.api_key() {
            Some(key) => client.with_api_key(key),
            None => client,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> PricingError {
        if err.is_timeout() {
            PricingError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            PricingError::Http(err)
        }
    }
}

#[async_trait]
impl PricingService for PricingClient {
    fn name(&self) -> &str {
        "pricing-api"
    }

    async fn query_batch(&self, queries: &[PriceQuery]) -> Result<Vec<Value>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let body: Vec<GraphQLQuery<'_>> = queries.iter().map(GraphQLQuery::from).collect();
        debug!(endpoint = %self.endpoint, queries = queries.len(), "sending pricing batch");

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, user_agent())
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PricingError::from_http_status(status.as_u16(), &body));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let results: Vec<Value> = serde_json::from_slice(&bytes)?;
        if results.len() != queries.len() {
            return Err(PricingError::ResponseLength {
                expected: queries.len(),
                actual: results.len(),
            });
        }

        debug!(results = results.len(), "pricing batch answered");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_version() {
        let agent = user_agent();
        assert!(agent.starts_with("plancost-"));
        assert!(agent.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_from_config_uses_endpoint() {
        let config = Config::default()
            .with_pricing_api_endpoint("http://pricing.internal/graphql")
            .with_timeout_secs(5);
        let client = PricingClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://pricing.internal/graphql");
        assert_eq!(client.timeout_secs, 5);
    }
}
