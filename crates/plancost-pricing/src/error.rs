//! Error types for pricing and aggregation.

use std::path::PathBuf;

use plancost_resource::ResourceError;
use thiserror::Error;

/// Pricing errors.
///
/// Any of these is terminal for the batch that raised it. Catalog misses and
/// ambiguous matches are not errors; they are logged and priced at zero or
/// first-wins.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Pricing API answered with a server-side or throttling status
    #[error("Pricing API request failed (transient, HTTP {status}): {message}")]
    ApiTransient { status: u16, message: String },

    /// Pricing API rejected the credentials
    #[error("Pricing API authentication failed (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Pricing API request failed (permanent)
    #[error("Pricing API request failed (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Outbound batch exceeded the configured timeout
    #[error("Pricing API timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Response array does not line up with the outbound queries
    #[error("Pricing API returned {actual} results for {expected} queries")]
    ResponseLength { expected: usize, actual: usize },

    /// A price could not be read as a decimal
    #[error("Invalid price {value:?} for {address} {component}")]
    InvalidPrice {
        address: String,
        component: String,
        value: String,
    },

    /// A catalog regex filter did not compile
    #[error("Invalid regex filter {pattern:?}: {message}")]
    InvalidFilter { pattern: String, message: String },

    /// Catalog file could not be read
    #[error("Failed to read catalog {path}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not a valid product list
    #[error("Invalid catalog: {0}")]
    CatalogInvalid(String),

    /// HTTP client could not be built
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Resource model error
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

impl PricingError {
    /// Classify an HTTP status code into the matching error.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let message = body.trim().to_string();
        match status {
            401 | 403 => Self::Unauthorized { status, message },
            408 | 429 | 500 | 502 | 503 | 504 => Self::ApiTransient { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// Transient network or API issue. The core never retries; callers may.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ApiTransient { .. } | Self::Timeout { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn friendly_message(&self) -> String {
        match self {
            Self::Timeout { secs } => {
                format!("Pricing API did not answer within {secs}s. Raise timeout_secs or retry.")
            }
            Self::Unauthorized { .. } => {
                "Pricing API rejected the request. Check the API key environment variable.".to_string()
            }
            Self::ApiTransient { status, .. } => {
                format!("Pricing API is temporarily unavailable (HTTP {status}). Try again later.")
            }
            Self::Http(e) if e.is_connect() => {
                "Could not connect to the pricing API. Check pricing_api_endpoint.".to_string()
            }
            _ => format!("Error: {self}"),
        }
    }
}

/// Result type for pricing operations.
pub type Result<T> = std::result::Result<T, PricingError>;
