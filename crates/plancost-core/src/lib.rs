//! # plancost-core
//!
//! Core errors, logging and configuration shared by the plancost crates.
//!
//! This crate provides:
//! - [`PlancostError`] - Error types for configuration, I/O and bootstrap failures
//! - [`logging`] - Tracing setup and log management utilities
//! - [`config`] - YAML configuration with environment overrides
//!
//! ## Example
//!
//! ```no_run
//! use plancost_core::{Config, logging};
//!
//! fn main() -> plancost_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let config = Config::load_default()?.with_env_overrides();
//!     config.validate()?;
//!     tracing::info!(endpoint = %config.pricing_api_endpoint, "configuration loaded");
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use config::Config;
pub use error::{PlancostError, Result};
pub use logging::{LogGuard, init_logging};
