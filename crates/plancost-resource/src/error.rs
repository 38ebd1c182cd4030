//! Error types for the resource model.

use thiserror::Error;

/// Result type alias using [`ResourceError`].
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Resource model errors.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// Address could not be split into segments
    #[error("malformed address {address:?}: {reason}")]
    MalformedAddress {
        /// The offending address
        address: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// A price component was priced twice in one run
    #[error("price for component {component:?} is already resolved")]
    PriceAlreadyResolved {
        /// Component name
        component: String,
    },

    /// No resource or component with the given key exists in the tree
    #[error("no price component {component:?} on resource {address}")]
    UnknownComponent {
        /// Resource address that was searched
        address: String,
        /// Component name that was searched
        component: String,
    },

    /// Quantity or cost arithmetic left the representable decimal range
    #[error("cost of component {component:?} on resource {address} overflows")]
    CostOverflow {
        /// Owning resource address
        address: String,
        /// Component name
        component: String,
    },

    /// Plan JSON could not be parsed
    #[error("invalid plan JSON: {0}")]
    InvalidPlan(#[from] serde_json::Error),
}

impl ResourceError {
    pub(crate) fn malformed(address: &str, reason: &'static str) -> Self {
        Self::MalformedAddress {
            address: address.to_string(),
            reason,
        }
    }

    /// Returns true if the error indicates a bug in how a run was driven
    /// rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::PriceAlreadyResolved { .. } | Self::UnknownComponent { .. }
        )
    }
}
