//! Error taxonomy for topology synthesis.
//!
//! Every failure is terminal for the synthesis call that raised it: the caller
//! gets a typed error and never a partially built graph.

use crate::models::Tier;

/// Failures raised while validating input or assembling a graph.
#[allow(clippy::enum_variant_names)]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// Malformed or missing input (bad CIDR syntax, empty name prefix, ...).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Base block prefix length is not one of the supported widths.
    #[error("invalid block {block}: prefix length /{prefix} is not supported (expected /16../24)")]
    InvalidBlockError { block: String, prefix: u8 },

    /// Requested subnet count does not fit the fixed 3 public + 3 private layout.
    #[error("unsupported topology: {requested} subnets requested, only {supported} supported")]
    UnsupportedTopologyError { requested: usize, supported: usize },

    /// Not enough CIDR blocks to fill every AZ slot of a tier.
    #[error("insufficient blocks for {tier} tier: {available} available, {required} required")]
    InsufficientBlocksError {
        tier: Tier,
        available: usize,
        required: usize,
    },

    /// Internal graph invariant violated (dangling edge, duplicate id, cycle).
    #[error("graph error: {0}")]
    GraphError(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SynthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = SynthError::InvalidBlockError {
            block: "10.0.0.0/26".to_string(),
            prefix: 26,
        };
        assert_eq!(
            e.to_string(),
            "invalid block 10.0.0.0/26: prefix length /26 is not supported (expected /16../24)"
        );

        let e = SynthError::InsufficientBlocksError {
            tier: Tier::Private,
            available: 2,
            required: 3,
        };
        assert_eq!(
            e.to_string(),
            "insufficient blocks for private tier: 2 available, 3 required"
        );
    }
}
