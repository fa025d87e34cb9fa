//! Topology mode selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of the private tier.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TopologyMode {
    /// Private subnets reach the internet outbound-only through a NAT gateway.
    NatRouted,
    /// Private subnets have no route to or from the internet.
    Isolated,
}

impl TopologyMode {
    /// The single place the NAT flag is turned into a mode.
    pub fn select(nat_enabled: bool) -> TopologyMode {
        if nat_enabled {
            TopologyMode::NatRouted
        } else {
            TopologyMode::Isolated
        }
    }

    pub fn has_nat(&self) -> bool {
        matches!(self, TopologyMode::NatRouted)
    }
}

impl From<bool> for TopologyMode {
    fn from(nat_enabled: bool) -> Self {
        TopologyMode::select(nat_enabled)
    }
}

impl fmt::Display for TopologyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyMode::NatRouted => f.write_str("nat-routed"),
            TopologyMode::Isolated => f.write_str("isolated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select() {
        assert_eq!(TopologyMode::select(true), TopologyMode::NatRouted);
        assert_eq!(TopologyMode::select(false), TopologyMode::Isolated);
        assert_eq!(TopologyMode::from(true), TopologyMode::NatRouted);
        assert!(TopologyMode::NatRouted.has_nat());
        assert!(!TopologyMode::Isolated.has_nat());
        assert_eq!(TopologyMode::Isolated.to_string(), "isolated");
    }
}
