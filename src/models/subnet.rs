//! Subnet tier and subnet data model.

use super::NetworkBlock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subnet classification controlling routing and internet reachability.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Public,
    Private,
}

impl Tier {
    /// Both tiers in build order.
    pub const ALL: [Tier; 2] = [Tier::Public, Tier::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Public => "public",
            Tier::Private => "private",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planned subnet: one CIDR block placed in one availability zone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    /// Public or private tier.
    pub tier: Tier,
    /// Abstract AZ index, resolved to a zone name by the emitter.
    pub az_index: usize,
    /// Address range of the subnet.
    pub block: NetworkBlock,
    /// Whether instances get a public IP on launch (always false here).
    #[serde(default)]
    pub map_public_ip_on_launch: bool,
}

impl Subnet {
    pub fn new(tier: Tier, az_index: usize, block: NetworkBlock) -> Subnet {
        Subnet {
            tier,
            az_index,
            block,
            map_public_ip_on_launch: false,
        }
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} az{} {}", self.tier, self.az_index, self.block)
    }
}

/// Subnets of both tiers together with the enclosing VPC block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetPlan {
    /// Top-level block the VPC is created from.
    pub vpc_block: NetworkBlock,
    pub public: Vec<Subnet>,
    pub private: Vec<Subnet>,
}

impl SubnetPlan {
    pub fn tier(&self, tier: Tier) -> &[Subnet] {
        match tier {
            Tier::Public => &self.public,
            Tier::Private => &self.private,
        }
    }

    /// All subnets, public tier first.
    pub fn iter(&self) -> impl Iterator<Item = &Subnet> {
        self.public.iter().chain(self.private.iter())
    }
}
