//! Domain models for topology synthesis.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`NetworkBlock`] - IPv4 range in CIDR notation
//! - [`Subnet`], [`Tier`] and [`SubnetPlan`] - planned subnets per tier
//! - [`ResourceGraph`] - the typed node/edge graph handed to the emitter

mod block;
mod graph;
mod subnet;

// Re-export public types
pub use block::{get_cidr_mask, ip_after_subnet, NetworkBlock, MAX_LENGTH};
pub use graph::{
    Edge, Export, Node, RelationKind, Resource, ResourceGraph, ResourceKind, RouteTarget,
    RuleAction, ACL_RULE_NUMBER, DEFAULT_ROUTE,
};
pub use subnet::{Subnet, SubnetPlan, Tier};
