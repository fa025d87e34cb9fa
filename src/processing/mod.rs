//! Topology planning pipeline.
//!
//! This module contains the planning steps, leaf-first:
//! - [`allocator`] - Carving the base block into child blocks
//! - [`distributor`] - Placing each tier's blocks onto AZ indices
//! - [`mode`] - NAT-routed vs isolated selection
//! - [`builder`] - Assembling the resource graph

mod allocator;
mod builder;
mod distributor;
mod mode;

// Re-export public functions
pub use allocator::{allocate, extra_bits, split_tiers, Allocation, AZ_COUNT, SUBNET_COUNT};
pub use builder::{
    acl_id, build, build_with, default_route_id, route_table_id, subnet_id, BuildOptions,
    AMAZON_PROVIDED_DNS, API_ENDPOINT_SERVICE,
};
pub use distributor::distribute;
pub use mode::TopologyMode;
