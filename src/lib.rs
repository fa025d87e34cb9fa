//! CIDR-based multi-AZ network topology synthesizer.
//!
//! Turns a base CIDR block, a name prefix and a NAT flag into a validated,
//! dependency-ordered [`ResourceGraph`] describing a VPC with three public and
//! three private subnets. Provisioning the graph is left to an emitter.

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;
mod synthesizer;

pub use config::NetworkConfig;
pub use error::{Result, SynthError};
pub use models::ResourceGraph;
pub use synthesizer::{parse_base_cidr, plan_subnets, synthesize};
