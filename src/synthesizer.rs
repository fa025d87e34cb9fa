//! Synthesis entry point: config in, validated resource graph out.

use crate::config::NetworkConfig;
use crate::error::{Result, SynthError};
use crate::models::{NetworkBlock, ResourceGraph, SubnetPlan, Tier};
use crate::processing::{allocate, build_with, distribute, split_tiers, BuildOptions, SUBNET_COUNT};

/// Parse the top-level block, insisting on a proper network address.
pub fn parse_base_cidr(base_cidr: &str) -> Result<NetworkBlock> {
    let block = NetworkBlock::new(base_cidr)?;
    if !block.is_network_address() {
        return Err(SynthError::ConfigError(format!(
            "baseCidr {block} has host bits set, did you mean {}/{}?",
            block.lo(),
            block.mask
        )));
    }
    Ok(block)
}

/// Allocate and distribute the subnets for `base`.
pub fn plan_subnets(base: NetworkBlock) -> Result<SubnetPlan> {
    let allocation = allocate(base, SUBNET_COUNT)?;
    let (public, private) = split_tiers(&allocation.blocks);
    Ok(SubnetPlan {
        vpc_block: base,
        public: distribute(public, Tier::Public)?,
        private: distribute(private, Tier::Private)?,
    })
}

/// Turn `config` into a finished, validated [`ResourceGraph`].
///
/// Deterministic: the same config always produces an identical graph.
pub fn synthesize(config: &NetworkConfig) -> Result<ResourceGraph> {
    config.validate()?;
    let base = parse_base_cidr(&config.base_cidr)?;
    let plan = plan_subnets(base)?;
    let mode = config.mode();
    let options = BuildOptions {
        dhcp_domain: config.dhcp_domain(),
        api_endpoint: config.api_endpoint,
    };

    let graph = build_with(&plan, mode, &config.name_prefix, &options)?;
    graph.validate()?;

    log::info!(
        "synthesized '{}' {base} mode={mode}: {} nodes, {} edges",
        config.name_prefix,
        graph.nodes().len(),
        graph.edges().len()
    );
    Ok(graph)
}
