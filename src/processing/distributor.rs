//! Availability-zone distribution.
//!
//! Places the blocks of one tier onto AZ indices 0, 1, 2 in order.

use super::allocator::AZ_COUNT;
use crate::error::{Result, SynthError};
use crate::models::{NetworkBlock, Subnet, Tier};

/// Map the first [`AZ_COUNT`] blocks of a tier onto AZ indices.
///
/// Fails with `InsufficientBlocksError` when a tier cannot fill every AZ.
pub fn distribute(blocks: &[NetworkBlock], tier: Tier) -> Result<Vec<Subnet>> {
    if blocks.len() < AZ_COUNT {
        return Err(SynthError::InsufficientBlocksError {
            tier,
            available: blocks.len(),
            required: AZ_COUNT,
        });
    }
    if blocks.len() > AZ_COUNT {
        log::debug!(
            "{tier} tier: ignoring {} block(s) beyond {AZ_COUNT} AZs",
            blocks.len() - AZ_COUNT
        );
    }

    let subnets: Vec<Subnet> = blocks
        .iter()
        .take(AZ_COUNT)
        .enumerate()
        .map(|(az_index, block)| Subnet::new(tier, az_index, *block))
        .collect();

    for s in &subnets {
        log::trace!("placed {s}");
    }
    Ok(subnets)
}
