//! CIDR allocation.
//!
//! Carves the top-level block into equally sized child blocks. The number of
//! extra prefix bits per child is fixed by the width of the base block.

use crate::error::{Result, SynthError};
use crate::models::NetworkBlock;

/// Number of child blocks the fixed topology needs (3 public + 3 private).
pub const SUBNET_COUNT: usize = 6;

/// Availability zones per tier.
pub const AZ_COUNT: usize = 3;

/// Result of carving a base block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Prefix length shared by every child block.
    pub child_prefix: u8,
    /// Child blocks in ascending address order.
    pub blocks: Vec<NetworkBlock>,
}

/// Extra prefix bits given to each child for a base block of width `prefix`.
///
/// Returns `None` for widths outside the supported table.
pub fn extra_bits(prefix: u8) -> Option<u8> {
    match prefix {
        16..=20 => Some(9),
        21 => Some(8),
        22 => Some(7),
        23 => Some(6),
        24 => Some(5),
        _ => None,
    }
}

/// Split `base` into `subnets_needed` consecutive child blocks.
///
/// Child *i* is the *i*-th partition counted from the base address. Callers
/// rely on that order: partitions 0-2 are public, 3-5 private.
pub fn allocate(base: NetworkBlock, subnets_needed: usize) -> Result<Allocation> {
    let bits = extra_bits(base.mask).ok_or_else(|| SynthError::InvalidBlockError {
        block: base.to_string(),
        prefix: base.mask,
    })?;

    if subnets_needed != SUBNET_COUNT {
        return Err(SynthError::UnsupportedTopologyError {
            requested: subnets_needed,
            supported: SUBNET_COUNT,
        });
    }

    let child_prefix = base.mask + bits;
    let mut blocks = Vec::with_capacity(subnets_needed);
    let mut next = NetworkBlock {
        addr: base.lo(),
        mask: child_prefix,
    };
    for i in 0..subnets_needed {
        if i > 0 {
            next = next.next(None)?;
        }
        blocks.push(next);
    }

    log::debug!(
        "allocate {base} -> {n} x /{child_prefix}: {first} .. {last}",
        n = blocks.len(),
        first = blocks[0],
        last = blocks[blocks.len() - 1],
    );

    Ok(Allocation {
        child_prefix,
        blocks,
    })
}

/// Split an allocation into its (public, private) halves.
pub fn split_tiers(blocks: &[NetworkBlock]) -> (&[NetworkBlock], &[NetworkBlock]) {
    blocks.split_at(AZ_COUNT.min(blocks.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(s: &str) -> NetworkBlock {
        NetworkBlock::new(s).unwrap()
    }

    #[test]
    fn test_allocate_slash_24() {
        let alloc = allocate(block("10.0.0.0/24"), 6).unwrap();
        assert_eq!(alloc.child_prefix, 29);
        let got: Vec<String> = alloc.blocks.iter().map(|b| b.to_string()).collect();
        assert_eq!(
            got,
            vec![
                "10.0.0.0/29",
                "10.0.0.8/29",
                "10.0.0.16/29",
                "10.0.0.24/29",
                "10.0.0.32/29",
                "10.0.0.40/29",
            ]
        );
    }

    #[test]
    fn test_allocate_all_supported_widths() {
        for prefix in 16..=24u8 {
            let base = block(&format!("10.0.0.0/{prefix}"));
            let alloc = allocate(base, SUBNET_COUNT).unwrap();
            let expected = prefix + extra_bits(prefix).unwrap();
            assert_eq!(alloc.child_prefix, expected, "base /{prefix}");
            assert_eq!(alloc.blocks.len(), SUBNET_COUNT);

            // contiguous from the base address, no gaps, no overlaps
            assert_eq!(alloc.blocks[0].addr, base.addr);
            for pair in alloc.blocks.windows(2) {
                assert_eq!(pair[0].mask, expected);
                assert!(!pair[0].overlaps(&pair[1]));
                assert_eq!(pair[0].next(None).unwrap(), pair[1]);
            }
            for b in &alloc.blocks {
                assert!(base.contains_block(b), "{b} not inside {base}");
            }
            let covered: u64 = alloc.blocks.iter().map(|b| b.size()).sum();
            assert_eq!(covered, SUBNET_COUNT as u64 * (1u64 << (32 - expected)));
        }
    }

    #[test]
    fn test_allocate_slash_20_children() {
        let alloc = allocate(block("10.0.0.0/20"), 6).unwrap();
        assert_eq!(alloc.child_prefix, 29);
        assert_eq!(alloc.blocks[5], block("10.0.0.40/29"));

        let alloc = allocate(block("172.16.0.0/16"), 6).unwrap();
        assert_eq!(alloc.child_prefix, 25);
        assert_eq!(alloc.blocks[3], block("172.16.1.128/25"));
    }

    #[test]
    fn test_allocate_rejects_unsupported_width() {
        for prefix in [8u8, 15, 25, 26, 28] {
            let err = allocate(block(&format!("10.0.0.0/{prefix}")), 6).unwrap_err();
            assert_eq!(
                err,
                SynthError::InvalidBlockError {
                    block: format!("10.0.0.0/{prefix}"),
                    prefix
                }
            );
        }
    }

    #[test]
    fn test_allocate_rejects_other_counts() {
        for n in [0usize, 3, 5, 7, 12] {
            assert_eq!(
                allocate(block("10.0.0.0/22"), n).unwrap_err(),
                SynthError::UnsupportedTopologyError {
                    requested: n,
                    supported: 6
                }
            );
        }
    }

    #[test]
    fn test_allocate_is_deterministic() {
        let a = allocate(block("10.20.0.0/21"), 6).unwrap();
        let b = allocate(block("10.20.0.0/21"), 6).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_tiers() {
        let alloc = allocate(block("10.0.0.0/24"), 6).unwrap();
        let (public, private) = split_tiers(&alloc.blocks);
        assert_eq!(public.len(), 3);
        assert_eq!(private.len(), 3);
        assert_eq!(private[0], block("10.0.0.24/29"));

        let (public, private) = split_tiers(&alloc.blocks[..2]);
        assert_eq!(public.len(), 2);
        assert!(private.is_empty());
    }
}
