//! IPv4 CIDR blocks and the bit arithmetic used to carve them up.
//!
//! Provides [`NetworkBlock`] for representing an address range in CIDR
//! notation, along with helper functions for mask and boundary calculations.

use crate::error::{Result, SynthError};
use serde::de;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::OnceLock;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a network mask as u32.
///
/// # Examples
/// ```
/// use vpc_topology::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32> {
    if len > MAX_LENGTH {
        Err(SynthError::ConfigError(format!(
            "network length /{len} is too long"
        )))
    } else {
        Ok(mask_bits(len))
    }
}

// Caller guarantees len <= 32.
fn mask_bits(len: u8) -> u32 {
    let right_len = MAX_LENGTH - len.min(MAX_LENGTH);
    let all_bits = u32::MAX as u64;
    ((all_bits >> right_len) << right_len) as u32
}

/// Dotted quad, '/', then a plain decimal prefix length without sign or leading zero.
static CIDR_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_cidr_regex() -> &'static Regex {
    CIDR_REGEX.get_or_init(|| {
        Regex::new(r"^(\d{1,3}(?:\.\d{1,3}){3})/(0|[1-9][0-9]?)$").expect("Invalid Regex")
    })
}

/// Returns the first address following the block `addr/cidr`.
pub fn ip_after_subnet(addr: Ipv4Addr, cidr: u8) -> Result<Ipv4Addr> {
    let mask = get_cidr_mask(cidr)?;
    let subnet_size = 1u64 << (MAX_LENGTH - cidr);
    let network_bits = (u32::from(addr) & mask) as u64;
    let next_bits = network_bits + subnet_size;
    if next_bits > u32::MAX as u64 {
        return Err(SynthError::ConfigError(format!(
            "no address space left after {addr}/{cidr}"
        )));
    }
    Ok(Ipv4Addr::from(next_bits as u32))
}

/// An IPv4 address range in CIDR notation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetworkBlock {
    /// Base address of the range.
    pub addr: Ipv4Addr,
    /// Prefix length (0-32).
    pub mask: u8,
}

impl NetworkBlock {
    /// Parse a block from a CIDR string (e.g. "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<NetworkBlock> {
        let addr_cidr = addr_cidr.trim();
        let caps = get_cidr_regex()
            .captures(addr_cidr)
            .ok_or_else(|| SynthError::ConfigError(format!("invalid CIDR format: '{addr_cidr}'")))?;
        let addr: Ipv4Addr = caps[1]
            .parse()
            .map_err(|_| SynthError::ConfigError(format!("invalid IP address: '{}'", &caps[1])))?;
        let mask: u8 = caps[2]
            .parse()
            .map_err(|_| SynthError::ConfigError(format!("invalid prefix length: '{}'", &caps[2])))?;
        if mask > MAX_LENGTH {
            return Err(SynthError::ConfigError(format!(
                "network length /{mask} is too long"
            )));
        }
        Ok(NetworkBlock { addr, mask })
    }

    /// Lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & mask_bits(self.mask))
    }

    /// Highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        let mask = mask_bits(self.mask);
        Ipv4Addr::from((u32::from(self.addr) & mask) | !mask)
    }

    /// Number of addresses covered by the block.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.mask.min(MAX_LENGTH))
    }

    /// True when the base address carries no host bits.
    pub fn is_network_address(&self) -> bool {
        self.addr == self.lo()
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.lo() <= ip && ip <= self.hi()
    }

    pub fn contains_block(&self, other: &NetworkBlock) -> bool {
        self.contains(other.lo()) && self.contains(other.hi())
    }

    pub fn overlaps(&self, other: &NetworkBlock) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }

    /// The block directly after this one.
    ///
    /// If `mask` is provided the next block uses that prefix length; a longer
    /// prefix starts after this block's broadcast address.
    pub fn next(&self, mask: Option<u8>) -> Result<NetworkBlock> {
        let new_mask = mask.unwrap_or(self.mask);
        let addr = if new_mask <= self.mask {
            ip_after_subnet(self.addr, new_mask)?
        } else {
            ip_after_subnet(self.hi(), new_mask)?
        };
        Ok(NetworkBlock {
            addr,
            mask: new_mask,
        })
    }
}

impl FromStr for NetworkBlock {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        NetworkBlock::new(s)
    }
}

impl std::fmt::Display for NetworkBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

impl Serialize for NetworkBlock {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NetworkBlock {
    fn deserialize<D>(deserializer: D) -> std::result::Result<NetworkBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NetworkBlock::new(&s).map_err(de::Error::custom)
    }
}
