// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("CIDR block {0} has host bits set")]
    HostBitsSet(String),

    #[error("VPC CIDR prefix /{0} is out of range (must be /16-/28)")]
    VpcPrefixOutOfRange(u8),

    #[error("Invalid subnet mask: /{0} (must be /16-/28)")]
    InvalidSubnetMask(u8),

    #[error("Subnet mask /{mask} is larger than the /{prefix} block it is carved from")]
    MaskWiderThanBlock { mask: u8, prefix: u8 },

    #[error("CIDR block {block} cannot hold {requested} subnets of size /{mask}")]
    InsufficientAddressSpace {
        block: String,
        mask: u8,
        requested: usize,
    },
}

/// IPv4 CIDR block value object
///
/// Invariants:
/// - Valid IPv4 network address
/// - Prefix length 0-32
/// - No host bits set below the prefix
///
/// # Examples
///
/// ```rust
/// use infra_etl_network::domain::CidrBlock;
///
/// let block = CidrBlock::new("10.0.0.0/16").unwrap();
/// assert_eq!(block.prefix_length(), 16);
/// assert_eq!(block.to_string(), "10.0.0.0/16");
///
/// assert!(CidrBlock::new("10.0.0.1/16").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CidrBlock(Ipv4Net);

impl CidrBlock {
    /// Smallest prefix a VPC may use
    pub const VPC_MIN_PREFIX: u8 = 16;

    /// Largest prefix a VPC may use
    pub const VPC_MAX_PREFIX: u8 = 28;

    /// Parse `a.b.c.d/n` notation
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let network = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        Self::from_parts(network, prefix_length)
    }

    /// Create from an address and prefix length
    pub fn from_parts(network: Ipv4Addr, prefix_length: u8) -> Result<Self, NetworkError> {
        let net = Ipv4Net::new(network, prefix_length)
            .map_err(|_| NetworkError::InvalidPrefixLength(prefix_length))?;

        if net.trunc() != net {
            return Err(NetworkError::HostBitsSet(net.to_string()));
        }

        Ok(Self(net))
    }

    /// Parse a block suitable for a VPC (prefix /16 to /28)
    pub fn for_vpc(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let block = Self::new(cidr)?;
        if !(Self::VPC_MIN_PREFIX..=Self::VPC_MAX_PREFIX).contains(&block.prefix_length()) {
            return Err(NetworkError::VpcPrefixOutOfRange(block.prefix_length()));
        }
        Ok(block)
    }

    /// `0.0.0.0/0`
    pub fn any_ipv4() -> Self {
        Self(Ipv4Net::default())
    }

    /// Network address
    pub fn network(&self) -> Ipv4Addr {
        self.0.network()
    }

    /// Prefix length
    pub fn prefix_length(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Whether `other` lies entirely inside this block
    pub fn contains(&self, other: &CidrBlock) -> bool {
        self.0.contains(&other.0)
    }

    /// Whether the two blocks share any address
    pub fn overlaps(&self, other: &CidrBlock) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// How many `/mask` subnets fit in this block
    pub fn capacity(&self, mask: SubnetMask) -> Result<u64, NetworkError> {
        if mask.value() < self.prefix_length() {
            return Err(NetworkError::MaskWiderThanBlock {
                mask: mask.value(),
                prefix: self.prefix_length(),
            });
        }
        Ok(1u64 << u32::from(mask.value() - self.prefix_length()))
    }

    /// Carve the first `count` consecutive `/mask` subnets out of this block
    pub fn carve(&self, mask: SubnetMask, count: usize) -> Result<Vec<CidrBlock>, NetworkError> {
        let capacity = self.capacity(mask)?;
        if count as u64 > capacity {
            return Err(NetworkError::InsufficientAddressSpace {
                block: self.to_string(),
                mask: mask.value(),
                requested: count,
            });
        }

        let subnets = self
            .0
            .subnets(mask.value())
            .map_err(|_| NetworkError::InvalidSubnetMask(mask.value()))?;

        Ok(subnets.take(count).map(Self).collect())
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CidrBlock {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CidrBlock {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CidrBlock> for String {
    fn from(block: CidrBlock) -> Self {
        block.to_string()
    }
}

/// Subnet mask value object
///
/// Invariants:
/// - Prefix length /16 to /28, the range subnets may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubnetMask(u8);

impl SubnetMask {
    /// Minimum subnet prefix
    pub const MIN: u8 = 16;

    /// Maximum subnet prefix
    pub const MAX: u8 = 28;

    pub fn new(mask: u8) -> Result<Self, NetworkError> {
        if !(Self::MIN..=Self::MAX).contains(&mask) {
            return Err(NetworkError::InvalidSubnetMask(mask));
        }
        Ok(Self(mask))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SubnetMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl TryFrom<u8> for SubnetMask {
    type Error = NetworkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
