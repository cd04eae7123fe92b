// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Domain Models
//!
//! Value objects with validation invariants used when declaring a VPC and
//! the resources that hang off it.
//!
//! # Value Objects with Invariants
//!
//! - [`CidrBlock`] - IPv4 network in CIDR notation, no host bits set
//! - [`SubnetMask`] - Subnet prefix length (/16-/28)
//! - [`LogicalId`] - Template-unique resource name
//! - [`AvailabilityZone`] / [`AvailabilityZones`] - Named or deploy-time zones
//! - [`ResourceType`] - Declarable resource taxonomy

pub mod availability_zone;
pub mod logical_id;
pub mod network;
pub mod resource_type;

// Re-export value objects
pub use availability_zone::{AvailabilityZone, AvailabilityZones};
pub use logical_id::{LogicalId, LogicalIdError};
pub use network::{CidrBlock, NetworkError, SubnetMask};
pub use resource_type::ResourceType;
