//! Network infrastructure for the ETL data-warehouse stack
//!
//! This crate declares the VPC the warehouse runs in: it either creates a
//! new VPC with isolated subnets across three or more availability zones or
//! links to an existing one, binds the subnets to a network ACL, and can add
//! the database subnet and security groups. Declarations are collected in a
//! [`construct::Stack`] and rendered with [`construct::Template`]; nothing
//! talks to a cloud API.

pub mod acl;
pub mod config;
pub mod construct;
pub mod context;
pub mod database;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod policy;
pub mod security_group;
pub mod stack;
pub mod vpc;

// Re-export commonly used types
pub use construct::{Stack, Template};
pub use context::DeploymentContext;
pub use errors::{StackError, StackResult};
pub use policy::{Acquisition, AcquisitionConfig, VpcAcquisitionPolicy};
pub use stack::{NetworkStack, StackProps};
pub use vpc::{CreateConfig, LinkConfig, LinkOptions, VpcHandle, VpcReference};
