// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC Acquisition Policy
//!
//! Decides how the stack obtains its VPC and derives the network posture
//! from the result.
//!
//! ```text
//! StackProps ──validate──▶ AcquisitionConfig ──┬─ Create ─▶ create_vpc ─┐
//!                                             └─ Link   ─▶ link_vpc   ─┤
//!                                                                      ▼
//!                                       VpcHandle ──▶ (optional) network ACL
//! ```

use tracing::{info, warn};

use crate::acl::{associate_network_acl, NetworkAclAssociation};
use crate::construct::Stack;
use crate::errors::{StackError, StackResult};
use crate::vpc::{create_vpc, link_vpc, CreateConfig, LinkConfig, SubnetSelection, VpcHandle};

/// How to obtain the VPC
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionConfig {
    /// Declare a new VPC
    Create(CreateConfig),
    /// Reference an existing VPC
    Link(LinkConfig),
}

impl AcquisitionConfig {
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Link(_) => "link",
        }
    }
}

impl From<CreateConfig> for AcquisitionConfig {
    fn from(config: CreateConfig) -> Self {
        Self::Create(config)
    }
}

impl From<LinkConfig> for AcquisitionConfig {
    fn from(config: LinkConfig) -> Self {
        Self::Link(config)
    }
}

/// Outcome of [`VpcAcquisitionPolicy::resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub vpc: VpcHandle,
    pub network_acl: Option<NetworkAclAssociation>,
}

impl Acquisition {
    pub fn into_vpc(self) -> VpcHandle {
        self.vpc
    }
}

/// Policy for obtaining a VPC
///
/// By default every subnet of the resolved VPC is bound to a fresh network
/// ACL. On a linked VPC this replaces the ACL its subnets used before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VpcAcquisitionPolicy {
    associate_network_acl: bool,
}

impl Default for VpcAcquisitionPolicy {
    fn default() -> Self {
        Self {
            associate_network_acl: true,
        }
    }
}

impl VpcAcquisitionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network_acl(mut self, associate: bool) -> Self {
        self.associate_network_acl = associate;
        self
    }

    pub fn associates_network_acl(&self) -> bool {
        self.associate_network_acl
    }

    /// Obtain a VPC into `stack` and apply the network posture
    pub fn resolve(&self, stack: &mut Stack, config: AcquisitionConfig) -> StackResult<Acquisition> {
        info!(
            stack = %stack.stack_id(),
            strategy = config.strategy_name(),
            "Resolving VPC"
        );

        let vpc = match config {
            AcquisitionConfig::Create(create) => create_vpc(stack, &create)?,
            AcquisitionConfig::Link(link) => link_vpc(stack, link)?,
        };

        let network_acl = if self.associate_network_acl {
            Some(associate_network_acl(stack, &vpc, &SubnetSelection::all())?)
        } else {
            None
        };

        Ok(Acquisition { vpc, network_acl })
    }
}

/// Pick the acquisition strategy from optional inputs
///
/// First match wins: a CIDR with a mask creates, otherwise a VPC reference
/// links, otherwise the inputs are unusable.
pub fn select_strategy(
    cidr: Option<&str>,
    cidr_mask: Option<u8>,
    max_azs: u32,
    link: Option<LinkConfig>,
) -> StackResult<AcquisitionConfig> {
    match (cidr, cidr_mask, link) {
        (Some(cidr), Some(cidr_mask), link) => {
            if link.is_some() {
                warn!("Both cidr/cidr_mask and a VPC reference were given; the reference is ignored");
            }
            Ok(AcquisitionConfig::Create(
                CreateConfig::new(cidr, cidr_mask).with_max_azs(max_azs),
            ))
        }
        (_, _, Some(link)) => Ok(AcquisitionConfig::Link(link)),
        _ => Err(StackError::Configuration(
            "either cidr/cidrMask or vpcReference must be provided".into(),
        )),
    }
}
