// Copyright (c) 2025 - Cowboy AI, Inc.
//! Create strategy: declare a new VPC with one isolated subnet per zone

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{ResourceIdentifier, Subnet, SubnetType, VpcHandle, VpcOrigin};
use crate::construct::{reference, Stack};
use crate::domain::{CidrBlock, LogicalId, ResourceType, SubnetMask};
use crate::errors::{StackError, StackResult};

/// Construct id of the declared VPC
pub const CREATED_VPC_ID: &str = "RedshiftVpc";

/// Zone floor for the data warehouse subnet group
pub const MIN_AVAILABILITY_ZONES: u32 = 3;

/// Default zone count
pub const DEFAULT_MAX_AZS: u32 = 3;

/// Inputs of the create strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConfig {
    pub cidr_block: String,
    pub cidr_mask: u8,
    #[serde(default = "default_max_azs")]
    pub max_azs: u32,
}

fn default_max_azs() -> u32 {
    DEFAULT_MAX_AZS
}

impl CreateConfig {
    pub fn new(cidr_block: impl Into<String>, cidr_mask: u8) -> Self {
        Self {
            cidr_block: cidr_block.into(),
            cidr_mask,
            max_azs: DEFAULT_MAX_AZS,
        }
    }

    pub fn with_max_azs(mut self, max_azs: u32) -> Self {
        self.max_azs = max_azs;
        self
    }
}

/// Subnet group name for the `index`-th zone
pub fn subnet_name(index: usize) -> String {
    format!("private{}", index)
}

/// Declare a VPC with `max_azs` private isolated subnets
///
/// # Invariants
/// - `max_azs` ≥ 3
/// - VPC block prefix /16-/28, subnet mask /16-/28 and not wider than the block
/// - The block holds `max_azs` subnets of the mask
/// - A resolved zone list offers at least `max_azs` zones
///
/// All inputs are checked before anything is declared.
pub fn create_vpc(stack: &mut Stack, config: &CreateConfig) -> StackResult<VpcHandle> {
    if config.max_azs < MIN_AVAILABILITY_ZONES {
        return Err(StackError::InvalidValue(format!(
            "Max AZs must be greater than or equal to {} (regional redundancy for the data warehouse); got {}",
            MIN_AVAILABILITY_ZONES, config.max_azs
        )));
    }

    let block = CidrBlock::for_vpc(&config.cidr_block)?;
    let mask = SubnetMask::new(config.cidr_mask)?;
    let zone_count = config.max_azs as usize;
    let subnet_blocks = block.carve(mask, zone_count)?;

    let zones = stack.context().availability_zones();
    if let Some(available) = zones.resolved_len() {
        if available < zone_count {
            return Err(StackError::InvalidValue(format!(
                "Region offers {} availability zones; {} required",
                available, zone_count
            )));
        }
    }

    let vpc_id = LogicalId::new(CREATED_VPC_ID)?;
    stack.add_resource(
        vpc_id.clone(),
        ResourceType::Vpc,
        json!({
            "CidrBlock": block.to_string(),
            "EnableDnsHostnames": true,
            "EnableDnsSupport": true,
            "InstanceTenancy": "default",
            "Tags": stack.name_tags(CREATED_VPC_ID),
        }),
    )?;

    let mut subnets = Vec::with_capacity(zone_count);
    for (index, (subnet_block, zone)) in subnet_blocks
        .into_iter()
        .zip(zones.take(zone_count))
        .enumerate()
    {
        let name = subnet_name(index);
        let path = format!("{}/{}", CREATED_VPC_ID, name);
        let subnet_id = vpc_id.child(&name).child("Subnet");
        let route_table_id = vpc_id.child(&name).child("RouteTable");

        let mut tags = stack.name_tags(&path);
        if let Some(tags) = tags.as_array_mut() {
            tags.push(json!({ "Key": "subnet-name", "Value": name }));
            tags.push(json!({ "Key": "subnet-type", "Value": SubnetType::PrivateIsolated.to_string() }));
        }

        stack.add_resource(
            subnet_id.clone(),
            ResourceType::Subnet,
            json!({
                "VpcId": reference(&vpc_id),
                "AvailabilityZone": zone.to_template_value(),
                "CidrBlock": subnet_block.to_string(),
                "MapPublicIpOnLaunch": false,
                "Tags": tags,
            }),
        )?;
        stack.add_resource(
            route_table_id.clone(),
            ResourceType::RouteTable,
            json!({
                "VpcId": reference(&vpc_id),
                "Tags": stack.name_tags(&path),
            }),
        )?;
        stack.add_resource(
            vpc_id.child(&name).child("RouteTableAssociation"),
            ResourceType::SubnetRouteTableAssociation,
            json!({
                "RouteTableId": reference(&route_table_id),
                "SubnetId": reference(&subnet_id),
            }),
        )?;

        subnets.push(Subnet {
            subnet_id: ResourceIdentifier::Declared(subnet_id),
            group_name: name,
            subnet_type: SubnetType::PrivateIsolated,
            availability_zone: zone,
            cidr_block: Some(subnet_block),
            route_table_id: Some(ResourceIdentifier::Declared(route_table_id)),
        });
    }

    info!(
        stack = %stack.stack_id(),
        cidr = %block,
        subnets = subnets.len(),
        "Declared VPC"
    );

    Ok(VpcHandle::new(
        ResourceIdentifier::Declared(vpc_id),
        VpcOrigin::Created,
        zones,
    )
    .declared_in(stack)
    .with_cidr_block(Some(block))
    .with_dns(true, true)
    .with_subnets(subnets))
}
