// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network ACL association
//!
//! Declares a fresh network ACL in the VPC and binds it to every selected
//! subnet. A subnet holds exactly one ACL association, so on an existing VPC
//! this replaces whatever ACL the subnets were using before.

use serde_json::json;
use tracing::warn;

use crate::construct::{reference, Stack};
use crate::domain::{LogicalId, ResourceType};
use crate::errors::{StackError, StackResult};
use crate::vpc::{SubnetSelection, VpcHandle, VpcOrigin};

/// Construct id of the declared ACL
pub const NETWORK_ACL_ID: &str = "RedshiftSubnetsAcl";

/// A declared ACL and the subnets bound to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAclAssociation {
    network_acl_id: LogicalId,
    association_ids: Vec<LogicalId>,
}

impl NetworkAclAssociation {
    pub fn network_acl_id(&self) -> &LogicalId {
        &self.network_acl_id
    }

    /// One association per bound subnet, in selection order
    pub fn association_ids(&self) -> &[LogicalId] {
        &self.association_ids
    }

    pub fn subnet_count(&self) -> usize {
        self.association_ids.len()
    }
}

/// Bind a new network ACL to the selected subnets of `vpc`
pub fn associate_network_acl(
    stack: &mut Stack,
    vpc: &VpcHandle,
    selection: &SubnetSelection,
) -> StackResult<NetworkAclAssociation> {
    if !vpc.is_usable_in(stack) {
        return Err(StackError::Configuration(format!(
            "VPC {} is not declared in stack '{}'",
            vpc.vpc_id(),
            stack.stack_id()
        )));
    }

    let selected = vpc.select_subnets(selection);
    if selected.is_empty() {
        return Err(StackError::InvalidValue(
            "network ACL selection matched no subnets".into(),
        ));
    }

    // Ids are derived from subnet ids with punctuation dropped, so distinct
    // subnets can map to one id; settle every id before declaring any.
    let network_acl_id = LogicalId::new(NETWORK_ACL_ID)?;
    let mut association_ids: Vec<LogicalId> = Vec::with_capacity(selected.len());
    for subnet in selected.subnets() {
        let association_id = network_acl_id
            .child("Association")
            .child(&subnet.construct_key());
        if association_ids.contains(&association_id) {
            return Err(StackError::InvalidValue(format!(
                "subnet '{}' maps to association id '{}' already used by another selected subnet",
                subnet.construct_key(),
                association_id
            )));
        }
        association_ids.push(association_id);
    }
    if let Some(taken) = std::iter::once(&network_acl_id)
        .chain(&association_ids)
        .find(|id| stack.contains(id))
    {
        return Err(StackError::DuplicateConstruct(taken.to_string()));
    }

    if vpc.origin() == VpcOrigin::Imported {
        warn!(
            vpc = %vpc.vpc_id(),
            subnets = selected.len(),
            "Associating subnets of an existing VPC with a new network ACL; existing associations are replaced"
        );
    } else {
        warn!(vpc = %vpc.vpc_id(), "Associating subnets in VPC with a network ACL");
    }

    stack.add_resource(
        network_acl_id.clone(),
        ResourceType::NetworkAcl,
        json!({
            "VpcId": vpc.vpc_id().to_template_value(),
            "Tags": stack.name_tags(NETWORK_ACL_ID),
        }),
    )?;

    for (subnet, association_id) in selected.subnets().iter().zip(&association_ids) {
        stack.add_resource(
            association_id.clone(),
            ResourceType::SubnetNetworkAclAssociation,
            json!({
                "NetworkAclId": reference(&network_acl_id),
                "SubnetId": subnet.subnet_id.to_template_value(),
            }),
        )?;
    }

    Ok(NetworkAclAssociation {
        network_acl_id,
        association_ids,
    })
}
