// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declarable Resource Type Domain Model
//!
//! Defines the set of cloud resources a stack can declare. Each variant maps
//! to the provider type name used in the synthesized template.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource type taxonomy for the network stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    // Network Topology
    /// Virtual private cloud
    Vpc,
    /// Subnet inside a VPC
    Subnet,
    /// Route table attached to a subnet
    RouteTable,
    /// Binding of a subnet to a route table
    SubnetRouteTableAssociation,

    // Traffic Filtering
    /// Stateless subnet-level filter
    NetworkAcl,
    /// Binding of a subnet to a network ACL
    SubnetNetworkAclAssociation,
    /// Stateful instance-level filter
    SecurityGroup,
    /// Standalone ingress rule on a security group
    SecurityGroupIngress,

    // Database
    /// Database subnet group
    DbSubnetGroup,
}

impl ResourceType {
    /// Provider type name as it appears in the template
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vpc => "AWS::EC2::VPC",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::RouteTable => "AWS::EC2::RouteTable",
            Self::SubnetRouteTableAssociation => "AWS::EC2::SubnetRouteTableAssociation",
            Self::NetworkAcl => "AWS::EC2::NetworkAcl",
            Self::SubnetNetworkAclAssociation => "AWS::EC2::SubnetNetworkAclAssociation",
            Self::SecurityGroup => "AWS::EC2::SecurityGroup",
            Self::SecurityGroupIngress => "AWS::EC2::SecurityGroupIngress",
            Self::DbSubnetGroup => "AWS::RDS::DBSubnetGroup",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(ResourceType::Vpc.as_str(), "AWS::EC2::VPC");
        assert_eq!(ResourceType::DbSubnetGroup.to_string(), "AWS::RDS::DBSubnetGroup");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ResourceType::SubnetNetworkAclAssociation).unwrap();
        assert_eq!(json, "\"subnet_network_acl_association\"");
    }
}
