// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC Handles
//!
//! A [`VpcHandle`] is the in-memory view of a VPC the stack either declared
//! itself ([`create`]) or references by id ([`link`]). Downstream
//! constructs only ever talk to the handle: they select subnets from it and
//! reference its identifier.

pub mod create;
pub mod link;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::construct::{reference, Stack};
use crate::domain::{AvailabilityZone, AvailabilityZones, CidrBlock, LogicalId};

pub use create::{create_vpc, CreateConfig};
pub use link::{link_vpc, LinkConfig, LinkOptions, VpcReference};

/// Identifier of a resource as it appears in the template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceIdentifier {
    /// Declared in this stack, resolved by reference
    Declared(LogicalId),
    /// Existing resource known by its literal id
    Literal(String),
}

impl ResourceIdentifier {
    pub fn to_template_value(&self) -> Value {
        match self {
            Self::Declared(id) => reference(id),
            Self::Literal(id) => Value::String(id.clone()),
        }
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared(id) => write!(f, "ref:{}", id),
            Self::Literal(id) => write!(f, "{}", id),
        }
    }
}

/// Subnet isolation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetType {
    /// No route out of the VPC
    PrivateIsolated,
    /// Outbound through a NAT
    PrivateWithEgress,
    /// Routed through an internet gateway
    Public,
}

impl SubnetType {
    /// Default group name for subnets of this type
    pub fn default_group_name(&self) -> &'static str {
        match self {
            Self::PrivateIsolated => "Isolated",
            Self::PrivateWithEgress => "Private",
            Self::Public => "Public",
        }
    }
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default_group_name())
    }
}

/// A subnet reachable from a [`VpcHandle`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub subnet_id: ResourceIdentifier,
    pub group_name: String,
    pub subnet_type: SubnetType,
    pub availability_zone: AvailabilityZone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_block: Option<CidrBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_table_id: Option<ResourceIdentifier>,
}

impl Subnet {
    /// Logical id when the subnet was declared in this stack
    pub fn logical_id(&self) -> Option<&LogicalId> {
        match &self.subnet_id {
            ResourceIdentifier::Declared(id) => Some(id),
            ResourceIdentifier::Literal(_) => None,
        }
    }

    /// Stable name used to derive ids of constructs attached to this subnet
    pub fn construct_key(&self) -> String {
        match &self.subnet_id {
            ResourceIdentifier::Declared(id) => id.to_string(),
            ResourceIdentifier::Literal(id) => id.clone(),
        }
    }
}

/// Filter over the subnets of a VPC
///
/// The default selection matches every subnet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubnetSelection {
    subnet_type: Option<SubnetType>,
    group_names: Option<Vec<String>>,
    one_per_az: bool,
}

impl SubnetSelection {
    /// Every subnet
    pub fn all() -> Self {
        Self::default()
    }

    /// Subnets of one isolation type
    pub fn of_type(subnet_type: SubnetType) -> Self {
        Self {
            subnet_type: Some(subnet_type),
            ..Self::default()
        }
    }

    /// Restrict to the named subnet groups
    pub fn with_group_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Keep only the first matching subnet in each zone
    pub fn one_per_az(mut self) -> Self {
        self.one_per_az = true;
        self
    }

    fn matches(&self, subnet: &Subnet) -> bool {
        let type_matches = self
            .subnet_type
            .map_or(true, |subnet_type| subnet.subnet_type == subnet_type);
        let group_matches = self
            .group_names
            .as_ref()
            .map_or(true, |names| names.iter().any(|n| *n == subnet.group_name));
        type_matches && group_matches
    }
}

/// Result of applying a [`SubnetSelection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSubnets {
    subnets: Vec<Subnet>,
}

impl SelectedSubnets {
    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }

    /// Template values of the selected subnet ids
    pub fn subnet_ids(&self) -> Vec<Value> {
        self.subnets
            .iter()
            .map(|s| s.subnet_id.to_template_value())
            .collect()
    }

    /// Distinct zones covered by the selection
    pub fn availability_zones(&self) -> Vec<&AvailabilityZone> {
        let mut zones: Vec<&AvailabilityZone> = Vec::new();
        for subnet in &self.subnets {
            if !zones.contains(&&subnet.availability_zone) {
                zones.push(&subnet.availability_zone);
            }
        }
        zones
    }
}

/// How the handle came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VpcOrigin {
    /// Declared by this stack
    Created,
    /// Existing VPC referenced by id
    Imported,
}

/// Stack whose template declares a handle's resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaringStack {
    pub node_id: Uuid,
    pub stack_id: String,
}

/// Opaque view of a declared or referenced VPC
///
/// Equality is structural: two handles built from identical inputs compare
/// equal even though each has its own [`node_id`](Self::node_id) and may
/// belong to a different stack.
#[derive(Debug, Clone, Serialize)]
pub struct VpcHandle {
    node_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    declared_in: Option<DeclaringStack>,
    vpc_id: ResourceIdentifier,
    origin: VpcOrigin,
    cidr_block: Option<CidrBlock>,
    availability_zones: AvailabilityZones,
    dns_hostnames_enabled: bool,
    dns_support_enabled: bool,
    subnets: Vec<Subnet>,
    attributes: LinkOptions,
}

impl VpcHandle {
    pub(crate) fn new(
        vpc_id: ResourceIdentifier,
        origin: VpcOrigin,
        availability_zones: AvailabilityZones,
    ) -> Self {
        Self {
            node_id: Uuid::now_v7(),
            declared_in: None,
            vpc_id,
            origin,
            cidr_block: None,
            availability_zones,
            dns_hostnames_enabled: false,
            dns_support_enabled: false,
            subnets: Vec::new(),
            attributes: LinkOptions::new(),
        }
    }

    pub(crate) fn declared_in(mut self, stack: &Stack) -> Self {
        self.declared_in = Some(DeclaringStack {
            node_id: stack.node_id(),
            stack_id: stack.stack_id().to_string(),
        });
        self
    }

    pub(crate) fn with_cidr_block(mut self, cidr_block: Option<CidrBlock>) -> Self {
        self.cidr_block = cidr_block;
        self
    }

    pub(crate) fn with_dns(mut self, hostnames: bool, support: bool) -> Self {
        self.dns_hostnames_enabled = hostnames;
        self.dns_support_enabled = support;
        self
    }

    pub(crate) fn with_subnets(mut self, subnets: Vec<Subnet>) -> Self {
        self.subnets = subnets;
        self
    }

    pub(crate) fn with_attributes(mut self, attributes: LinkOptions) -> Self {
        self.attributes = attributes;
        self
    }

    /// Identity of this handle instance
    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    /// Stack holding the resources this handle references, if any
    ///
    /// Imported handles carry only literal ids and belong to no stack.
    pub fn declaring_stack(&self) -> Option<&DeclaringStack> {
        self.declared_in.as_ref()
    }

    /// Whether the handle's resources can be referenced from `stack`
    pub fn is_usable_in(&self, stack: &Stack) -> bool {
        self.declared_in
            .as_ref()
            .map_or(true, |owner| owner.node_id == stack.node_id())
    }

    pub fn vpc_id(&self) -> &ResourceIdentifier {
        &self.vpc_id
    }

    pub fn origin(&self) -> VpcOrigin {
        self.origin
    }

    pub fn cidr_block(&self) -> Option<CidrBlock> {
        self.cidr_block
    }

    pub fn availability_zones(&self) -> &AvailabilityZones {
        &self.availability_zones
    }

    pub fn dns_hostnames_enabled(&self) -> bool {
        self.dns_hostnames_enabled
    }

    pub fn dns_support_enabled(&self) -> bool {
        self.dns_support_enabled
    }

    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    /// Options the handle was linked with, as supplied
    pub fn attributes(&self) -> &LinkOptions {
        &self.attributes
    }

    /// Apply a selection to the subnets of this VPC
    pub fn select_subnets(&self, selection: &SubnetSelection) -> SelectedSubnets {
        let mut subnets: Vec<Subnet> = Vec::new();
        for subnet in self.subnets.iter().filter(|s| selection.matches(s)) {
            if selection.one_per_az
                && subnets
                    .iter()
                    .any(|kept| kept.availability_zone == subnet.availability_zone)
            {
                continue;
            }
            subnets.push(subnet.clone());
        }

        SelectedSubnets { subnets }
    }

    /// Whether both handles are the same construct instance
    pub fn is_same_instance(&self, other: &VpcHandle) -> bool {
        self.node_id == other.node_id
    }
}

impl PartialEq for VpcHandle {
    fn eq(&self, other: &Self) -> bool {
        self.vpc_id == other.vpc_id
            && self.origin == other.origin
            && self.cidr_block == other.cidr_block
            && self.availability_zones == other.availability_zones
            && self.dns_hostnames_enabled == other.dns_hostnames_enabled
            && self.dns_support_enabled == other.dns_support_enabled
            && self.subnets == other.subnets
            && self.attributes == other.attributes
    }
}

impl Eq for VpcHandle {}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(id: &str, group: &str, subnet_type: SubnetType, zone: &str) -> Subnet {
        Subnet {
            subnet_id: ResourceIdentifier::Literal(id.into()),
            group_name: group.into(),
            subnet_type,
            availability_zone: AvailabilityZone::Named(zone.into()),
            cidr_block: None,
            route_table_id: None,
        }
    }

    fn sample_handle() -> VpcHandle {
        VpcHandle::new(
            ResourceIdentifier::Literal("vpc-1".into()),
            VpcOrigin::Imported,
            AvailabilityZones::Resolved(vec!["a".into(), "b".into()]),
        )
        .with_subnets(vec![
            subnet("subnet-1", "Isolated", SubnetType::PrivateIsolated, "a"),
            subnet("subnet-2", "Isolated", SubnetType::PrivateIsolated, "b"),
            subnet("subnet-3", "db", SubnetType::PrivateIsolated, "a"),
            subnet("subnet-4", "Public", SubnetType::Public, "a"),
        ])
    }

    #[test]
    fn test_default_selection_matches_everything() {
        let handle = sample_handle();
        assert_eq!(handle.select_subnets(&SubnetSelection::all()).len(), 4);
    }

    #[test]
    fn test_selection_filters() {
        let handle = sample_handle();
        let isolated = handle.select_subnets(&SubnetSelection::of_type(SubnetType::PrivateIsolated));
        assert_eq!(isolated.len(), 3);

        let db = handle.select_subnets(&SubnetSelection::all().with_group_names(["db"]));
        assert_eq!(db.subnet_ids(), vec![Value::String("subnet-3".into())]);

        let spread = handle.select_subnets(
            &SubnetSelection::of_type(SubnetType::PrivateIsolated).one_per_az(),
        );
        assert_eq!(spread.len(), 2);
        assert_eq!(spread.availability_zones().len(), 2);
    }

    #[test]
    fn test_structural_equality_ignores_node_id() {
        let first = sample_handle();
        let second = sample_handle();
        assert_eq!(first, second);
        assert!(!first.is_same_instance(&second));
        assert!(first.is_same_instance(&first.clone()));
    }

    #[test]
    fn test_usable_in_declaring_stack_only() {
        use crate::context::DeploymentContext;

        let home = Stack::new("home", DeploymentContext::agnostic()).unwrap();
        let away = Stack::new("away", DeploymentContext::agnostic()).unwrap();

        let imported = sample_handle();
        assert!(imported.declaring_stack().is_none());
        assert!(imported.is_usable_in(&away));

        let declared = sample_handle().declared_in(&home);
        assert_eq!(declared.declaring_stack().map(|s| s.stack_id.as_str()), Some("home"));
        assert!(declared.is_usable_in(&home));
        assert!(!declared.is_usable_in(&away));
    }

    #[test]
    fn test_identifier_rendering() {
        let declared = ResourceIdentifier::Declared(LogicalId::new("RedshiftVpc").unwrap());
        assert_eq!(declared.to_template_value(), serde_json::json!({ "Ref": "RedshiftVpc" }));
        let literal = ResourceIdentifier::Literal("vpc-abc123".into());
        assert_eq!(literal.to_template_value(), Value::String("vpc-abc123".into()));
    }
}
