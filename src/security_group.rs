// Copyright (c) 2025 - Cowboy AI, Inc.
//! Security groups and ingress rules

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

use crate::construct::{get_att, Stack};
use crate::domain::{CidrBlock, LogicalId, ResourceType};
use crate::errors::{StackError, StackResult};
use crate::vpc::VpcHandle;

/// IP protocol of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Tcp,
    Icmp,
    /// Every protocol
    All,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Icmp => "icmp",
            Self::All => "-1",
        }
    }
}

/// Protocol and port range a rule opens
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    protocol: Protocol,
    from_port: u16,
    to_port: u16,
    label: String,
}

impl Port {
    /// A single TCP port
    pub fn tcp(port: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            from_port: port,
            to_port: port,
            label: format!("tcp{}", port),
        }
    }

    /// Every TCP port
    pub fn all_tcp() -> Self {
        Self {
            protocol: Protocol::Tcp,
            from_port: 0,
            to_port: u16::MAX,
            label: "ALL PORTS".to_string(),
        }
    }

    /// Replace the display label
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn from_port(&self) -> u16 {
        self.from_port
    }

    pub fn to_port(&self) -> u16 {
        self.to_port
    }

    fn to_rule_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("IpProtocol".into(), json!(self.protocol.as_str()));
        fields.insert("FromPort".into(), json!(self.from_port));
        fields.insert("ToPort".into(), json!(self.to_port));
        fields
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Source of inbound traffic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Peer {
    /// An IPv4 range
    Ipv4(CidrBlock),
    /// A security group declared in this stack
    SecurityGroup(LogicalId),
    /// An existing security group, by id
    ExistingSecurityGroup(String),
}

impl Peer {
    /// Every IPv4 address
    pub fn any_ipv4() -> Self {
        Self::Ipv4(CidrBlock::any_ipv4())
    }

    fn to_source_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            Self::Ipv4(block) => {
                fields.insert("CidrIp".into(), json!(block.to_string()));
            }
            Self::SecurityGroup(id) => {
                fields.insert("SourceSecurityGroupId".into(), get_att(id, "GroupId"));
            }
            Self::ExistingSecurityGroup(id) => {
                fields.insert("SourceSecurityGroupId".into(), json!(id));
            }
        }
        fields
    }

    fn construct_key(&self) -> String {
        match self {
            Self::Ipv4(block) => block.to_string(),
            Self::SecurityGroup(id) => id.to_string(),
            Self::ExistingSecurityGroup(id) => id.clone(),
        }
    }
}

/// One inbound rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngressRule {
    pub peer: Peer,
    pub port: Port,
    pub description: String,
}

impl IngressRule {
    fn to_template_value(&self) -> Value {
        let mut rule = self.peer.to_source_fields();
        rule.extend(self.port.to_rule_fields());
        rule.insert("Description".into(), json!(self.description));
        Value::Object(rule)
    }
}

/// Security group under construction
///
/// Rules are collected first and the group is declared once with
/// [`SecurityGroup::declare`].
#[derive(Debug, Clone)]
pub struct SecurityGroup {
    logical_id: LogicalId,
    vpc_id: Value,
    description: String,
    group_name: Option<String>,
    allow_all_outbound: bool,
    ingress_rules: Vec<IngressRule>,
}

impl SecurityGroup {
    /// Maximum description length
    pub const MAX_DESCRIPTION_LENGTH: usize = 255;

    pub fn new(
        logical_id: LogicalId,
        vpc: &VpcHandle,
        description: impl Into<String>,
    ) -> StackResult<Self> {
        let description = description.into();
        if description.is_empty() || description.len() > Self::MAX_DESCRIPTION_LENGTH {
            return Err(StackError::InvalidValue(format!(
                "security group description must be 1-{} characters",
                Self::MAX_DESCRIPTION_LENGTH
            )));
        }

        Ok(Self {
            logical_id,
            vpc_id: vpc.vpc_id().to_template_value(),
            description,
            group_name: None,
            allow_all_outbound: true,
            ingress_rules: Vec::new(),
        })
    }

    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    pub fn allow_all_outbound(mut self, allow: bool) -> Self {
        self.allow_all_outbound = allow;
        self
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    /// Peer that designates this group itself
    pub fn as_peer(&self) -> Peer {
        Peer::SecurityGroup(self.logical_id.clone())
    }

    /// Add an inbound rule; identical rules are kept once
    pub fn add_ingress_rule(&mut self, peer: Peer, port: Port, description: impl Into<String>) {
        let rule = IngressRule {
            peer,
            port,
            description: description.into(),
        };
        if !self.ingress_rules.contains(&rule) {
            self.ingress_rules.push(rule);
        }
    }

    pub fn ingress_rules(&self) -> &[IngressRule] {
        &self.ingress_rules
    }

    fn is_self_reference(&self, rule: &IngressRule) -> bool {
        matches!(&rule.peer, Peer::SecurityGroup(id) if *id == self.logical_id)
    }

    /// Declare the group and its rules
    ///
    /// Rules whose peer is the group itself become standalone ingress
    /// resources; inline they would make the group depend on itself.
    pub fn declare(self, stack: &mut Stack) -> StackResult<DeclaredSecurityGroup> {
        let (self_rules, inline_rules): (Vec<&IngressRule>, Vec<&IngressRule>) = self
            .ingress_rules
            .iter()
            .partition(|rule| self.is_self_reference(rule));

        let egress = if self.allow_all_outbound {
            json!([{
                "CidrIp": CidrBlock::any_ipv4().to_string(),
                "IpProtocol": Protocol::All.as_str(),
                "Description": "Allow all outbound traffic by default",
            }])
        } else {
            json!([{
                "CidrIp": "255.255.255.255/32",
                "IpProtocol": Protocol::Icmp.as_str(),
                "FromPort": 252,
                "ToPort": 86,
                "Description": "Disallow all traffic",
            }])
        };

        let mut properties = Map::new();
        properties.insert("GroupDescription".into(), json!(self.description));
        if let Some(group_name) = &self.group_name {
            properties.insert("GroupName".into(), json!(group_name));
        }
        properties.insert("VpcId".into(), self.vpc_id.clone());
        properties.insert("SecurityGroupEgress".into(), egress);
        if !inline_rules.is_empty() {
            properties.insert(
                "SecurityGroupIngress".into(),
                Value::Array(inline_rules.iter().map(|r| r.to_template_value()).collect()),
            );
        }

        stack.add_resource(
            self.logical_id.clone(),
            ResourceType::SecurityGroup,
            Value::Object(properties),
        )?;

        let mut standalone_ingress_ids = Vec::with_capacity(self_rules.len());
        for rule in self_rules {
            let id = self
                .logical_id
                .child("from")
                .child(&rule.peer.construct_key())
                .child(&rule.port.to_string());
            let mut body = match rule.to_template_value() {
                Value::Object(body) => body,
                _ => Map::new(),
            };
            body.insert("GroupId".into(), get_att(&self.logical_id, "GroupId"));
            stack.add_resource(id.clone(), ResourceType::SecurityGroupIngress, Value::Object(body))?;
            standalone_ingress_ids.push(id);
        }

        Ok(DeclaredSecurityGroup {
            logical_id: self.logical_id.clone(),
            ingress_rules: self.ingress_rules.clone(),
            standalone_ingress_ids,
        })
    }
}

/// A security group that has been added to a stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredSecurityGroup {
    logical_id: LogicalId,
    ingress_rules: Vec<IngressRule>,
    standalone_ingress_ids: Vec<LogicalId>,
}

impl DeclaredSecurityGroup {
    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn ingress_rules(&self) -> &[IngressRule] {
        &self.ingress_rules
    }

    pub fn standalone_ingress_ids(&self) -> &[LogicalId] {
        &self.standalone_ingress_ids
    }

    /// Template value of the group id
    pub fn group_id(&self) -> Value {
        get_att(&self.logical_id, "GroupId")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DeploymentContext;
    use crate::vpc::{create_vpc, CreateConfig};

    fn stack_with_vpc() -> (Stack, VpcHandle) {
        let mut stack = Stack::new("net", DeploymentContext::agnostic()).unwrap();
        let vpc = create_vpc(&mut stack, &CreateConfig::new("10.0.0.0/16", 24)).unwrap();
        (stack, vpc)
    }

    #[test]
    fn test_port_shapes() {
        let port = Port::tcp(5432);
        assert_eq!(port.to_string(), "tcp5432");
        assert_eq!((port.from_port(), port.to_port()), (5432, 5432));
        assert_eq!(Port::all_tcp().to_port(), 65535);
        assert_eq!(port.protocol(), Protocol::Tcp);
    }

    #[test]
    fn test_duplicate_rules_collapse() {
        let (_, vpc) = stack_with_vpc();
        let mut group = SecurityGroup::new(LogicalId::new("Sg").unwrap(), &vpc, "test").unwrap();
        group.add_ingress_rule(Peer::any_ipv4(), Port::tcp(443), "https");
        group.add_ingress_rule(Peer::any_ipv4(), Port::tcp(443), "https");
        assert_eq!(group.ingress_rules().len(), 1);
    }

    #[test]
    fn test_self_reference_is_standalone() {
        let (mut stack, vpc) = stack_with_vpc();
        let mut group = SecurityGroup::new(LogicalId::new("Sg").unwrap(), &vpc, "test").unwrap();
        let own = group.as_peer();
        group.add_ingress_rule(own, Port::all_tcp(), "All referencing rule");
        group.add_ingress_rule(
            Peer::Ipv4(CidrBlock::new("10.1.0.0/16").unwrap()),
            Port::tcp(5432),
            "tcp5432 PostgreSQL",
        );

        let declared = group.declare(&mut stack).unwrap();
        assert_eq!(declared.standalone_ingress_ids().len(), 1);

        let inline = &stack.resource(declared.logical_id()).unwrap().properties["SecurityGroupIngress"];
        assert_eq!(inline.as_array().map(Vec::len), Some(1));
        assert_eq!(inline[0]["CidrIp"], "10.1.0.0/16");

        let standalone = stack.resource(&declared.standalone_ingress_ids()[0]).unwrap();
        assert_eq!(standalone.resource_type, ResourceType::SecurityGroupIngress);
        assert_eq!(standalone.properties["FromPort"], 0);
        assert_eq!(standalone.properties["ToPort"], 65535);
    }

    #[test]
    fn test_egress_posture() {
        let (mut stack, vpc) = stack_with_vpc();
        let open = SecurityGroup::new(LogicalId::new("Open").unwrap(), &vpc, "open")
            .unwrap()
            .declare(&mut stack)
            .unwrap();
        let closed = SecurityGroup::new(LogicalId::new("Closed").unwrap(), &vpc, "closed")
            .unwrap()
            .allow_all_outbound(false)
            .declare(&mut stack)
            .unwrap();

        let open_egress = &stack.resource(open.logical_id()).unwrap().properties["SecurityGroupEgress"][0];
        assert_eq!(open_egress["CidrIp"], "0.0.0.0/0");
        assert_eq!(open_egress["IpProtocol"], "-1");

        let closed_egress = &stack.resource(closed.logical_id()).unwrap().properties["SecurityGroupEgress"][0];
        assert_eq!(closed_egress["CidrIp"], "255.255.255.255/32");
        assert_eq!(closed_egress["IpProtocol"], "icmp");
    }

    #[test]
    fn test_description_required() {
        let (_, vpc) = stack_with_vpc();
        assert!(SecurityGroup::new(LogicalId::new("Sg").unwrap(), &vpc, "").is_err());
    }
}
