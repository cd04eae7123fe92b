// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Stack
//!
//! The stack-level entry point. [`StackProps`] carries the keyword surface
//! (`cidr`, `cidr_mask`, `max_azs`, `vpc`, `vpc_arguments`,
//! `associate_network_acl`); [`NetworkStack::new`] validates it, resolves the
//! VPC and applies the network posture.
//!
//! # Example
//!
//! ```rust
//! use infra_etl_network::context::DeploymentContext;
//! use infra_etl_network::domain::ResourceType;
//! use infra_etl_network::stack::{NetworkStack, StackProps};
//!
//! let stack = NetworkStack::new(
//!     "infra-etl",
//!     DeploymentContext::agnostic(),
//!     StackProps::create("10.0.0.0/16", 24),
//! )
//! .unwrap();
//!
//! let template = stack.template();
//! assert_eq!(template.resource_count(ResourceType::Subnet), 3);
//! assert_eq!(template.resource_count(ResourceType::SubnetNetworkAclAssociation), 3);
//! ```

use serde_json::{Map, Value};

use crate::acl::NetworkAclAssociation;
use crate::construct::{Stack, Template};
use crate::context::DeploymentContext;
use crate::database::{provision_database_network, DatabaseNetwork};
use crate::errors::{json_type_name, StackError, StackResult};
use crate::policy::{select_strategy, AcquisitionConfig, VpcAcquisitionPolicy};
use crate::security_group::Peer;
use crate::vpc::create::DEFAULT_MAX_AZS;
use crate::vpc::{LinkConfig, LinkOptions, SubnetSelection, VpcHandle, VpcReference};

/// Keyword surface of the network stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackProps {
    pub cidr: Option<String>,
    pub cidr_mask: Option<u8>,
    pub max_azs: u32,
    pub vpc: Option<VpcReference>,
    pub vpc_arguments: Option<LinkOptions>,
    pub associate_network_acl: bool,
}

impl Default for StackProps {
    fn default() -> Self {
        Self {
            cidr: None,
            cidr_mask: None,
            max_azs: DEFAULT_MAX_AZS,
            vpc: None,
            vpc_arguments: None,
            associate_network_acl: true,
        }
    }
}

/// Accepted keys, with their camelCase spelling
const PROP_KEYS: [(&str, &str); 6] = [
    ("cidr", "cidr"),
    ("cidr_mask", "cidrMask"),
    ("max_azs", "maxAzs"),
    ("vpc", "vpc"),
    ("vpc_arguments", "vpcArguments"),
    ("associate_network_acl", "associateNetworkAcl"),
];

impl StackProps {
    /// Props for a new VPC
    pub fn create(cidr: impl Into<String>, cidr_mask: u8) -> Self {
        Self {
            cidr: Some(cidr.into()),
            cidr_mask: Some(cidr_mask),
            ..Self::default()
        }
    }

    /// Props for an existing VPC
    pub fn link(vpc: impl Into<VpcReference>) -> Self {
        Self {
            vpc: Some(vpc.into()),
            ..Self::default()
        }
    }

    pub fn with_max_azs(mut self, max_azs: u32) -> Self {
        self.max_azs = max_azs;
        self
    }

    pub fn with_vpc_arguments(mut self, vpc_arguments: LinkOptions) -> Self {
        self.vpc_arguments = Some(vpc_arguments);
        self
    }

    pub fn with_network_acl(mut self, associate: bool) -> Self {
        self.associate_network_acl = associate;
        self
    }

    /// The acquisition these props describe
    pub fn acquisition(&self) -> StackResult<AcquisitionConfig> {
        let link = self.vpc.clone().map(|vpc| {
            LinkConfig::new(vpc).with_options(self.vpc_arguments.clone().unwrap_or_default())
        });
        select_strategy(self.cidr.as_deref(), self.cidr_mask, self.max_azs, link)
    }

    /// Read props from a JSON object, checking argument types
    ///
    /// Keys may be snake_case or camelCase. `null` counts as absent. A VPC
    /// can only be referenced by id from JSON.
    pub fn from_json(value: &Value) -> StackResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| StackError::invalid_type("props", "object", json_type_name(value)))?;

        for key in object.keys() {
            let known = PROP_KEYS
                .iter()
                .any(|(snake, camel)| key.as_str() == *snake || key.as_str() == *camel);
            if !known {
                return Err(StackError::unexpected_argument(key.as_str(), "a stack property"));
            }
        }

        let mut props = StackProps::default();

        if let Some(cidr) = lookup(object, "cidr") {
            props.cidr = Some(expect_str("cidr", cidr)?.to_string());
        }
        if let Some(mask) = lookup(object, "cidr_mask") {
            let mask = expect_int("cidr_mask", mask)?;
            props.cidr_mask = Some(u8::try_from(mask).map_err(|_| {
                StackError::InvalidValue(format!("cidr_mask {} is out of range", mask))
            })?);
        }
        if let Some(max_azs) = lookup(object, "max_azs") {
            let max_azs = expect_int("max_azs", max_azs)?;
            props.max_azs = u32::try_from(max_azs).map_err(|_| {
                StackError::InvalidValue(format!("max_azs {} is out of range", max_azs))
            })?;
        }
        if let Some(vpc) = lookup(object, "vpc") {
            props.vpc = Some(VpcReference::Id(expect_str("vpc", vpc)?.to_string()));
        }
        if let Some(arguments) = lookup(object, "vpc_arguments") {
            let arguments = arguments.as_object().ok_or_else(|| {
                StackError::invalid_type("vpc_arguments", "object", json_type_name(arguments))
            })?;
            props.vpc_arguments = Some(
                arguments
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            );
        }
        if let Some(associate) = lookup(object, "associate_network_acl") {
            props.associate_network_acl = associate.as_bool().ok_or_else(|| {
                StackError::invalid_type(
                    "associate_network_acl",
                    "boolean",
                    json_type_name(associate),
                )
            })?;
        }

        Ok(props)
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, snake: &str) -> Option<&'a Value> {
    let camel = PROP_KEYS
        .iter()
        .find(|(s, _)| *s == snake)
        .map(|(_, camel)| *camel)
        .unwrap_or(snake);

    object
        .get(snake)
        .or_else(|| object.get(camel))
        .filter(|value| !value.is_null())
}

fn expect_str<'a>(argument: &str, value: &'a Value) -> StackResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| StackError::invalid_type(argument, "string", json_type_name(value)))
}

fn expect_int(argument: &str, value: &Value) -> StackResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| StackError::invalid_type(argument, "integer", json_type_name(value)))
}

/// A stack holding the acquired VPC and its network posture
#[derive(Debug, Clone)]
pub struct NetworkStack {
    stack: Stack,
    vpc: VpcHandle,
    network_acl: Option<NetworkAclAssociation>,
}

impl NetworkStack {
    /// Validate `props`, resolve the VPC, and apply the network posture
    ///
    /// Props are validated before anything is declared.
    pub fn new(
        stack_id: impl Into<String>,
        context: DeploymentContext,
        props: StackProps,
    ) -> StackResult<Self> {
        let config = props.acquisition()?;
        let mut stack = Stack::new(stack_id, context)?;

        let acquisition = VpcAcquisitionPolicy::new()
            .with_network_acl(props.associate_network_acl)
            .resolve(&mut stack, config)?;

        Ok(Self {
            stack,
            vpc: acquisition.vpc,
            network_acl: acquisition.network_acl,
        })
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn vpc(&self) -> &VpcHandle {
        &self.vpc
    }

    pub fn network_acl(&self) -> Option<&NetworkAclAssociation> {
        self.network_acl.as_ref()
    }

    /// Add database subnet and security groups over every subnet of the VPC
    pub fn add_database_network(&mut self, ingress_sources: &[Peer]) -> StackResult<DatabaseNetwork> {
        provision_database_network(
            &mut self.stack,
            &self.vpc,
            &SubnetSelection::all(),
            ingress_sources,
        )
    }

    pub fn template(&self) -> Template {
        Template::from_stack(&self.stack)
    }
}
