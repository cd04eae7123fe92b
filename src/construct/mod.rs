// Copyright (c) 2025 - Cowboy AI, Inc.
//! Construct Model
//!
//! A [`Stack`] collects declared resources keyed by [`LogicalId`]. Nothing is
//! provisioned here: the stack is an in-memory description that
//! [`Template::from_stack`] renders into a deployable document.
//!
//! # Example
//!
//! ```rust
//! use infra_etl_network::construct::{Stack, Template};
//! use infra_etl_network::context::DeploymentContext;
//! use infra_etl_network::domain::{LogicalId, ResourceType};
//! use serde_json::json;
//!
//! let mut stack = Stack::new("network", DeploymentContext::agnostic()).unwrap();
//! let id = LogicalId::new("Acl").unwrap();
//! stack
//!     .add_resource(id, ResourceType::NetworkAcl, json!({ "VpcId": "vpc-1" }))
//!     .unwrap();
//!
//! let template = Template::from_stack(&stack);
//! assert_eq!(template.resource_count(ResourceType::NetworkAcl), 1);
//! ```

pub mod template;

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use crate::context::DeploymentContext;
use crate::domain::{LogicalId, ResourceType};
use crate::errors::{StackError, StackResult};

pub use template::Template;

/// A declared resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub resource_type: ResourceType,
    pub properties: Value,
}

/// Container of declared resources for one deployment unit
#[derive(Debug, Clone)]
pub struct Stack {
    node_id: Uuid,
    stack_id: String,
    context: DeploymentContext,
    resources: BTreeMap<LogicalId, Resource>,
}

impl Stack {
    /// Maximum stack name length
    pub const MAX_ID_LENGTH: usize = 128;

    /// Create an empty stack
    ///
    /// # Invariants
    /// - Stack id starts with a letter
    /// - Stack id contains only alphanumerics and hyphens
    pub fn new(stack_id: impl Into<String>, context: DeploymentContext) -> StackResult<Self> {
        let stack_id = stack_id.into();
        Self::validate_stack_id(&stack_id)?;

        Ok(Self {
            node_id: Uuid::now_v7(),
            stack_id,
            context,
            resources: BTreeMap::new(),
        })
    }

    fn validate_stack_id(stack_id: &str) -> StackResult<()> {
        let starts_with_letter = stack_id
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());

        if !starts_with_letter
            || stack_id.len() > Self::MAX_ID_LENGTH
            || !stack_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(StackError::InvalidValue(format!(
                "Stack id '{}' must start with a letter and contain only alphanumerics and hyphens",
                stack_id
            )));
        }
        Ok(())
    }

    /// Identity of this stack instance; clones share it
    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    pub fn stack_id(&self) -> &str {
        &self.stack_id
    }

    pub fn context(&self) -> &DeploymentContext {
        &self.context
    }

    /// Declare a resource
    ///
    /// # Invariant
    /// - Logical ids are unique within a stack
    pub fn add_resource(
        &mut self,
        id: LogicalId,
        resource_type: ResourceType,
        properties: Value,
    ) -> StackResult<LogicalId> {
        if self.resources.contains_key(&id) {
            return Err(StackError::DuplicateConstruct(id.to_string()));
        }

        debug!(stack = %self.stack_id, %id, %resource_type, "Declaring resource");
        self.resources.insert(
            id.clone(),
            Resource {
                resource_type,
                properties,
            },
        );
        Ok(id)
    }

    pub fn resource(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn contains(&self, id: &LogicalId) -> bool {
        self.resources.contains_key(id)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &Resource)> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// `Name` tag for a construct path inside this stack
    pub fn name_tags(&self, path: &str) -> Value {
        json!([{ "Key": "Name", "Value": format!("{}/{}", self.stack_id, path) }])
    }
}

/// Reference to the primary identifier of a declared resource
pub fn reference(id: &LogicalId) -> Value {
    json!({ "Ref": id.as_str() })
}

/// Reference to an attribute of a declared resource
pub fn get_att(id: &LogicalId, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [id.as_str(), attribute] })
}
