// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack configuration loading
//!
//! A stack configuration file is JSON:
//!
//! ```json
//! {
//!   "stack_id": "infra-etl-network",
//!   "context": { "region": "us-east-1" },
//!   "props": { "cidr": "10.0.0.0/16", "cidrMask": 24, "maxAzs": 3 }
//! }
//! ```
//!
//! Context fields set in the environment (see [`crate::context`]) override
//! the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::info;

use crate::context::DeploymentContext;
use crate::errors::StackResult;
use crate::stack::{NetworkStack, StackProps};

/// Contents of a stack configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    pub stack_id: String,
    #[serde(default)]
    pub context: DeploymentContext,
    #[serde(default = "empty_props")]
    pub props: Value,
}

fn empty_props() -> Value {
    Value::Object(Default::default())
}

impl StackConfig {
    /// Parse a configuration document
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("stack configuration is not valid JSON")
    }

    /// Overlay context from the environment
    pub fn with_env_overrides(mut self) -> Self {
        self.context = self.context.merged_with(DeploymentContext::from_env());
        self
    }

    /// Typed props, with argument types checked
    pub fn stack_props(&self) -> StackResult<StackProps> {
        StackProps::from_json(&self.props)
    }

    /// Build the network stack this configuration describes
    pub fn build(&self) -> StackResult<NetworkStack> {
        NetworkStack::new(self.stack_id.clone(), self.context.clone(), self.stack_props()?)
    }
}

/// Load a configuration file and apply environment overrides
pub fn load_stack_config(path: impl AsRef<Path>) -> Result<StackConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read stack configuration {}", path.display()))?;

    let config = StackConfig::from_json_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?
        .with_env_overrides();

    info!(stack = %config.stack_id, path = %path.display(), "Loaded stack configuration");
    Ok(config)
}
