// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template synthesis and inspection

use serde_json::{json, Map, Value};

use super::Stack;
use crate::domain::ResourceType;
use crate::errors::StackResult;

/// Synthesized template of a stack
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    document: Value,
}

impl Template {
    /// Render every declared resource of `stack`
    pub fn from_stack(stack: &Stack) -> Self {
        let resources: Map<String, Value> = stack
            .resources()
            .map(|(id, resource)| {
                (
                    id.to_string(),
                    json!({
                        "Type": resource.resource_type.as_str(),
                        "Properties": resource.properties,
                    }),
                )
            })
            .collect();

        Self {
            document: json!({ "Resources": resources }),
        }
    }

    pub fn as_json(&self) -> &Value {
        &self.document
    }

    pub fn to_json_string(&self) -> StackResult<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    /// All resources of a type, as `(logical id, properties)`
    pub fn find_resources(&self, resource_type: ResourceType) -> Vec<(&str, &Value)> {
        let Some(resources) = self.document["Resources"].as_object() else {
            return Vec::new();
        };

        resources
            .iter()
            .filter(|(_, body)| body["Type"] == resource_type.as_str())
            .map(|(id, body)| (id.as_str(), &body["Properties"]))
            .collect()
    }

    pub fn resource_count(&self, resource_type: ResourceType) -> usize {
        self.find_resources(resource_type).len()
    }

    pub fn resource_count_is(&self, resource_type: ResourceType, count: usize) -> bool {
        self.resource_count(resource_type) == count
    }

    /// Does some resource of `resource_type` have properties matching `expected`?
    ///
    /// Objects match when every expected key matches; arrays match
    /// element-wise with equal length; scalars match by equality.
    pub fn has_resource_properties(&self, resource_type: ResourceType, expected: &Value) -> bool {
        self.find_resources(resource_type)
            .into_iter()
            .any(|(_, properties)| matches_subset(expected, properties))
    }
}

fn matches_subset(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => expected.iter().all(|(key, value)| {
            actual
                .get(key)
                .is_some_and(|actual_value| matches_subset(value, actual_value))
        }),
        (Value::Array(expected), Value::Array(actual)) => {
            expected.len() == actual.len()
                && expected
                    .iter()
                    .zip(actual)
                    .all(|(e, a)| matches_subset(e, a))
        }
        _ => expected == actual,
    }
}
