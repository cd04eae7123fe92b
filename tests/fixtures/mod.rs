// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for infra-etl-network
//!
//! Deterministic contexts and props shared by the integration suites.

#![allow(dead_code)]

use serde_json::{json, Value};

use infra_etl_network::construct::Template;
use infra_etl_network::context::DeploymentContext;
use infra_etl_network::vpc::LinkOptions;

pub const STACK_ID: &str = "infra-etl-network";
pub const VPC_CIDR: &str = "10.0.0.0/16";
pub const SUBNET_MASK: u8 = 24;
pub const EXISTING_VPC_ID: &str = "vpc-abc123";

/// Region with four zones
pub fn us_east_1() -> DeploymentContext {
    DeploymentContext::pinned(
        "us-east-1",
        vec![
            "us-east-1a".to_string(),
            "us-east-1b".to_string(),
            "us-east-1c".to_string(),
            "us-east-1d".to_string(),
        ],
    )
}

/// Region whose zone lookup came back empty
pub fn zoneless_region() -> DeploymentContext {
    DeploymentContext::pinned("us-nowhere-1", Vec::new())
}

/// Link options describing three isolated subnets, one per zone
pub fn isolated_subnet_options() -> LinkOptions {
    link_options(json!({
        "isolated_subnet_ids": ["subnet-0a", "subnet-0b", "subnet-0c"],
        "isolated_subnet_route_table_ids": ["rtb-0a", "rtb-0b", "rtb-0c"],
        "vpc_cidr_block": "10.42.0.0/16",
    }))
}

pub fn link_options(value: Value) -> LinkOptions {
    serde_json::from_value(value).expect("link options fixture must be an object")
}

/// `Ref` targets that no resource in the template declares
pub fn dangling_refs(template: &Template) -> Vec<String> {
    let document = template.as_json();
    let mut targets = Vec::new();
    collect_refs(document, &mut targets);

    targets
        .into_iter()
        .filter(|target| document["Resources"].get(target.as_str()).is_none())
        .collect()
}

fn collect_refs(value: &Value, targets: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get("Ref") {
                targets.push(target.clone());
            }
            map.values().for_each(|child| collect_refs(child, targets));
        }
        Value::Array(items) => items.iter().for_each(|item| collect_refs(item, targets)),
        _ => {}
    }
}
