// Copyright (c) 2025 - Cowboy AI, Inc.
//! Link strategy: reference an existing VPC
//!
//! Linking by id builds an imported handle from the region's zone list and
//! the caller's link options. Options are kept on the handle verbatim; the
//! recognised keys describe the existing subnet layout:
//!
//! | key                                   | value            |
//! |---------------------------------------|------------------|
//! | `vpc_cidr_block`                      | CIDR string      |
//! | `{isolated,private,public}_subnet_ids` | list of ids      |
//! | `{isolated,private,public}_subnet_names` | list of group names |
//! | `{isolated,private,public}_subnet_route_table_ids` | list of ids |

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::{ResourceIdentifier, Subnet, SubnetSelection, SubnetType, VpcHandle, VpcOrigin};
use crate::construct::Stack;
use crate::domain::{AvailabilityZones, CidrBlock};
use crate::errors::{json_type_name, StackError, StackResult};

/// Construct id of an imported VPC
pub const IMPORTED_VPC_ID: &str = "ExistingVPC";

/// Extra attributes forwarded to the imported VPC
pub type LinkOptions = BTreeMap<String, Value>;

/// Option keys the import fills in itself
const RESERVED_OPTIONS: [&str; 2] = ["vpc_id", "availability_zones"];

const SUBNET_KINDS: [(SubnetType, &str); 3] = [
    (SubnetType::PrivateIsolated, "isolated"),
    (SubnetType::PrivateWithEgress, "private"),
    (SubnetType::Public, "public"),
];

/// What to link to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VpcReference {
    /// A handle obtained earlier
    Handle(VpcHandle),
    /// Id of an existing VPC
    Id(String),
}

impl From<VpcHandle> for VpcReference {
    fn from(handle: VpcHandle) -> Self {
        Self::Handle(handle)
    }
}

impl From<&str> for VpcReference {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for VpcReference {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

/// Inputs of the link strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub vpc: VpcReference,
    pub link_options: LinkOptions,
}

impl LinkConfig {
    pub fn new(vpc: impl Into<VpcReference>) -> Self {
        Self {
            vpc: vpc.into(),
            link_options: LinkOptions::new(),
        }
    }

    pub fn with_options(mut self, link_options: LinkOptions) -> Self {
        self.link_options = link_options;
        self
    }
}

/// Resolve a VPC reference into a handle
///
/// # Invariants
/// - The resulting handle has at least one subnet
/// - A handle passed in is returned unchanged, and only into the stack that
///   declared its resources
pub fn link_vpc(stack: &Stack, config: LinkConfig) -> StackResult<VpcHandle> {
    let handle = match config.vpc {
        VpcReference::Handle(handle) => {
            if let Some(owner) = handle.declaring_stack() {
                if !handle.is_usable_in(stack) {
                    return Err(StackError::Configuration(format!(
                        "VPC {} is declared in stack '{}' and cannot be referenced from stack '{}'; link it by id instead",
                        handle.vpc_id(),
                        owner.stack_id,
                        stack.stack_id()
                    )));
                }
            }
            debug!(vpc = %handle.vpc_id(), "Linking existing handle");
            handle
        }
        VpcReference::Id(vpc_id) => {
            import_vpc(vpc_id, stack.context().availability_zones(), config.link_options)?
        }
    };

    if handle.select_subnets(&SubnetSelection::all()).is_empty() {
        return Err(StackError::InvalidValue("vpc must have subnets".into()));
    }

    info!(
        stack = %stack.stack_id(),
        vpc = %handle.vpc_id(),
        subnets = handle.subnets().len(),
        "Linked VPC"
    );
    Ok(handle)
}

fn import_vpc(
    vpc_id: String,
    zones: AvailabilityZones,
    options: LinkOptions,
) -> StackResult<VpcHandle> {
    if vpc_id.trim().is_empty() {
        return Err(StackError::InvalidValue("vpc id must not be empty".into()));
    }

    for key in options.keys() {
        if RESERVED_OPTIONS.contains(&key.as_str()) {
            return Err(StackError::invalid_type(
                key.as_str(),
                "no value (the import sets it)",
                "a second value",
            ));
        }
        if !is_known_option(key) {
            return Err(StackError::unexpected_argument(key.as_str(), "a link option"));
        }
    }

    let cidr_block = match options.get("vpc_cidr_block") {
        None => None,
        Some(Value::String(raw)) => Some(CidrBlock::new(raw)?),
        Some(other) => {
            return Err(StackError::invalid_type(
                "vpc_cidr_block",
                "string",
                json_type_name(other),
            ))
        }
    };

    let mut subnets = Vec::new();
    for (subnet_type, prefix) in SUBNET_KINDS {
        subnets.extend(import_subnet_group(subnet_type, prefix, &zones, &options)?);
    }

    let mut seen = BTreeSet::new();
    for subnet in &subnets {
        let key = subnet.construct_key();
        if !seen.insert(key.clone()) {
            return Err(StackError::InvalidValue(format!(
                "subnet id '{}' is listed more than once",
                key
            )));
        }
    }

    Ok(VpcHandle::new(ResourceIdentifier::Literal(vpc_id), VpcOrigin::Imported, zones)
        .with_cidr_block(cidr_block)
        .with_subnets(subnets)
        .with_attributes(options))
}

fn is_known_option(key: &str) -> bool {
    key == "vpc_cidr_block"
        || SUBNET_KINDS.iter().any(|(_, prefix)| {
            ["subnet_ids", "subnet_names", "subnet_route_table_ids"]
                .iter()
                .any(|suffix| key == format!("{}_{}", prefix, suffix))
        })
}

fn string_list(options: &LinkOptions, key: &str) -> StackResult<Option<Vec<String>>> {
    let Some(value) = options.get(key) else {
        return Ok(None);
    };

    let items = value
        .as_array()
        .ok_or_else(|| StackError::invalid_type(key, "array of strings", json_type_name(value)))?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(String::from).ok_or_else(|| {
                StackError::invalid_type(key, "array of strings", format!("array containing {}", json_type_name(item)))
            })
        })
        .collect::<StackResult<Vec<String>>>()
        .map(Some)
}

fn import_subnet_group(
    subnet_type: SubnetType,
    prefix: &str,
    zones: &AvailabilityZones,
    options: &LinkOptions,
) -> StackResult<Vec<Subnet>> {
    let ids_key = format!("{}_subnet_ids", prefix);
    let names_key = format!("{}_subnet_names", prefix);
    let route_tables_key = format!("{}_subnet_route_table_ids", prefix);

    let ids = string_list(options, &ids_key)?.unwrap_or_default();
    let names = string_list(options, &names_key)?;
    let route_tables = string_list(options, &route_tables_key)?;

    if ids.is_empty() {
        if names.as_ref().is_some_and(|n| !n.is_empty())
            || route_tables.as_ref().is_some_and(|r| !r.is_empty())
        {
            return Err(StackError::InvalidValue(format!(
                "'{}' or '{}' given without '{}'",
                names_key, route_tables_key, ids_key
            )));
        }
        return Ok(Vec::new());
    }

    if let Some(zone_count) = zones.resolved_len().filter(|n| *n > 0) {
        if ids.len() % zone_count != 0 {
            return Err(StackError::InvalidValue(format!(
                "Number of '{}' ({}) must be a multiple of the number of availability zones ({})",
                ids_key,
                ids.len(),
                zone_count
            )));
        }
    }

    let names = match names {
        Some(names) if !names.is_empty() => {
            if ids.len() % names.len() != 0 {
                return Err(StackError::InvalidValue(format!(
                    "'{}' has {} entries; '{}' has {}, which is not a whole number of subnets per group",
                    names_key,
                    names.len(),
                    ids_key,
                    ids.len()
                )));
            }
            names
        }
        _ => vec![subnet_type.default_group_name().to_string()],
    };
    let per_group = ids.len() / names.len();

    if let Some(route_tables) = &route_tables {
        if route_tables.len() != ids.len() {
            return Err(StackError::InvalidValue(format!(
                "'{}' must have one entry per subnet ({} given, {} expected)",
                route_tables_key,
                route_tables.len(),
                ids.len()
            )));
        }
    }

    let zone_span = zones.resolved_len().filter(|n| *n > 0).unwrap_or(per_group);

    Ok(ids
        .into_iter()
        .enumerate()
        .map(|(index, id)| Subnet {
            subnet_id: ResourceIdentifier::Literal(id),
            group_name: names[index / per_group].clone(),
            subnet_type,
            availability_zone: zones.zone(index % zone_span),
            cidr_block: None,
            route_table_id: route_tables
                .as_ref()
                .map(|tables| ResourceIdentifier::Literal(tables[index].clone())),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DeploymentContext;
    use crate::domain::AvailabilityZone;
    use serde_json::json;

    fn options(value: Value) -> LinkOptions {
        serde_json::from_value(value).unwrap()
    }

    fn stack_in(zones: Vec<&str>) -> Stack {
        let context = DeploymentContext::pinned("us-east-1", zones.into_iter().map(String::from).collect());
        Stack::new("net", context).unwrap()
    }

    #[test]
    fn test_link_by_id_without_subnets_fails() {
        let stack = stack_in(vec![]);
        let err = link_vpc(&stack, LinkConfig::new("vpc-abc123")).unwrap_err();
        assert_eq!(err, StackError::InvalidValue("vpc must have subnets".into()));
    }

    #[test]
    fn test_link_by_id_forwards_options() {
        let stack = stack_in(vec!["us-east-1a", "us-east-1b"]);
        let link_options = options(json!({
            "isolated_subnet_ids": ["subnet-1", "subnet-2"],
            "vpc_cidr_block": "10.20.0.0/16",
        }));
        let handle = link_vpc(
            &stack,
            LinkConfig::new("vpc-abc123").with_options(link_options.clone()),
        )
        .unwrap();

        assert_eq!(handle.vpc_id(), &ResourceIdentifier::Literal("vpc-abc123".into()));
        assert_eq!(handle.attributes(), &link_options);
        assert_eq!(handle.origin(), VpcOrigin::Imported);
        assert_eq!(handle.cidr_block(), Some(CidrBlock::new("10.20.0.0/16").unwrap()));
        assert_eq!(
            handle.subnets()[1].availability_zone,
            AvailabilityZone::Named("us-east-1b".into())
        );
        assert_eq!(handle.subnets()[0].group_name, "Isolated");
        // Linking declares nothing
        assert!(stack.is_empty());
    }

    #[test]
    fn test_link_handle_is_returned_unchanged() {
        let stack = stack_in(vec!["a", "b"]);
        let imported = link_vpc(
            &stack,
            LinkConfig::new("vpc-1").with_options(options(json!({ "private_subnet_ids": ["s-1", "s-2"] }))),
        )
        .unwrap();

        let again = link_vpc(&stack, LinkConfig::new(imported.clone())).unwrap();
        assert!(again.is_same_instance(&imported));
    }

    #[test]
    fn test_subnet_ids_must_divide_zones() {
        let stack = stack_in(vec!["a", "b", "c"]);
        let err = link_vpc(
            &stack,
            LinkConfig::new("vpc-1").with_options(options(json!({ "isolated_subnet_ids": ["s-1", "s-2"] }))),
        )
        .unwrap_err();
        assert!(matches!(err, StackError::InvalidValue(_)));
    }

    #[test]
    fn test_group_names_split_ids() {
        let stack = stack_in(vec!["a", "b"]);
        let handle = link_vpc(
            &stack,
            LinkConfig::new("vpc-1").with_options(options(json!({
                "isolated_subnet_ids": ["s-1", "s-2", "s-3", "s-4"],
                "isolated_subnet_names": ["db", "etl"],
            }))),
        )
        .unwrap();
        let groups: Vec<&str> = handle.subnets().iter().map(|s| s.group_name.as_str()).collect();
        assert_eq!(groups, vec!["db", "db", "etl", "etl"]);
    }

    #[test]
    fn test_wrong_option_types() {
        let stack = stack_in(vec!["a"]);
        let err = link_vpc(
            &stack,
            LinkConfig::new("vpc-1").with_options(options(json!({ "isolated_subnet_ids": "s-1" }))),
        )
        .unwrap_err();
        assert!(matches!(err, StackError::InvalidType { .. }));

        let err = link_vpc(
            &stack,
            LinkConfig::new("vpc-1").with_options(options(json!({ "isolated_subnet_ids": [1] }))),
        )
        .unwrap_err();
        assert!(matches!(err, StackError::InvalidType { .. }));
    }

    #[test]
    fn test_unknown_and_reserved_options() {
        let stack = stack_in(vec!["a"]);
        for key in ["vpc_id", "availability_zones", "subnet_ids"] {
            let mut link_options = LinkOptions::new();
            link_options.insert(key.to_string(), json!("x"));
            let err = link_vpc(&stack, LinkConfig::new("vpc-1").with_options(link_options)).unwrap_err();
            assert!(
                matches!(&err, StackError::InvalidType { argument, .. } if argument == key),
                "{key}: {err:?}"
            );
        }
    }

    #[test]
    fn test_duplicate_subnet_ids_rejected() {
        let stack = stack_in(vec!["a", "b"]);
        for link_options in [
            json!({ "isolated_subnet_ids": ["s-1", "s-1"] }),
            json!({ "isolated_subnet_ids": ["s-1", "s-2"], "private_subnet_ids": ["s-3", "s-2"] }),
        ] {
            let err = link_vpc(&stack, LinkConfig::new("vpc-1").with_options(options(link_options)))
                .unwrap_err();
            assert!(matches!(err, StackError::InvalidValue(msg) if msg.contains("more than once")));
        }
    }

    #[test]
    fn test_created_handle_stays_in_its_stack() {
        use crate::vpc::{create_vpc, CreateConfig};

        let mut producer = Stack::new("producer", DeploymentContext::agnostic()).unwrap();
        let created = create_vpc(&mut producer, &CreateConfig::new("10.0.0.0/16", 24)).unwrap();

        let same = link_vpc(&producer, LinkConfig::new(created.clone())).unwrap();
        assert!(same.is_same_instance(&created));

        let consumer = Stack::new("consumer", DeploymentContext::agnostic()).unwrap();
        let err = link_vpc(&consumer, LinkConfig::new(created)).unwrap_err();
        assert!(matches!(err, StackError::Configuration(msg) if msg.contains("'producer'")));
    }

    #[test]
    fn test_empty_vpc_id_rejected() {
        let stack = stack_in(vec!["a"]);
        let err = link_vpc(&stack, LinkConfig::new("")).unwrap_err();
        assert!(matches!(err, StackError::InvalidValue(_)));
    }
}
