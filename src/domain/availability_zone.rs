// Copyright (c) 2025 - Cowboy AI, Inc.
//! Availability Zone Value Objects
//!
//! Zones are either known by name (the deployment context resolved the
//! region's zone list) or deferred to deploy time, in which case they render
//! as `Fn::Select` over `Fn::GetAZs`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// A single availability zone placement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityZone {
    /// Zone known by name at synthesis time
    Named(String),
    /// The `index`-th zone of the region, resolved at deploy time
    Selected {
        index: usize,
        region: Option<String>,
    },
}

impl AvailabilityZone {
    /// Template form of the zone
    pub fn to_template_value(&self) -> Value {
        match self {
            Self::Named(name) => Value::String(name.clone()),
            Self::Selected { index, region } => json!({
                "Fn::Select": [index, get_azs(region.as_deref())]
            }),
        }
    }
}

impl fmt::Display for AvailabilityZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::Selected { index, .. } => write!(f, "az[{}]", index),
        }
    }
}

/// The zone list of the deployment region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityZones {
    /// Zone names known at synthesis time (possibly empty)
    Resolved(Vec<String>),
    /// Zone list looked up at deploy time
    Deferred { region: Option<String> },
}

impl AvailabilityZones {
    /// Number of zones, if known
    pub fn resolved_len(&self) -> Option<usize> {
        match self {
            Self::Resolved(zones) => Some(zones.len()),
            Self::Deferred { .. } => None,
        }
    }

    /// Placement for the `index`-th zone
    pub fn zone(&self, index: usize) -> AvailabilityZone {
        match self {
            Self::Resolved(zones) => match zones.get(index) {
                Some(name) => AvailabilityZone::Named(name.clone()),
                None => AvailabilityZone::Selected {
                    index,
                    region: None,
                },
            },
            Self::Deferred { region } => AvailabilityZone::Selected {
                index,
                region: region.clone(),
            },
        }
    }

    /// The first `count` zone placements
    pub fn take(&self, count: usize) -> Vec<AvailabilityZone> {
        (0..count).map(|index| self.zone(index)).collect()
    }

    /// Template form of the whole list
    pub fn to_template_value(&self) -> Value {
        match self {
            Self::Resolved(zones) => json!(zones),
            Self::Deferred { region } => get_azs(region.as_deref()),
        }
    }
}

fn get_azs(region: Option<&str>) -> Value {
    json!({ "Fn::GetAZs": region.unwrap_or("") })
}
