// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment context
//!
//! Synthesis-time facts about the target environment. The only lookup the
//! network stack needs is the region's availability zone list; when it is
//! not known the zones are deferred to deploy time.

use serde::{Deserialize, Serialize};

use crate::domain::AvailabilityZones;

/// Environment variable holding the account id
pub const ACCOUNT_ENV: &str = "CDK_DEFAULT_ACCOUNT";

/// Environment variable holding the region
pub const REGION_ENV: &str = "CDK_DEFAULT_REGION";

/// Environment variable holding a comma separated zone list
pub const AVAILABILITY_ZONES_ENV: &str = "INFRA_ETL_AVAILABILITY_ZONES";

/// Target environment for a stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentContext {
    /// Account id, if pinned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Region, if pinned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Zone names of the region, if looked up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zones: Option<Vec<String>>,
}

impl DeploymentContext {
    /// Environment-agnostic context: everything deferred to deploy time
    pub fn agnostic() -> Self {
        Self::default()
    }

    /// Context pinned to a region with a known zone list
    pub fn pinned(region: impl Into<String>, zones: Vec<String>) -> Self {
        Self {
            account: None,
            region: Some(region.into()),
            availability_zones: Some(zones),
        }
    }

    /// Load context from environment variables
    ///
    /// Unset variables leave the corresponding field deferred. An empty zone
    /// variable is a resolved, empty zone list.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let availability_zones = lookup(AVAILABILITY_ZONES_ENV).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|zone| !zone.is_empty())
                .map(String::from)
                .collect()
        });

        Self {
            account: lookup(ACCOUNT_ENV).filter(|a| !a.is_empty()),
            region: lookup(REGION_ENV).filter(|r| !r.is_empty()),
            availability_zones,
        }
    }

    /// Overlay fields set in `other` on top of this context
    pub fn merged_with(mut self, other: DeploymentContext) -> Self {
        if other.account.is_some() {
            self.account = other.account;
        }
        if other.region.is_some() {
            self.region = other.region;
        }
        if other.availability_zones.is_some() {
            self.availability_zones = other.availability_zones;
        }
        self
    }

    /// The region's availability zones
    pub fn availability_zones(&self) -> AvailabilityZones {
        match &self.availability_zones {
            Some(zones) => AvailabilityZones::Resolved(zones.clone()),
            None => AvailabilityZones::Deferred {
                region: self.region.clone(),
            },
        }
    }
}
