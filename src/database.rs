// Copyright (c) 2025 - Cowboy AI, Inc.
//! Database network access
//!
//! Declares the subnet group and security group a database cluster needs
//! inside an acquired VPC, and opens the PostgreSQL and MySQL ports to the
//! given ingress sources.

use serde_json::json;
use tracing::info;

use crate::construct::Stack;
use crate::domain::{LogicalId, ResourceType};
use crate::errors::{StackError, StackResult};
use crate::security_group::{DeclaredSecurityGroup, Peer, Port, SecurityGroup};
use crate::vpc::{SubnetSelection, VpcHandle};

/// Construct id of the database subnet group
pub const DB_SUBNET_GROUP_ID: &str = "DatabaseSubnetGroup";

/// Construct id of the database security group
pub const DB_SECURITY_GROUP_ID: &str = "DatabaseSecurityGroup";

pub const POSTGRES_PORT: u16 = 5432;
pub const MYSQL_PORT: u16 = 3306;

/// A subnet group must span at least this many zones
pub const MIN_SUBNET_GROUP_ZONES: usize = 2;

/// Declared database network resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseNetwork {
    subnet_group_id: LogicalId,
    subnet_group_name: String,
    subnet_count: usize,
    security_group: DeclaredSecurityGroup,
}

impl DatabaseNetwork {
    pub fn subnet_group_id(&self) -> &LogicalId {
        &self.subnet_group_id
    }

    pub fn subnet_group_name(&self) -> &str {
        &self.subnet_group_name
    }

    pub fn subnet_count(&self) -> usize {
        self.subnet_count
    }

    pub fn security_group(&self) -> &DeclaredSecurityGroup {
        &self.security_group
    }
}

/// Declare the subnet group and security group of a database in `vpc`
///
/// The selection is narrowed to one subnet per zone. Each ingress source
/// gets tcp/5432 and tcp/3306; members of the security group can reach each
/// other on every TCP port.
pub fn provision_database_network(
    stack: &mut Stack,
    vpc: &VpcHandle,
    selection: &SubnetSelection,
    ingress_sources: &[Peer],
) -> StackResult<DatabaseNetwork> {
    let selected = vpc.select_subnets(&selection.clone().one_per_az());
    if selected.availability_zones().len() < MIN_SUBNET_GROUP_ZONES {
        return Err(StackError::InvalidValue(format!(
            "database subnet group needs subnets in at least {} availability zones; selection covers {}",
            MIN_SUBNET_GROUP_ZONES,
            selected.availability_zones().len()
        )));
    }

    let postgres = Port::tcp(POSTGRES_PORT).labelled("tcp5432 PostgreSQL");
    let mysql = Port::tcp(MYSQL_PORT).labelled("tcp3306 MySQL");

    let mut security_group = SecurityGroup::new(
        LogicalId::new(DB_SECURITY_GROUP_ID)?,
        vpc,
        "Security group for the Aurora database.",
    )?
    .with_group_name(format!("{} Database", stack.stack_id()))
    .allow_all_outbound(true);

    let own = security_group.as_peer();
    security_group.add_ingress_rule(own, Port::all_tcp(), "All referencing rule");
    for source in ingress_sources {
        security_group.add_ingress_rule(source.clone(), postgres.clone(), postgres.to_string());
        security_group.add_ingress_rule(source.clone(), mysql.clone(), mysql.to_string());
    }

    let subnet_group_id = LogicalId::new(DB_SUBNET_GROUP_ID)?;
    let subnet_group_name = format!("{}subnet-group_db", stack.stack_id()).to_lowercase();
    stack.add_resource(
        subnet_group_id.clone(),
        ResourceType::DbSubnetGroup,
        json!({
            "DBSubnetGroupDescription": "Subnet group for the database",
            "DBSubnetGroupName": subnet_group_name,
            "SubnetIds": selected.subnet_ids(),
        }),
    )?;

    let security_group = security_group.declare(stack)?;

    info!(
        stack = %stack.stack_id(),
        subnets = selected.len(),
        sources = ingress_sources.len(),
        "Declared database network"
    );

    Ok(DatabaseNetwork {
        subnet_group_id,
        subnet_group_name,
        subnet_count: selected.len(),
        security_group,
    })
}
