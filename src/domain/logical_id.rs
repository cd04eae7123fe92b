// Copyright (c) 2025 - Cowboy AI, Inc.
//! Logical ID Value Object with Template Naming Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Logical id validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogicalIdError {
    #[error("Logical id is empty")]
    Empty,

    #[error("Logical id exceeds maximum length of 255 characters: {0}")]
    TooLong(usize),

    #[error("Invalid character in logical id: {0}")]
    InvalidCharacter(char),
}

/// Template-unique name of a declared resource
///
/// Invariants:
/// - Non-empty
/// - At most 255 characters
/// - ASCII alphanumeric only
///
/// # Examples
///
/// ```rust
/// use infra_etl_network::domain::LogicalId;
///
/// let vpc = LogicalId::new("RedshiftVpc").unwrap();
/// let subnet = vpc.child("private0").child("Subnet");
/// assert_eq!(subnet.as_str(), "RedshiftVpcprivate0Subnet");
///
/// assert!(LogicalId::new("").is_err());
/// assert!(LogicalId::new("has-hyphen").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalId(String);

impl LogicalId {
    /// Maximum length accepted by the template format
    pub const MAX_LENGTH: usize = 255;

    pub fn new(id: impl Into<String>) -> Result<Self, LogicalIdError> {
        let id = id.into();

        if id.is_empty() {
            return Err(LogicalIdError::Empty);
        }

        if id.len() > Self::MAX_LENGTH {
            return Err(LogicalIdError::TooLong(id.len()));
        }

        if let Some(ch) = id.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(LogicalIdError::InvalidCharacter(ch));
        }

        Ok(Self(id))
    }

    /// Derive a nested id by appending the alphanumeric part of `segment`
    pub fn child(&self, segment: &str) -> Self {
        let mut id = self.0.clone();
        id.extend(segment.chars().filter(char::is_ascii_alphanumeric));
        id.truncate(Self::MAX_LENGTH);
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LogicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LogicalId {
    type Error = LogicalIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for LogicalId {
    type Error = LogicalIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogicalId> for String {
    fn from(id: LogicalId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(LogicalId::new("RedshiftVpc").is_ok());
        assert!(LogicalId::new("ExistingVPC").is_ok());
        assert!(LogicalId::new("a1").is_ok());
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!(LogicalId::new(""), Err(LogicalIdError::Empty));
        assert_eq!(
            LogicalId::new("Redshift_Vpc"),
            Err(LogicalIdError::InvalidCharacter('_'))
        );
        assert!(LogicalId::new("a".repeat(256)).is_err());
    }

    #[test]
    fn test_child_strips_separators() {
        let acl = LogicalId::new("RedshiftSubnetsAcl").unwrap();
        let child = acl.child("Association").child("RedshiftVpc/private1");
        assert_eq!(child.as_str(), "RedshiftSubnetsAclAssociationRedshiftVpcprivate1");
    }
}
