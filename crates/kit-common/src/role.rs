//! Cluster roles and the tag vocabulary that identifies them
//!
//! Each role is marked on an instance by a `Name` tag of the form
//! `<cluster>-<literal>`, where the literal comes from [`RoleTags`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default `Name` tag literal for control-plane nodes
pub const DEFAULT_MASTER_LITERAL: &str = "master";

/// Default `Name` tag literal for etcd nodes
pub const DEFAULT_ETCD_LITERAL: &str = "etcd";

/// Functional role of a node within a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Control-plane node
    Master,
    /// etcd member
    Etcd,
}

impl Role {
    /// All roles, in display order
    pub const ALL: [Role; 2] = [Role::Master, Role::Etcd];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Etcd => "etcd",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}', expected 'master' or 'etcd'")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Role::Master),
            "etcd" => Ok(Role::Etcd),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Role vocabulary: the `Name` tag literal for each role.
///
/// Kept as data so the naming convention can change without touching the
/// filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTags {
    pub master: String,
    pub etcd: String,
}

impl Default for RoleTags {
    fn default() -> Self {
        Self {
            master: DEFAULT_MASTER_LITERAL.to_string(),
            etcd: DEFAULT_ETCD_LITERAL.to_string(),
        }
    }
}

impl RoleTags {
    /// Tag literal for a role
    pub fn literal(&self, role: Role) -> &str {
        match role {
            Role::Master => &self.master,
            Role::Etcd => &self.etcd,
        }
    }

    /// Replace the literal for one role
    pub fn with_literal(mut self, role: Role, literal: impl Into<String>) -> Self {
        match role {
            Role::Master => self.master = literal.into(),
            Role::Etcd => self.etcd = literal.into(),
        }
        self
    }

    /// Expected `Name` tag value for `role` in `cluster_name`
    pub fn name_tag_value(&self, cluster_name: &str, role: Role) -> String {
        format!("{}-{}", cluster_name, self.literal(role))
    }
}
