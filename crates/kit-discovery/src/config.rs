//! Configuration types for discovery

use kit_common::tags::TAG_CLUSTER_NAME;
use kit_common::{Role, RoleTags};
use std::time::Duration;
use thiserror::Error;

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-2";

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// cluster tag key is empty
    #[error("cluster tag key cannot be empty")]
    EmptyClusterTagKey,

    /// a role has an empty `Name` tag literal
    #[error("tag literal for role '{0}' cannot be empty")]
    EmptyRoleLiteral(Role),

    /// request timeout is zero
    #[error("request timeout must be greater than 0")]
    InvalidTimeout,
}

/// How instances are scoped to a cluster and classified by role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Tag key whose value is the cluster name (provider-side filter)
    pub cluster_tag_key: String,
    /// `Name` tag literal per role
    pub role_tags: RoleTags,
    /// Deadline for the provider query, unbounded when `None`
    pub request_timeout: Option<Duration>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            cluster_tag_key: TAG_CLUSTER_NAME.to_string(),
            role_tags: RoleTags::default(),
            request_timeout: None,
        }
    }
}

impl DiscoveryConfig {
    /// Set the cluster tag key
    pub fn with_cluster_tag_key(mut self, key: impl Into<String>) -> Self {
        self.cluster_tag_key = key.into();
        self
    }

    /// Set the role vocabulary
    pub fn with_role_tags(mut self, role_tags: RoleTags) -> Self {
        self.role_tags = role_tags;
        self
    }

    /// Set the provider query deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster_tag_key.is_empty() {
            return Err(ConfigError::EmptyClusterTagKey);
        }
        for role in Role::ALL {
            if self.role_tags.literal(role).is_empty() {
                return Err(ConfigError::EmptyRoleLiteral(role));
            }
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

/// AWS connection configuration
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// AWS region
    pub region: String,
    /// AWS profile name (overrides default credential resolution)
    pub aws_profile: Option<String>,
}
