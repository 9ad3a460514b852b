//! Discovery errors
//!
//! Any error means role membership is unknown. Callers must not read an error
//! as "no nodes".

use crate::aws::error::{AwsError, classify_anyhow_error};
use std::time::Duration;
use thiserror::Error;

/// Addressing field a node cannot be built without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    InstanceId,
    PrivateIpAddress,
    PrivateDnsName,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MissingField::InstanceId => "instance id",
            MissingField::PrivateIpAddress => "private IP address",
            MissingField::PrivateDnsName => "private DNS name",
        })
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Cluster name is empty
    #[error("cluster name cannot be empty")]
    InvalidClusterName,

    /// The provider query failed (network, auth, throttling)
    #[error("failed to describe instances for cluster '{cluster}': {kind}")]
    Provider {
        cluster: String,
        kind: AwsError,
        #[source]
        source: anyhow::Error,
    },

    /// An active, tag-matched instance lacks addressing
    #[error("instance {instance_id} is active but has no {field}")]
    MalformedInstance {
        instance_id: String,
        field: MissingField,
    },

    /// The caller cancelled the query
    #[error("discovery cancelled")]
    Cancelled,

    /// The provider did not answer within the configured deadline
    #[error("instance query timed out after {0:?}")]
    DeadlineExceeded(Duration),
}

impl DiscoveryError {
    /// Wrap a provider failure, classifying its AWS error code
    pub fn provider(cluster: &str, source: anyhow::Error) -> Self {
        Self::Provider {
            cluster: cluster.to_string(),
            kind: classify_anyhow_error(&source),
            source,
        }
    }

    /// Classified AWS error, for provider failures
    pub fn aws_error(&self) -> Option<&AwsError> {
        match self {
            DiscoveryError::Provider { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Whether the caller cancelled the query
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DiscoveryError::Cancelled)
    }

    /// Whether the configured request deadline expired
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, DiscoveryError::DeadlineExceeded(_))
    }

    /// Suggestion for the user, if one is known
    pub fn suggestion(&self) -> Option<String> {
        self.aws_error().and_then(AwsError::suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DiscoveryError::InvalidClusterName.to_string(),
            "cluster name cannot be empty"
        );
        assert_eq!(
            DiscoveryError::MalformedInstance {
                instance_id: "i-001".to_string(),
                field: MissingField::PrivateDnsName,
            }
            .to_string(),
            "instance i-001 is active but has no private DNS name"
        );
    }

    #[test]
    fn test_provider_error_keeps_source() {
        use std::error::Error as _;

        let err = DiscoveryError::provider("c1", anyhow::anyhow!("AuthFailure: bad key"));
        assert!(err.to_string().contains("'c1'"));
        assert!(matches!(err.aws_error(), Some(AwsError::Unauthorized { .. })));
        assert!(err.suggestion().is_some());
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("AuthFailure: bad key"));
    }

    #[test]
    fn test_cancellation_is_distinct_from_provider_errors() {
        let cancelled = DiscoveryError::Cancelled;
        assert!(cancelled.is_cancelled());
        assert!(!cancelled.is_deadline_exceeded());

        let expired = DiscoveryError::DeadlineExceeded(Duration::from_secs(1));
        assert!(expired.is_deadline_exceeded());
        assert!(!expired.is_cancelled());

        let provider = DiscoveryError::provider("c1", anyhow::anyhow!("boom"));
        assert!(!provider.is_cancelled());
        assert!(!provider.is_deadline_exceeded());
        assert!(DiscoveryError::Cancelled.aws_error().is_none());
    }
}
