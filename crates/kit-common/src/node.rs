//! Node descriptor returned by discovery

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discovered cluster node.
///
/// Built fresh from one active, tag-matched instance on every discovery call.
/// Fields are copied verbatim from the provider record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Provider instance identifier (e.g. `i-0123456789abcdef0`)
    pub id: String,
    /// Private network address
    pub ip_address: String,
    /// Private DNS name
    pub private_dns: String,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        ip_address: impl Into<String>,
        private_dns: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            ip_address: ip_address.into(),
            private_dns: private_dns.into(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.id, self.ip_address, self.private_dns)
    }
}
