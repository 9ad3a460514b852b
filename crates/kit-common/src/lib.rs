//! kit-common - Shared types for kit cluster node discovery
//!
//! This crate holds the provider-agnostic vocabulary used by discovery and by
//! its callers, without any AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`node`]: Node descriptor returned by discovery
//! - [`role`]: Cluster roles and the `Name` tag vocabulary that identifies them
//! - [`tags`]: Tag keys and lifecycle states used for classification

pub mod node;
pub mod role;
pub mod tags;

// Re-export commonly used types
pub use node::Node;
pub use role::{ParseRoleError, Role, RoleTags};
