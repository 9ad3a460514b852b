//! Tag keys and lifecycle states used to classify cluster instances
//!
//! ## Tag Schema
//!
//! | Tag Key | Description |
//! |---------|-------------|
//! | `kit.k8s.sh/cluster-name` | Cluster the instance belongs to (provider-side filter) |
//! | `Name` | `<cluster>-<role>` role marker (client-side filter) |

/// Default tag key scoping the provider query to one cluster
pub const TAG_CLUSTER_NAME: &str = "kit.k8s.sh/cluster-name";

/// Tag key carrying the `<cluster>-<role>` marker
pub const TAG_NAME: &str = "Name";

/// Instance lifecycle states
pub mod state {
    /// Instance is booting
    pub const PENDING: &str = "pending";

    /// Instance is up
    pub const RUNNING: &str = "running";

    /// States a node must be in to be discovered
    pub const ACTIVE: &[&str] = &[PENDING, RUNNING];

    /// Whether `state` counts as active. Exact, case-sensitive match.
    pub fn is_active(state: &str) -> bool {
        ACTIVE.contains(&state)
    }
}
