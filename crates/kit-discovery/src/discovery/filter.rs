//! Role filter and node projection
//!
//! Pure functions over one batch of instance records. No I/O.

use super::error::{DiscoveryError, MissingField};
use super::instance::RawInstance;
use kit_common::tags::{TAG_NAME, state};
use kit_common::{Node, Role, RoleTags};
use tracing::{debug, trace};

/// Select the nodes holding `role` in `cluster_name`.
///
/// An instance matches when its state is exactly `pending` or `running` and a
/// `Name` tag equals `<cluster_name>-<role literal>`. Every matching tag adds
/// a node, so an instance carrying the same `Name` twice is returned twice.
/// Output follows input order.
///
/// Fails with [`DiscoveryError::MalformedInstance`] if a matched instance has
/// no id, private IP, or private DNS name.
pub fn find_nodes_by_role(
    instances: &[RawInstance],
    cluster_name: &str,
    role: Role,
    role_tags: &RoleTags,
) -> Result<Vec<Node>, DiscoveryError> {
    let expected = role_tags.name_tag_value(cluster_name, role);
    let mut nodes = Vec::new();

    for instance in instances {
        if !state::is_active(&instance.state) {
            trace!(
                instance = %instance.display_id(),
                state = %instance.state,
                "Skipping inactive instance"
            );
            continue;
        }

        for value in instance.tag_values(TAG_NAME) {
            if value == expected {
                nodes.push(project(instance)?);
            }
        }
    }

    debug!(
        cluster = %cluster_name,
        role = %role,
        scanned = instances.len(),
        matched = nodes.len(),
        "Filtered instances by role"
    );
    Ok(nodes)
}

/// Build a node from a matched instance, copying addressing verbatim.
pub fn project(instance: &RawInstance) -> Result<Node, DiscoveryError> {
    let id = required(instance.instance_id.as_deref()).ok_or_else(|| {
        DiscoveryError::MalformedInstance {
            instance_id: instance.display_id().to_string(),
            field: MissingField::InstanceId,
        }
    })?;
    let malformed = |field| DiscoveryError::MalformedInstance {
        instance_id: id.to_string(),
        field,
    };

    let ip = required(instance.private_ip_address.as_deref())
        .ok_or_else(|| malformed(MissingField::PrivateIpAddress))?;
    let dns = required(instance.private_dns_name.as_deref())
        .ok_or_else(|| malformed(MissingField::PrivateDnsName))?;

    Ok(Node::new(id, ip, dns))
}

/// EC2 reports missing addressing as either absent or empty
fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
