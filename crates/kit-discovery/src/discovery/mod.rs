//! Node discovery for kit clusters
//!
//! Discovery is split into two composable steps:
//!
//! 1. [`NodeDiscovery::list_instances`] queries the provider once for every
//!    instance tagged with the cluster, in any lifecycle state.
//! 2. [`find_nodes_by_role`] keeps active instances whose `Name` tag marks
//!    the requested role and projects them into [`Node`]s.
//!
//! The role-specific entry points run both steps. Callers needing several
//! roles should use [`NodeDiscovery::get_cluster_nodes`], which lists once.

pub mod error;
pub mod filter;
pub mod instance;
pub mod provider;

pub use error::{DiscoveryError, MissingField};
pub use filter::find_nodes_by_role;
pub use instance::{InstanceFilter, InstanceTag, RawInstance};
pub use provider::InstanceProvider;

#[cfg(test)]
pub use provider::MockInstanceProvider;

use crate::config::DiscoveryConfig;
use kit_common::{Node, Role};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Nodes of a cluster grouped by role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterNodes {
    pub masters: Vec<Node>,
    pub etcd: Vec<Node>,
}

impl ClusterNodes {
    /// Nodes holding `role`
    pub fn get(&self, role: Role) -> &[Node] {
        match role {
            Role::Master => &self.masters,
            Role::Etcd => &self.etcd,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.masters.is_empty() && self.etcd.is_empty()
    }

    /// Total node count across roles
    pub fn len(&self) -> usize {
        self.masters.len() + self.etcd.len()
    }
}

/// Discovers cluster nodes through an [`InstanceProvider`].
///
/// Holds no state between calls; every call re-queries the provider.
pub struct NodeDiscovery<P> {
    provider: P,
    config: DiscoveryConfig,
}

impl<P: InstanceProvider> NodeDiscovery<P> {
    pub fn new(provider: P, config: DiscoveryConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Provider filters scoping a query to `cluster_name`
    pub fn cluster_filters(&self, cluster_name: &str) -> Vec<InstanceFilter> {
        vec![InstanceFilter::tag(&self.config.cluster_tag_key, cluster_name)]
    }

    /// List every instance tagged with the cluster, in any lifecycle state.
    ///
    /// Issues exactly one provider query. Returns [`DiscoveryError::Cancelled`]
    /// if `cancel` fires first and [`DiscoveryError::DeadlineExceeded`] if the
    /// configured request timeout elapses.
    pub async fn list_instances(
        &self,
        cancel: &CancellationToken,
        cluster_name: &str,
    ) -> Result<Vec<RawInstance>, DiscoveryError> {
        if cluster_name.trim().is_empty() {
            return Err(DiscoveryError::InvalidClusterName);
        }
        if cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }

        let filters = self.cluster_filters(cluster_name);
        debug!(cluster = %cluster_name, filters = ?filters, "Describing cluster instances");

        let describe = self.provider.describe_instances(filters);
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
            outcome = with_deadline(self.config.request_timeout, describe) => outcome,
        };

        let instances = outcome?.map_err(|e| DiscoveryError::provider(cluster_name, e))?;
        debug!(cluster = %cluster_name, count = instances.len(), "Found cluster instances");
        Ok(instances)
    }

    /// Nodes holding `role` in `cluster_name`
    pub async fn get_nodes(
        &self,
        cancel: &CancellationToken,
        cluster_name: &str,
        role: Role,
    ) -> Result<Vec<Node>, DiscoveryError> {
        let instances = self.list_instances(cancel, cluster_name).await?;
        let nodes = find_nodes_by_role(&instances, cluster_name, role, &self.config.role_tags)?;
        info!(cluster = %cluster_name, role = %role, count = nodes.len(), "Discovered nodes");
        Ok(nodes)
    }

    /// Control-plane nodes of `cluster_name`
    pub async fn get_master_nodes(
        &self,
        cancel: &CancellationToken,
        cluster_name: &str,
    ) -> Result<Vec<Node>, DiscoveryError> {
        self.get_nodes(cancel, cluster_name, Role::Master).await
    }

    /// etcd nodes of `cluster_name`
    pub async fn get_etcd_nodes(
        &self,
        cancel: &CancellationToken,
        cluster_name: &str,
    ) -> Result<Vec<Node>, DiscoveryError> {
        self.get_nodes(cancel, cluster_name, Role::Etcd).await
    }

    /// Nodes of every role from a single provider query
    pub async fn get_cluster_nodes(
        &self,
        cancel: &CancellationToken,
        cluster_name: &str,
    ) -> Result<ClusterNodes, DiscoveryError> {
        let instances = self.list_instances(cancel, cluster_name).await?;
        let role_tags = &self.config.role_tags;
        let nodes = ClusterNodes {
            masters: find_nodes_by_role(&instances, cluster_name, Role::Master, role_tags)?,
            etcd: find_nodes_by_role(&instances, cluster_name, Role::Etcd, role_tags)?,
        };
        info!(
            cluster = %cluster_name,
            masters = nodes.masters.len(),
            etcd = nodes.etcd.len(),
            "Discovered cluster nodes"
        );
        Ok(nodes)
    }
}

/// Await `fut`, failing with `DeadlineExceeded` if `limit` elapses first
async fn with_deadline<F: Future>(
    limit: Option<Duration>,
    fut: F,
) -> Result<F::Output, DiscoveryError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DiscoveryError::DeadlineExceeded(limit)),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kit_common::RoleTags;
    use mockall::predicate::eq;

    fn running(id: &str, ip: &str, name: &str) -> RawInstance {
        RawInstance::new(id, "running")
            .with_private_ip(ip)
            .with_private_dns(format!("ip-{}.ec2.internal", ip.replace('.', "-")))
            .with_tag("Name", name)
    }

    fn scenario_instance(state: &str) -> RawInstance {
        RawInstance::new("i-001", state)
            .with_private_ip("10.0.1.5")
            .with_private_dns("ip-10-0-1-5.ec2.internal")
            .with_tag("Name", "mycluster-master")
            .with_tag("kit.k8s.sh/cluster-name", "mycluster")
    }

    fn discovery_returning(instances: Vec<RawInstance>) -> NodeDiscovery<MockInstanceProvider> {
        let mut mock = MockInstanceProvider::new();
        mock.expect_describe_instances()
            .returning(move |_| Ok(instances.clone()));
        NodeDiscovery::new(mock, DiscoveryConfig::default())
    }

    #[tokio::test]
    async fn test_lists_once_with_cluster_filter() {
        let mut mock = MockInstanceProvider::new();
        mock.expect_describe_instances()
            .with(eq(vec![InstanceFilter::tag(
                "kit.k8s.sh/cluster-name",
                "mycluster",
            )]))
            .times(1)
            .returning(|_| Ok(vec![scenario_instance("stopped")]));

        let discovery = NodeDiscovery::new(mock, DiscoveryConfig::default());
        let instances = discovery
            .list_instances(&CancellationToken::new(), "mycluster")
            .await
            .unwrap();

        // Listing does not filter by state
        assert_eq!(instances, vec![scenario_instance("stopped")]);
    }

    #[tokio::test]
    async fn test_custom_cluster_tag_key() {
        let mut mock = MockInstanceProvider::new();
        mock.expect_describe_instances()
            .with(eq(vec![InstanceFilter::tag("kubernetes.io/cluster", "c1")]))
            .times(1)
            .returning(|_| Ok(vec![]));

        let config = DiscoveryConfig::default().with_cluster_tag_key("kubernetes.io/cluster");
        let discovery = NodeDiscovery::new(mock, config);
        let nodes = discovery
            .get_master_nodes(&CancellationToken::new(), "c1")
            .await
            .unwrap();
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn test_scenario_running_master() {
        let discovery = discovery_returning(vec![scenario_instance("running")]);
        let cancel = CancellationToken::new();

        let masters = discovery.get_master_nodes(&cancel, "mycluster").await.unwrap();
        assert_eq!(
            masters,
            vec![Node::new("i-001", "10.0.1.5", "ip-10-0-1-5.ec2.internal")]
        );
        let etcd = discovery.get_etcd_nodes(&cancel, "mycluster").await.unwrap();
        assert!(etcd.is_empty());
    }

    #[tokio::test]
    async fn test_scenario_terminated_master() {
        let discovery = discovery_returning(vec![scenario_instance("terminated")]);
        let cancel = CancellationToken::new();

        assert!(discovery.get_master_nodes(&cancel, "mycluster").await.unwrap().is_empty());
        assert!(discovery.get_etcd_nodes(&cancel, "mycluster").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_other_cluster() {
        let discovery =
            discovery_returning(vec![running("i-002", "10.0.2.1", "othercluster-master")]);
        let nodes = discovery
            .get_master_nodes(&CancellationToken::new(), "mycluster")
            .await
            .unwrap();
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let discovery = discovery_returning(vec![
            running("i-1", "10.0.0.1", "c1-master"),
            running("i-2", "10.0.0.2", "c1-master"),
            running("i-3", "10.0.0.3", "c1-etcd"),
        ]);
        let cancel = CancellationToken::new();

        let first = discovery.get_master_nodes(&cancel, "c1").await.unwrap();
        let second = discovery.get_master_nodes(&cancel, "c1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn test_cluster_nodes_use_one_query() {
        let mut mock = MockInstanceProvider::new();
        mock.expect_describe_instances().times(1).returning(|_| {
            Ok(vec![
                running("i-1", "10.0.0.1", "c1-master"),
                running("i-2", "10.0.0.2", "c1-etcd"),
                running("i-3", "10.0.0.3", "c1-etcd"),
            ])
        });

        let discovery = NodeDiscovery::new(mock, DiscoveryConfig::default());
        let nodes = discovery
            .get_cluster_nodes(&CancellationToken::new(), "c1")
            .await
            .unwrap();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.get(Role::Master).len(), 1);
        assert_eq!(nodes.get(Role::Etcd).len(), 2);
        assert!(!nodes.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cluster_name_skips_provider() {
        let mut mock = MockInstanceProvider::new();
        mock.expect_describe_instances().never();

        let discovery = NodeDiscovery::new(mock, DiscoveryConfig::default());
        for name in ["", "   "] {
            let err = discovery
                .get_master_nodes(&CancellationToken::new(), name)
                .await
                .unwrap_err();
            assert!(matches!(err, DiscoveryError::InvalidClusterName));
        }
    }

    #[tokio::test]
    async fn test_provider_error_is_not_an_empty_list() {
        let mut mock = MockInstanceProvider::new();
        mock.expect_describe_instances()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("UnauthorizedOperation: not allowed")));

        let discovery = NodeDiscovery::new(mock, DiscoveryConfig::default());
        let err = discovery
            .get_etcd_nodes(&CancellationToken::new(), "c1")
            .await
            .unwrap_err();

        match err {
            DiscoveryError::Provider { cluster, kind, .. } => {
                assert_eq!(cluster, "c1");
                assert!(kind.is_unauthorized());
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_query() {
        let mut mock = MockInstanceProvider::new();
        mock.expect_describe_instances().never();

        let discovery = NodeDiscovery::new(mock, DiscoveryConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = discovery.get_master_nodes(&cancel, "c1").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Cancelled));
    }

    #[tokio::test]
    async fn test_malformed_instance_fails_whole_call() {
        let discovery = discovery_returning(vec![
            running("i-1", "10.0.0.1", "c1-master"),
            RawInstance::new("i-2", "running").with_tag("Name", "c1-master"),
        ]);
        let err = discovery
            .get_master_nodes(&CancellationToken::new(), "c1")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::MalformedInstance { .. }));
    }

    #[tokio::test]
    async fn test_role_tags_come_from_config() {
        let mut mock = MockInstanceProvider::new();
        mock.expect_describe_instances()
            .returning(|_| Ok(vec![running("i-1", "10.0.0.1", "c1-etcd-instances")]));

        let config = DiscoveryConfig::default()
            .with_role_tags(RoleTags::default().with_literal(Role::Etcd, "etcd-instances"));
        let discovery = NodeDiscovery::new(mock, config);
        let nodes = discovery
            .get_etcd_nodes(&CancellationToken::new(), "c1")
            .await
            .unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_with_deadline_passes_through() {
        let value = with_deadline(Some(Duration::from_secs(5)), async { 7 })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(with_deadline(None, async { 8 }).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_with_deadline_expires() {
        let err = with_deadline(
            Some(Duration::from_millis(10)),
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::DeadlineExceeded(d) if d == Duration::from_millis(10)
        ));
    }
}
