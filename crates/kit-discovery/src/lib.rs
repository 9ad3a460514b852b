//! kit-discovery - EC2 node discovery for kit clusters
//!
//! Finds the instances of a cluster through EC2 and classifies them into
//! control-plane (master) and etcd nodes using their `Name` tags.
//!
//! ```ignore
//! let aws = AwsContext::new("us-west-2").await;
//! let discovery = NodeDiscovery::new(Ec2Client::from_context(&aws), DiscoveryConfig::default());
//! let masters = discovery.get_master_nodes(&CancellationToken::new(), "mycluster").await?;
//! ```

pub mod aws;
pub mod config;
pub mod discovery;

pub use config::{AwsConfig, ConfigError, DiscoveryConfig};
pub use discovery::{ClusterNodes, DiscoveryError, InstanceProvider, NodeDiscovery, RawInstance};
pub use kit_common::{Node, Role, RoleTags};
