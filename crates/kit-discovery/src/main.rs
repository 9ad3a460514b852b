//! kit-discovery: list the master and etcd nodes of a kit cluster

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use kit_common::{Node, Role, RoleTags};
use kit_discovery::aws::{AwsContext, Ec2Client, FromAwsContext};
use kit_discovery::config::{AwsConfig, DEFAULT_REGION, DiscoveryConfig};
use kit_discovery::{ClusterNodes, DiscoveryError, InstanceProvider, NodeDiscovery};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "kit-discovery")]
#[command(about = "Discover the master and etcd nodes of a kit cluster on EC2")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List cluster nodes by role
    Nodes(NodesArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RoleArg {
    Master,
    Etcd,
    All,
}

impl RoleArg {
    /// The single role requested, `None` for all roles
    fn role(self) -> Option<Role> {
        match self {
            RoleArg::Master => Some(Role::Master),
            RoleArg::Etcd => Some(Role::Etcd),
            RoleArg::All => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(clap::Args, Debug)]
struct NodesArgs {
    /// Cluster name
    #[arg(short, long, env = "KIT_CLUSTER_NAME")]
    cluster: String,

    /// Role to list
    #[arg(short, long, value_enum, default_value = "all")]
    role: RoleArg,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long)]
    aws_profile: Option<String>,

    /// Tag key whose value is the cluster name
    #[arg(long, env = "KIT_CLUSTER_TAG_KEY", default_value = kit_common::tags::TAG_CLUSTER_NAME)]
    cluster_tag_key: String,

    /// `Name` tag literal for master nodes (`<cluster>-<literal>`)
    #[arg(long, env = "KIT_MASTER_TAG", default_value = kit_common::role::DEFAULT_MASTER_LITERAL)]
    master_tag: String,

    /// `Name` tag literal for etcd nodes (`<cluster>-<literal>`)
    #[arg(long, env = "KIT_ETCD_TAG", default_value = kit_common::role::DEFAULT_ETCD_LITERAL)]
    etcd_tag: String,

    /// Timeout in seconds for the EC2 query
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

impl From<&NodesArgs> for DiscoveryConfig {
    fn from(args: &NodesArgs) -> Self {
        let role_tags = RoleTags {
            master: args.master_tag.clone(),
            etcd: args.etcd_tag.clone(),
        };
        let config = DiscoveryConfig::default()
            .with_cluster_tag_key(&args.cluster_tag_key)
            .with_role_tags(role_tags);
        match args.timeout_secs {
            Some(secs) => config.with_request_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

impl From<&NodesArgs> for AwsConfig {
    fn from(args: &NodesArgs) -> Self {
        Self {
            region: args.region.clone(),
            aws_profile: args.aws_profile.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if let Some(hint) = e
        .downcast_ref::<DiscoveryError>()
        .and_then(DiscoveryError::suggestion)
    {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {hint}");
    }
}

fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into())
        .add_directive("aws_config=warn".parse()?)
        .add_directive("aws_smithy_runtime=warn".parse()?)
        .add_directive("aws_sdk_ec2=warn".parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing()?;

    match args.command {
        Command::Nodes(nodes_args) => handle_nodes(&nodes_args).await,
    }
}

/// Handle the nodes command
async fn handle_nodes(args: &NodesArgs) -> Result<()> {
    let discovery_config = DiscoveryConfig::from(args);
    discovery_config.validate()?;
    let aws_config = AwsConfig::from(args);

    if let Some(profile) = &aws_config.aws_profile {
        info!(profile = %profile, "Using AWS profile");
    }
    info!(
        cluster = %args.cluster,
        role = ?args.role,
        region = %aws_config.region,
        "Discovering cluster nodes"
    );

    let aws = AwsContext::with_profile(&aws_config.region, aws_config.aws_profile.as_deref()).await;
    let discovery = NodeDiscovery::new(Ec2Client::from_context(&aws), discovery_config);

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling discovery");
            cancel_on_signal.cancel();
        }
    });

    let rows = discover_rows(&discovery, &cancel, &args.cluster, args.role).await?;

    match args.format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => print_table(&rows),
    }
    Ok(())
}

/// Discover nodes for the requested role.
///
/// A single role is filtered on its own, so instances of the other role never
/// affect the result.
async fn discover_rows<P: InstanceProvider>(
    discovery: &NodeDiscovery<P>,
    cancel: &CancellationToken,
    cluster: &str,
    role: RoleArg,
) -> Result<Vec<(Role, Node)>, DiscoveryError> {
    match role.role() {
        Some(role) => {
            let nodes = discovery.get_nodes(cancel, cluster, role).await?;
            Ok(nodes.into_iter().map(|n| (role, n)).collect())
        }
        None => {
            let nodes = discovery.get_cluster_nodes(cancel, cluster).await?;
            Ok(cluster_rows(nodes))
        }
    }
}

fn cluster_rows(nodes: ClusterNodes) -> Vec<(Role, Node)> {
    let ClusterNodes { masters, etcd } = nodes;
    masters
        .into_iter()
        .map(|n| (Role::Master, n))
        .chain(etcd.into_iter().map(|n| (Role::Etcd, n)))
        .collect()
}

fn print_json(rows: &[(Role, Node)]) -> Result<()> {
    let json: Vec<_> = rows
        .iter()
        .map(|(role, node)| {
            serde_json::json!({
                "role": role,
                "id": node.id,
                "ip_address": node.ip_address,
                "private_dns": node.private_dns,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_table(rows: &[(Role, Node)]) {
    if rows.is_empty() {
        println!("No nodes found matching criteria.");
        return;
    }

    println!("{:<8} {:<21} {:<16} {:<40}", "ROLE", "ID", "IP", "DNS");
    println!("{}", "-".repeat(85));
    for (role, node) in rows {
        println!(
            "{:<8} {:<21} {:<16} {:<40}",
            role.as_str(),
            node.id,
            node.ip_address,
            node.private_dns
        );
    }
    println!("\nTotal: {} nodes", rows.len());
}
