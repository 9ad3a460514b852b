//! EC2 instance queries

mod instances;
mod operations;

use crate::aws::context::{AwsContext, FromAwsContext};
use anyhow::Result;
use aws_sdk_ec2::Client;

/// EC2 client for reading cluster instances
pub struct Ec2Client {
    pub(crate) client: Client,
}

impl Ec2Client {
    /// Create a new EC2 client (loads AWS config from environment)
    pub async fn new(region: &str) -> Result<Self> {
        let ctx = AwsContext::new(region).await;
        Ok(Self::from_context(&ctx))
    }
}

impl FromAwsContext for Ec2Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
        }
    }
}
