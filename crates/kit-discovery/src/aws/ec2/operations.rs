//! `InstanceProvider` backed by EC2

use super::Ec2Client;
use crate::discovery::{InstanceFilter, InstanceProvider, RawInstance};
use anyhow::Result;

impl InstanceProvider for Ec2Client {
    async fn describe_instances(&self, filters: Vec<InstanceFilter>) -> Result<Vec<RawInstance>> {
        Ec2Client::describe_instances(self, filters).await
    }
}
