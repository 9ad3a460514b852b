//! DescribeInstances and record conversion

use super::Ec2Client;
use crate::discovery::{InstanceFilter, InstanceTag, RawInstance};
use anyhow::{Context, Result};
use aws_sdk_ec2::operation::describe_instances::DescribeInstancesOutput;
use aws_sdk_ec2::types::{Filter, Instance, Tag};
use tracing::debug;

impl Ec2Client {
    /// Describe every instance matching all `filters`.
    ///
    /// Walks all result pages and flattens reservations, keeping response
    /// order. Instances in any state are returned.
    pub async fn describe_instances(
        &self,
        filters: Vec<InstanceFilter>,
    ) -> Result<Vec<RawInstance>> {
        let filters: Vec<Filter> = filters.into_iter().map(to_sdk_filter).collect();

        let mut pages = self
            .client
            .describe_instances()
            .set_filters(Some(filters))
            .into_paginator()
            .send();

        let mut instances = Vec::new();
        let mut page_count = 0usize;
        while let Some(page) = pages.next().await {
            let page = page.context("Failed to describe instances")?;
            page_count += 1;
            instances.extend(page_instances(&page));
        }

        debug!(
            count = instances.len(),
            pages = page_count,
            "Described EC2 instances"
        );
        Ok(instances)
    }
}

/// Instances of one result page, reservation by reservation, in response order
fn page_instances(page: &DescribeInstancesOutput) -> impl Iterator<Item = RawInstance> + '_ {
    page.reservations()
        .iter()
        .flat_map(|reservation| reservation.instances())
        .map(RawInstance::from)
}

fn to_sdk_filter(filter: InstanceFilter) -> Filter {
    Filter::builder()
        .name(filter.name)
        .set_values(Some(filter.values))
        .build()
}

impl From<&Tag> for InstanceTag {
    fn from(tag: &Tag) -> Self {
        InstanceTag::new(
            tag.key().unwrap_or_default(),
            tag.value().unwrap_or_default(),
        )
    }
}

impl From<&Instance> for RawInstance {
    fn from(instance: &Instance) -> Self {
        RawInstance {
            instance_id: instance.instance_id().map(str::to_string),
            state: instance
                .state()
                .and_then(|s| s.name())
                .map(|name| name.as_str().to_string())
                .unwrap_or_default(),
            private_ip_address: instance.private_ip_address().map(str::to_string),
            private_dns_name: instance.private_dns_name().map(str::to_string),
            tags: instance.tags().iter().map(InstanceTag::from).collect(),
        }
    }
}
