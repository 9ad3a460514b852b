//! Provider trait for describing instances

use super::instance::{InstanceFilter, RawInstance};
use anyhow::Result;

/// Source of instance records.
///
/// Implementations issue one logical "describe instances" query, flatten any
/// pages or reservations, and return records in response order. Retries, if
/// any, belong to the implementation's client.
///
/// Filters are passed by value to work around mockall lifetime limitations.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait InstanceProvider: Send + Sync {
    /// Describe all instances matching every filter
    async fn describe_instances(&self, filters: Vec<InstanceFilter>) -> Result<Vec<RawInstance>>;
}
