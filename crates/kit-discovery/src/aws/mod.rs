//! AWS client modules for discovery
//!
//! - context: shared SDK configuration
//! - ec2: instance queries backing [`crate::discovery::InstanceProvider`]
//! - error: AWS error code classification

pub mod context;
pub mod ec2;
pub mod error;

pub use context::{AwsContext, FromAwsContext};
pub use ec2::Ec2Client;
pub use error::{AwsError, classify_anyhow_error, classify_aws_error};
