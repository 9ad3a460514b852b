//! AWS error classification
//!
//! Provides typed errors for EC2 query failures using the `.code()` method
//! instead of string matching on Debug format where possible.

use thiserror::Error;

/// AWS error categories surfaced to discovery callers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AwsError {
    /// Credentials missing, expired, or lacking permission
    #[error("AWS authorization failed ({code})")]
    Unauthorized { code: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    Throttled,

    /// The request itself was rejected (bad filter or parameter)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Whether the caller can reasonably retry.
    ///
    /// Discovery itself never retries; this is a hint for the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AwsError::Throttled)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AwsError::Unauthorized { .. })
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            AwsError::Unauthorized { code } => suggestion_for_code(code),
            AwsError::Throttled => suggestion_for_code("Throttling"),
            AwsError::Sdk { code: Some(c), .. } => suggestion_for_code(c),
            _ => None,
        }
    }
}

/// Known AWS error codes for authentication/authorization failures
const UNAUTHORIZED_CODES: &[&str] = &[
    "AuthFailure",
    "UnauthorizedOperation",
    "InvalidClientTokenId",
    "ExpiredToken",
    "RequestExpired",
    "OptInRequired",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Known AWS error codes for rejected requests
const INVALID_REQUEST_CODES: &[&str] = &[
    "InvalidParameterValue",
    "InvalidParameterCombination",
    "InvalidFilter",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if UNAUTHORIZED_CODES.contains(&c) => AwsError::Unauthorized {
            code: c.to_string(),
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled,
        Some(c) if INVALID_REQUEST_CODES.contains(&c) => AwsError::InvalidRequest { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an error from an anyhow::Error by extracting the AWS error code.
///
/// Walks the error chain looking for a `DescribeInstances` SDK error and reads
/// its metadata. Falls back to scanning the Debug representation for a known
/// code if no typed error is found.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    use aws_sdk_ec2::error::{ProvideErrorMetadata, SdkError};
    use aws_sdk_ec2::operation::describe_instances::DescribeInstancesError;

    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<SdkError<DescribeInstancesError>>() {
            let meta = ProvideErrorMetadata::meta(e);
            if meta.code().is_some() {
                return classify_aws_error(meta.code(), meta.message());
            }
        }
    }

    // Fallback: extract error code from debug string representation
    let debug_str = format!("{:?}", error);
    if let Some(code) = extract_error_code(&debug_str) {
        return classify_aws_error(Some(&code), Some(&error.to_string()));
    }

    AwsError::Sdk {
        code: None,
        message: error.to_string(),
    }
}

/// Extract an AWS error code from a debug string representation
fn extract_error_code(debug_str: &str) -> Option<String> {
    let known = UNAUTHORIZED_CODES
        .iter()
        .chain(THROTTLING_CODES)
        .chain(INVALID_REQUEST_CODES);
    for code in known {
        if debug_str.contains(code) {
            return Some((*code).to_string());
        }
    }

    // Try to extract any code from `code: Some("...")` pattern
    if let Some(start) = debug_str.find("code: Some(\"") {
        let rest = &debug_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    None
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "AuthFailure",
        "Check that AWS credentials are configured (AWS_PROFILE or AWS_ACCESS_KEY_ID).",
    ),
    (
        "UnauthorizedOperation",
        "The credentials lack ec2:DescribeInstances permission.",
    ),
    (
        "InvalidClientTokenId",
        "The access key is not recognized. Check the configured profile.",
    ),
    ("ExpiredToken", "Session credentials expired. Log in again."),
    ("RequestExpired", "Check the local clock; requests are signed with it."),
    ("OptInRequired", "The account is not opted in to this region."),
    (
        "Throttling",
        "AWS API rate limit hit. Retry later or reduce query frequency.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}
