//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format. The cleanup path relies on
//! `AwsError::is_not_found` to treat "already gone" as success.

use thiserror::Error;

/// AWS error categories for the cleanup outcome logic
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (the desired end state is already achieved)
    #[error("resource not found: {message}")]
    NotFound { message: String },

    /// Rate limit exceeded
    #[error("rate limit exceeded: {message}")]
    Throttled { message: String },

    /// Credentials lack permission for the operation
    #[error("access denied: {message}")]
    AccessDenied { message: String },

    /// The Serverless framework CLI invocation failed
    #[error("serverless CLI failed: {message}")]
    RemovalCommand { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is a throttling error
    pub fn is_throttled(&self) -> bool {
        matches!(self, AwsError::Throttled { .. })
    }
}

/// Known AWS error codes for "not found" conditions across the services
/// this tool deletes from (Lambda, DynamoDB, API Gateway, S3).
const NOT_FOUND_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "NotFoundException",
    "NoSuchBucket",
    "NoSuchKey",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
];

/// Known AWS error codes for permission failures
const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
];

/// Classify an AWS SDK error using the error code.
///
/// CloudFormation has no dedicated not-found code: `DeleteStack` on a
/// nonexistent stack reports `ValidationError` with a "does not exist"
/// message, so that combination is classified as not-found too.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { message },
        Some("ValidationError") if message.contains("does not exist") => {
            AwsError::NotFound { message }
        }
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled { message },
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => AwsError::AccessDenied { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an AWS SDK operation error.
///
/// Uses `ProvideErrorMetadata` to extract `.code()` and `.message()`. When
/// the metadata carries no message (e.g. connector-level failures), the
/// Debug representation is used so the operator still sees the cause.
pub fn classify_sdk_error<E>(error: &E) -> AwsError
where
    E: aws_sdk_s3::error::ProvideErrorMetadata + std::fmt::Debug,
{
    let code = error.code().map(|c| c.to_string());
    let message = match error.message() {
        Some(m) => m.to_string(),
        None => format!("{error:?}"),
    };

    let code = code.or_else(|| extract_error_code(&message));
    classify_aws_error(code.as_deref(), Some(&message))
}

/// All known AWS error codes, for extraction from debug strings when the
/// typed metadata is empty.
const ALL_KNOWN_CODES: &[&str] = &[
    // Not found
    "ResourceNotFoundException",
    "NotFoundException",
    "NoSuchBucket",
    "NoSuchKey",
    // Throttling
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    // Permissions
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
    // CloudFormation
    "ValidationError",
];

/// Extract an AWS error code from a debug string representation
fn extract_error_code(debug_str: &str) -> Option<String> {
    for code in ALL_KNOWN_CODES {
        if debug_str.contains(code) {
            return Some((*code).to_string());
        }
    }

    // Try to extract any code from a `code: Some("...")` pattern
    if let Some(start) = debug_str.find("code: Some(\"") {
        let rest = &debug_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    None
}
