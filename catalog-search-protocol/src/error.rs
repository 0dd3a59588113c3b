//! Protocol error envelope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request was malformed or used unsupported parameters.
    InvalidRequest,
    /// The request's protocol version is not supported.
    UnsupportedProtocolVersion,
    /// The named index does not exist.
    IndexNotFound,
    /// The index did not answer within the allowed time.
    Timeout,
    /// The index is unreachable or misconfigured.
    Unavailable,
    /// Anything else.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::UnsupportedProtocolVersion => "UNSUPPORTED_PROTOCOL_VERSION",
            ErrorCode::IndexNotFound => "INDEX_NOT_FOUND",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::Internal => "INTERNAL",
        }
    }

    /// Whether a caller should read this as "search unavailable" rather than
    /// a problem with its own request.
    pub fn is_unavailable(self) -> bool {
        matches!(
            self,
            ErrorCode::IndexNotFound
                | ErrorCode::Timeout
                | ErrorCode::Unavailable
                | ErrorCode::Internal
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error code and human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchError {
    pub protocol_version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    pub error: ErrorDetail,
}

impl SearchError {
    pub fn new(
        protocol_version: impl Into<String>,
        request_id: Option<String>,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            protocol_version: protocol_version.into(),
            request_id,
            error: ErrorDetail {
                code,
                message: message.into(),
            },
        }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error.code, self.error.message)
    }
}

impl std::error::Error for SearchError {}
