//! Service-level error types for the search gateway and its backends.
//!
//! Remote indexes report failures as protocol [`SearchError`] envelopes;
//! those are folded into [`ServiceError`] here so callers see one type.

use catalog_search_protocol::{ErrorCode, SearchError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Index unreachable, misbehaving, or answering with a server error.
    #[error("search integration unavailable: {message}")]
    IntegrationUnavailable { message: String },

    /// The round-trip did not finish in time.
    #[error("search timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("unsupported protocol version: {version}")]
    UnsupportedProtocolVersion { version: String },

    #[error("index not found: {index}")]
    IndexNotFound { index: String },

    /// Missing or inconsistent search configuration.
    #[error("search configuration error: {message}")]
    Config { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ServiceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        ServiceError::IntegrationUnavailable {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Convert to protocol error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ServiceError::IntegrationUnavailable { .. } | ServiceError::Config { .. } => {
                ErrorCode::Unavailable
            }
            ServiceError::Timeout { .. } => ErrorCode::Timeout,
            ServiceError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            ServiceError::UnsupportedProtocolVersion { .. } => {
                ErrorCode::UnsupportedProtocolVersion
            }
            ServiceError::IndexNotFound { .. } => ErrorCode::IndexNotFound,
            ServiceError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// True when the failure means "search unavailable" rather than "no
    /// matches" or "bad request".
    pub fn is_unavailable(&self) -> bool {
        self.error_code().is_unavailable()
    }

    /// Build the protocol envelope for this error.
    pub fn to_protocol(&self, request_id: Option<String>) -> SearchError {
        SearchError::new(
            catalog_search_protocol::PROTOCOL_VERSION,
            request_id,
            self.error_code(),
            self.to_string(),
        )
    }
}

impl From<SearchError> for ServiceError {
    fn from(err: SearchError) -> Self {
        let message = err.error.message;
        match err.error.code {
            ErrorCode::InvalidRequest => ServiceError::InvalidRequest { message },
            ErrorCode::UnsupportedProtocolVersion => ServiceError::UnsupportedProtocolVersion {
                version: err.protocol_version,
            },
            ErrorCode::IndexNotFound => ServiceError::IndexNotFound { index: message },
            ErrorCode::Timeout => ServiceError::IntegrationUnavailable {
                message: format!("remote timeout: {message}"),
            },
            ErrorCode::Unavailable => ServiceError::IntegrationUnavailable { message },
            ErrorCode::Internal => ServiceError::Internal { message },
        }
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(ServiceError::unavailable("connection refused").is_unavailable());
        assert!(ServiceError::Timeout {
            elapsed: Duration::from_millis(50)
        }
        .is_unavailable());
        assert!(ServiceError::IndexNotFound {
            index: "works".into()
        }
        .is_unavailable());
        assert!(ServiceError::Config {
            message: "no endpoint".into()
        }
        .is_unavailable());
        assert!(!ServiceError::invalid("bad field").is_unavailable());
    }

    #[test]
    fn test_from_protocol_error() {
        let err = SearchError::new("1.0", None, ErrorCode::Unavailable, "shard offline");
        let converted = ServiceError::from(err);
        assert!(matches!(
            converted,
            ServiceError::IntegrationUnavailable { ref message } if message == "shard offline"
        ));

        let err = SearchError::new("1.0", None, ErrorCode::InvalidRequest, "unknown field");
        assert_eq!(ServiceError::from(err).error_code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_to_protocol_round_trip() {
        let err = ServiceError::Timeout {
            elapsed: Duration::from_secs(2),
        };
        let envelope = err.to_protocol(Some("req-1".into()));
        assert_eq!(envelope.error.code, ErrorCode::Timeout);
        assert_eq!(envelope.request_id.as_deref(), Some("req-1"));
    }
}
