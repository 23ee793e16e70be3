//! Error types for the gateway adapter

use thiserror::Error;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter errors
///
/// Declined or rejected transactions are not errors: they come back as an
/// unsuccessful [`crate::Response`]. Only pre-flight validation and
/// infrastructure failures surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// Local, pre-flight validation failure. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// Any failure on the dispatch path (bad verb, connection failure,
    /// unreadable response body).
    #[error("{0}")]
    InvalidRequest(String),

    /// TLS 1.2 handshake with the processor failed
    #[error("{0}")]
    TlsHandshake(String),

    /// Gateway timed out. Raised after the reversal attempt (if any) completed.
    #[error("Gateway timed out")]
    GatewayTimeout {
        /// Reference the reversal was keyed by, when one was known
        transaction_reference: Option<String>,
        /// Whether a reversal request was sent
        reversal_attempted: bool,
    },

    /// The reversal sent after a timeout itself failed
    #[error("Error occurred while reversing a charge due to gateway timeout: {reason}")]
    ReversalFailed {
        /// Reference the reversal was keyed by
        transaction_reference: String,
        /// Underlying failure
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// XML error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Collapse this error into the single outward-facing dispatch shape.
    ///
    /// Validation, TLS-handshake and timeout outcomes keep their identity so
    /// callers can branch on them; everything else becomes `InvalidRequest`
    /// carrying the original message.
    pub fn into_dispatch_error(self) -> Self {
        match self {
            Error::Validation(_)
            | Error::InvalidRequest(_)
            | Error::TlsHandshake(_)
            | Error::GatewayTimeout { .. }
            | Error::ReversalFailed { .. } => self,
            other => Error::InvalidRequest(other.to_string()),
        }
    }

    /// True for the gateway-timeout family (with or without a failed reversal)
    pub fn is_gateway_timeout(&self) -> bool {
        matches!(
            self,
            Error::GatewayTimeout { .. } | Error::ReversalFailed { .. }
        )
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_wraps_other_kinds() {
        let err = Error::Xml("unexpected end of stream".to_string()).into_dispatch_error();
        assert!(matches!(err, Error::InvalidRequest(ref msg) if msg.contains("unexpected end")));
    }

    #[test]
    fn test_dispatch_error_keeps_timeout_identity() {
        let err = Error::GatewayTimeout {
            transaction_reference: Some("1234".to_string()),
            reversal_attempted: true,
        }
        .into_dispatch_error();
        assert!(err.is_gateway_timeout());
        assert_eq!(err.to_string(), "Gateway timed out");
    }
}
