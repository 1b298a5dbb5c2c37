//! # Gateway Error Types
//!
//! Error types for everything that crosses the network or touches the
//! config file.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Gateway Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  RequestFailed  │  │  MalformedResponse      │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │                         │ │
//! │  │  ConfigLoad/Save│  │  Server/Client  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │    Booking      │  │      Core                                   │  │
//! │  │                 │  │                                             │  │
//! │  │  TicketRejected │  │  Core(CoreError): preconditions failed      │  │
//! │  │                 │  │  before anything was sent                   │  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use marina_core::{CoreError, Leg};
use thiserror::Error;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error type covering every external failure.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum GatewayError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid gateway configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid service URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// No response within the configured time.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The server answered with a 5xx status.
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// The server refused the request with a 4xx status.
    #[error("Request rejected {status}: {message}")]
    ClientError { status: u16, message: String },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Response body could not be understood.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    // =========================================================================
    // Booking Errors
    // =========================================================================
    /// The booking API refused to create the ticket.
    #[error("Ticket for {leg} leg rejected ({status}): {message}")]
    TicketRejected {
        leg: Leg,
        status: u16,
        message: String,
    },

    // =========================================================================
    // Core Errors
    // =========================================================================
    /// A booking precondition failed before any request was sent.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::from_status(status.as_u16(), err.to_string())
        } else {
            GatewayError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::MalformedResponse(err.to_string())
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        GatewayError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for GatewayError {
    fn from(err: toml::de::Error) -> Self {
        GatewayError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for GatewayError {
    fn from(err: toml::ser::Error) -> Self {
        GatewayError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl GatewayError {
    /// Maps a non-success HTTP status to the matching variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 {
            GatewayError::ServerError { status, message }
        } else {
            GatewayError::ClientError { status, message }
        }
    }

    /// Returns true if the same request may succeed when sent again.
    ///
    /// ## Retryable Errors
    /// - Transport failures (network issues)
    /// - Timeouts
    /// - 5xx responses
    ///
    /// ## Non-Retryable Errors
    /// - Configuration errors
    /// - Malformed responses
    /// - Ticket rejections and core preconditions
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::RequestFailed(_)
                | GatewayError::Timeout(_)
                | GatewayError::ServerError { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidConfig(_)
                | GatewayError::InvalidUrl(_)
                | GatewayError::ConfigLoadFailed(_)
                | GatewayError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(GatewayError::RequestFailed("connection reset".into()).is_retryable());
        assert!(GatewayError::Timeout(2000).is_retryable());
        assert!(GatewayError::ServerError {
            status: 503,
            message: "maintenance".into()
        }
        .is_retryable());

        assert!(!GatewayError::InvalidConfig("bad config".into()).is_retryable());
        assert!(!GatewayError::MalformedResponse("not json".into()).is_retryable());
        assert!(!GatewayError::TicketRejected {
            leg: Leg::Departure,
            status: 409,
            message: "seat taken".into(),
        }
        .is_retryable());
    }

    #[test]
    fn test_status_mapping() {
        assert!(GatewayError::from_status(502, "bad gateway").is_retryable());
        assert!(matches!(
            GatewayError::from_status(404, "no such voyage"),
            GatewayError::ClientError { status: 404, .. }
        ));
        assert!(!GatewayError::from_status(400, "bad query").is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = GatewayError::TicketRejected {
            leg: Leg::Return,
            status: 409,
            message: "seat U1A already sold".into(),
        };
        assert_eq!(
            err.to_string(),
            "Ticket for return leg rejected (409): seat U1A already sold"
        );
    }

    #[test]
    fn test_core_error_passes_through() {
        let err: GatewayError = CoreError::NoReturnLeg.into();
        assert_eq!(err.to_string(), CoreError::NoReturnLeg.to_string());
        assert!(!err.is_retryable());
    }
}
