//! Error types shared by the request helper, the controller, and config.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures never reach the network and are reported per field.
//! Request failures carry a user-facing message that the controller shows as
//! a notification before returning the error to the caller.

use crate::ui::{Control, Field};

// =============================================================================
// API
// =============================================================================

/// Failures raised by [`crate::net::api::ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success body could not be decoded into the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// Login succeeded at the HTTP level but returned no token.
    #[error("login response did not include a token")]
    MissingToken,

    /// A header value (usually the stored token) is not valid ASCII.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The configured origin is not an absolute URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Text suitable for a transient notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Network(_) => "Could not reach the server. Please try again.".to_owned(),
            Self::Decode(_) => "The server sent an unexpected response.".to_owned(),
            Self::MissingToken => "Invalid credentials!".to_owned(),
            Self::InvalidHeader(_) => "The stored session is corrupt. Please log in again.".to_owned(),
            Self::InvalidBaseUrl(url) => format!("Invalid server address: {url}"),
            Self::HttpClientBuild(_) => "Could not initialize the HTTP client.".to_owned(),
        }
    }

    /// HTTP status when the backend produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

// =============================================================================
// FLOW
// =============================================================================

/// Outcome of a user-triggered flow that did not complete.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// One or more fields failed validation; no request was issued.
    #[error("invalid input: {}", join_fields(.0))]
    Invalid(Vec<Field>),

    /// The control that triggers this flow already has a request in flight.
    #[error("{0:?} is busy")]
    Busy(Control),

    /// The flow requires a stored token and there is none.
    #[error("not logged in")]
    NotAuthenticated,

    /// The request failed; the failure was already shown to the user.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The token store could not be read or written.
    #[error("token storage failed: {0}")]
    Storage(#[from] std::io::Error),
}

fn join_fields(fields: &[Field]) -> String {
    fields.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
}

// =============================================================================
// CONFIG
// =============================================================================

/// Environment values that could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be an unsigned integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be an absolute http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
}
