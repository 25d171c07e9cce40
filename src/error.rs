//! Error types for Instant Birthdays
//!
//! All errors in the application are converted to `AppError`.
//! Nothing is fatal to a request: `IntoResponse` sends the browser back
//! to the login page with a human-readable message.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;

/// Outbound call to the Clever API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamCall {
    /// POST to the OAuth token endpoint
    TokenExchange,
    /// GET /me
    Profile,
    /// GET /teachers/{id}/students
    Roster,
}

impl UpstreamCall {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamCall::TokenExchange => "token_exchange",
            UpstreamCall::Profile => "profile",
            UpstreamCall::Roster => "roster",
        }
    }
}

impl fmt::Display for UpstreamCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// No session for this browser
    #[error("Authentication required")]
    Unauthorized,

    /// The authorization server redirected back with `error=...`
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// Callback reached without a `code` parameter
    #[error("Missing authorization code")]
    MissingCode,

    /// Upstream answered with a non-2xx status
    #[error("{call} request failed: HTTP {status}")]
    UpstreamStatus { call: UpstreamCall, status: StatusCode },

    /// Upstream could not be reached or the body could not be read
    #[error("{call} request failed: {source}")]
    UpstreamTransport {
        call: UpstreamCall,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream returned a record we cannot use
    #[error("Malformed {call} record: {detail}")]
    MalformedRecord { call: UpstreamCall, detail: String },

    /// Profile type is neither student nor teacher
    #[error("Role not supported: {0}")]
    UnsupportedRole(String),

    /// Teacher has no students
    #[error("Roster is empty")]
    EmptyRoster,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Build a malformed-record error for the given call
    pub fn malformed(call: UpstreamCall, detail: impl Into<String>) -> Self {
        AppError::MalformedRecord {
            call,
            detail: detail.into(),
        }
    }

    /// Which upstream call this error came from, if any
    pub fn upstream_call(&self) -> Option<UpstreamCall> {
        match self {
            AppError::UpstreamStatus { call, .. }
            | AppError::UpstreamTransport { call, .. }
            | AppError::MalformedRecord { call, .. } => Some(*call),
            _ => None,
        }
    }

    /// Message shown on the login page
    pub fn user_message(&self) -> &'static str {
        const LOGIN_FAILED: &str = "There was an error with Instant Login.";

        match self {
            AppError::Unauthorized => "Please sign-in first.",
            AppError::AuthorizationDenied(_) | AppError::MissingCode => LOGIN_FAILED,
            AppError::EmptyRoster => "You don't have any students.",
            AppError::UnsupportedRole(_) => "Only teachers and students can login.",
            AppError::Config(_) | AppError::Internal(_) => {
                "Something went wrong. Please try again."
            }
            AppError::UpstreamStatus { call, .. }
            | AppError::UpstreamTransport { call, .. }
            | AppError::MalformedRecord { call, .. } => match call {
                UpstreamCall::TokenExchange => LOGIN_FAILED,
                UpstreamCall::Profile => "There was an error retrieving your personal data.",
                UpstreamCall::Roster => "There was an error retrieving student data.",
            },
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::AuthorizationDenied(_) => "authorization_denied",
            AppError::MissingCode => "missing_code",
            AppError::UpstreamStatus { .. } => "upstream_status",
            AppError::UpstreamTransport { .. } => "upstream_transport",
            AppError::MalformedRecord { .. } => "malformed_record",
            AppError::UnsupportedRole(_) => "unsupported_role",
            AppError::EmptyRoster => "empty_roster",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

/// Location of the login page carrying `message`
pub fn login_redirect_location(message: &str) -> String {
    format!("/?error={}", urlencoding::encode(message))
}

impl IntoResponse for AppError {
    /// Convert error to a redirect back to the login page
    fn into_response(self) -> Response {
        let error_type = self.error_type();

        match &self {
            AppError::Unauthorized => tracing::debug!("Unauthenticated request"),
            AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, error_type, "Request failed")
            }
            _ => tracing::warn!(error = %self, error_type, "Request failed"),
        }

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        Redirect::to(&login_redirect_location(self.user_message())).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
