//! GitHub API error types and failure classification.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::{HttpHeaders, header_get};

/// Message GitHub returns for a revoked or mistyped token.
const BAD_CREDENTIALS: &str = "Bad credentials";

/// Message GitHub returns when the token's owner has been suspended.
const ACCOUNT_SUSPENDED: &str = "Sorry. Your account was suspended.";

/// Errors produced by a single call against the GitHub API.
///
/// Each variant is either retryable (the call may succeed with another
/// credential or after a pause) or permanent. See [`GitHubError::is_retryable`].
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The transport failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Primary or secondary rate limit hit, either as an HTTP status or as a
    /// `RATE_LIMITED` GraphQL error.
    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// The credential was rejected outright.
    #[error("Authentication rejected: bad credentials")]
    AuthRejected,

    /// The credential can no longer be used (suspended account).
    #[error("Token exhausted: {0}")]
    TokenExhausted(String),

    /// The request itself is invalid and will never succeed.
    #[error("Malformed query ({status}): {message}")]
    MalformedQuery { status: u16, message: String },
}

impl GitHubError {
    /// Whether retrying with the next credential could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GitHubError::Http(_)
            | GitHubError::RateLimited { .. }
            | GitHubError::TokenExhausted(_) => true,
            GitHubError::Api { status, .. } => *status >= 500,
            GitHubError::Json(_) | GitHubError::AuthRejected | GitHubError::MalformedQuery { .. } => {
                false
            }
        }
    }
}

/// Extract a short error message suitable for log lines.
///
/// Takes the first line of the rendered error.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Read the rate limit reset time from response headers, falling back to now.
pub(crate) fn rate_limit_reset(headers: &HttpHeaders) -> DateTime<Utc> {
    header_get(headers, "x-ratelimit-reset")
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
        .unwrap_or_else(Utc::now)
}

/// Pull the `message` field out of a GitHub error body, or the raw body text.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}

/// Classify a non-success HTTP response.
pub(crate) fn classify_failure(status: u16, headers: &HttpHeaders, body: &[u8]) -> GitHubError {
    let message = error_message(body);

    if message == ACCOUNT_SUSPENDED {
        return GitHubError::TokenExhausted(message);
    }

    match status {
        401 => GitHubError::AuthRejected,
        403 | 429 => {
            let exhausted = header_get(headers, "x-ratelimit-remaining") == Some("0");
            if status == 429 || exhausted || message.to_ascii_lowercase().contains("rate limit") {
                GitHubError::RateLimited {
                    reset_at: rate_limit_reset(headers),
                }
            } else if message == BAD_CREDENTIALS {
                GitHubError::AuthRejected
            } else {
                GitHubError::Api { status, message }
            }
        }
        400 | 422 => GitHubError::MalformedQuery { status, message },
        _ => GitHubError::Api { status, message },
    }
}
