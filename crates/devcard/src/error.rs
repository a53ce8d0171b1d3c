//! Errors surfaced by the aggregation entry points.

use thiserror::Error;

use crate::github::{GitHubError, GraphQlError, QueryError};

/// Width used to shorten remote error messages for display.
pub const MESSAGE_WIDTH: usize = 90;

/// Failure of a whole aggregation run.
///
/// No partial statistics are ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A required input was absent. Raised before any network activity.
    #[error("Missing params {} make sure you pass the parameters in URL", quoted(.params))]
    MissingParameter { params: Vec<&'static str> },

    /// The remote API reports the account does not exist.
    #[error("{message}")]
    UserNotFound { message: String },

    /// The remote API returned a structured error with a message.
    #[error("{message}")]
    RemoteQuery { message: String },

    /// The remote API returned an error payload with nothing actionable in it.
    #[error("Something went wrong while trying to retrieve the {context} data using the GraphQL API.")]
    GraphQueryFailure { context: &'static str },

    /// Transient failures persisted across the retry ceiling.
    #[error("Maximum retries exceeded after {attempts} attempts")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: GitHubError,
    },

    /// A permanent transport or HTTP failure.
    #[error(transparent)]
    RemoteCall(#[from] GitHubError),

    /// The credential pool is empty.
    #[error("No GitHub credentials configured")]
    NoCredentials,
}

fn quoted(params: &[&'static str]) -> String {
    params
        .iter()
        .map(|p| format!("\"{p}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

impl StatsError {
    /// Map a GraphQL `errors` array onto the three-tier taxonomy.
    ///
    /// Precedence: not-found, then any message, then the generic failure.
    /// Only the first entry is inspected.
    pub fn from_query_errors(errors: &[GraphQlError], context: &'static str) -> Self {
        let Some(first) = errors.first() else {
            return StatsError::GraphQueryFailure { context };
        };

        match first.classify() {
            QueryError::NotFound { message } => StatsError::UserNotFound {
                message: message.unwrap_or_else(|| "Could not fetch user.".to_string()),
            },
            QueryError::Described { message }
            | QueryError::RateLimited {
                message: Some(message),
            } => StatsError::RemoteQuery {
                message: wrap_first_line(&message, MESSAGE_WIDTH),
            },
            QueryError::RateLimited { message: None } | QueryError::Unspecified => {
                StatsError::GraphQueryFailure { context }
            }
        }
    }

    /// Error for a response that resolved `user` to null without saying why.
    pub fn user_not_found(login: &str) -> Self {
        StatsError::UserNotFound {
            message: format!("Could not resolve to a User with the login of '{login}'."),
        }
    }
}

/// Greedily word-wrap `text` to `width` columns and keep the first line.
///
/// An ellipsis marks that text was dropped. A single word longer than
/// `width` is kept whole.
pub fn wrap_first_line(text: &str, width: usize) -> String {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return String::new();
    };

    let mut line = first.to_string();
    let mut columns = first.chars().count();
    let mut truncated = false;
    for word in words {
        let word_columns = word.chars().count();
        if columns + 1 + word_columns > width {
            truncated = true;
            break;
        }
        line.push(' ');
        line.push_str(word);
        columns += 1 + word_columns;
    }

    if truncated {
        line.push_str("...");
    }
    line
}
