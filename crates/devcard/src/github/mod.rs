//! GitHub API access.
//!
//! # Module Structure
//!
//! - [`error`] - Error types and HTTP failure classification
//! - [`types`] - GraphQL and REST wire types
//! - [`queries`] - GraphQL documents
//! - [`client`] - The client and its retrying call helpers
//! - [`convert`] - Conversion from wire types to engine records

mod client;
mod convert;
mod error;
pub mod queries;
pub mod types;

pub use error::{GitHubError, short_error_message};

pub use types::{GraphQlError, GraphQlResponse, QueryError};

pub use client::{COMMIT_SEARCH_ACCEPT, DEFAULT_TIMEOUT, GITHUB_API_URL, GitHubClient};

pub use convert::{to_account_metrics, to_repository_languages, to_star_entry};
