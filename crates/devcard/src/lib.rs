//! devcard - GitHub profile statistics aggregation.
//!
//! This library gathers one or more GitHub accounts' public activity into a
//! single stats record with a percentile rank, and a size-ordered profile of
//! the languages in their repositories. Rendering is left to the caller.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use devcard::{GitHubClient, LanguageOptions, StatsOptions, TokenPool};
//! use devcard::github::{DEFAULT_TIMEOUT, GITHUB_API_URL};
//!
//! let client = GitHubClient::new(GITHUB_API_URL, DEFAULT_TIMEOUT, None)?;
//! let pool = Arc::new(TokenPool::new(["ghp_first", "ghp_second"]));
//!
//! let stats = devcard::fetch_stats(&client, &pool, &StatsOptions::new("octocat,hubot")).await?;
//! let languages =
//!     devcard::fetch_top_languages(&client, &pool, &LanguageOptions::new("octocat")).await?;
//! ```

pub mod error;
pub mod exclusion;
pub mod github;
pub mod http;
pub mod languages;
pub mod rank;
pub mod rate_limit;
pub mod retry;
pub mod stats;

pub use error::StatsError;
pub use exclusion::ExclusionSet;
pub use github::{GitHubClient, GitHubError};
pub use languages::{LanguageOptions, LanguageUsage, TopLanguages, fetch_top_languages};
pub use rank::{Rank, RankLevel, calculate_rank};
pub use rate_limit::ApiRateLimiter;
pub use retry::{RetryConfig, TokenPool};
pub use stats::{AggregatedStats, StatsOptions, fetch_stats};
