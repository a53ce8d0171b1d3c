//! Stats records and options.

use serde::Serialize;

use crate::exclusion::ExclusionSet;
use crate::rank::{Rank, RankInput};

/// Counters for one account, as returned by the primary stats query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountMetrics {
    /// `name`, or the login when the account has no display name.
    pub display_name: String,
    pub login: String,
    pub total_commit_contributions: u64,
    /// Private contributions, only counted on request.
    pub restricted_contributions: u64,
    pub contributed_to: u64,
    pub pull_requests: u64,
    pub open_issues: u64,
    pub closed_issues: u64,
    pub followers: u64,
    pub repositories: u64,
}

/// One owned repository and its star count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryStarEntry {
    pub name: String,
    pub stars: u64,
}

/// Totals across every requested account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStats {
    pub name: String,
    #[serde(rename = "totalPRs")]
    pub total_prs: u64,
    pub total_commits: u64,
    pub total_issues: u64,
    pub total_stars: u64,
    pub total_repos: u64,
    pub total_followers: u64,
    pub contributed_to: u64,
    pub rank: Rank,
}

impl Default for AggregatedStats {
    fn default() -> Self {
        Self {
            name: String::new(),
            total_prs: 0,
            total_commits: 0,
            total_issues: 0,
            total_stars: 0,
            total_repos: 0,
            total_followers: 0,
            contributed_to: 0,
            rank: Rank::default(),
        }
    }
}

impl AggregatedStats {
    pub(crate) fn rank_input(&self) -> RankInput {
        RankInput {
            total_commits: self.total_commits,
            total_repos: self.total_repos,
            followers: self.total_followers,
            contributions: self.contributed_to,
            stargazers: self.total_stars,
            prs: self.total_prs,
            issues: self.total_issues,
        }
    }
}

/// Options for [`fetch_stats`](super::fetch_stats).
///
/// # Example
///
/// ```ignore
/// let options = StatsOptions::new("octocat,hubot")
///     .include_all_commits(true)
///     .exclude_repos(["dotfiles"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Comma-delimited account list.
    pub usernames: String,
    /// Add each account's restricted contribution count to its commits.
    pub include_private_contributions: bool,
    /// Count commits through the commit search instead of the contribution counter.
    pub include_all_commits: bool,
    /// Repositories left out of the star total.
    pub exclude_repos: Vec<String>,
}

impl StatsOptions {
    pub fn new(usernames: impl Into<String>) -> Self {
        Self {
            usernames: usernames.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn include_private_contributions(mut self, include: bool) -> Self {
        self.include_private_contributions = include;
        self
    }

    #[must_use]
    pub fn include_all_commits(mut self, include: bool) -> Self {
        self.include_all_commits = include;
        self
    }

    #[must_use]
    pub fn exclude_repos<I, S>(mut self, repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_repos = repos.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::from_names(&self.exclude_repos)
    }
}
