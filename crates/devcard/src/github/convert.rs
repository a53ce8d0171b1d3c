//! Model conversion from GitHub wire types to engine records.

use super::types::{LanguageRepositoryNode, StarRepositoryNode, UserStatsNode, count_of};
use crate::languages::{LanguageUsage, RepositoryLanguages};
use crate::stats::{AccountMetrics, RepositoryStarEntry};

/// Convert a `user` node from the stats query into per-account metrics.
///
/// `login` is the identifier the query was issued for; it stands in when the
/// payload omits the login.
pub fn to_account_metrics(user: &UserStatsNode, login: &str) -> AccountMetrics {
    let login = user
        .login
        .clone()
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| login.to_string());

    let display_name = user
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| login.clone());

    let (commits, restricted) = user
        .contributions_collection
        .as_ref()
        .map(|c| {
            (
                c.total_commit_contributions.unwrap_or(0),
                c.restricted_contributions_count.unwrap_or(0),
            )
        })
        .unwrap_or((0, 0));

    AccountMetrics {
        display_name,
        login,
        total_commit_contributions: commits,
        restricted_contributions: restricted,
        contributed_to: count_of(&user.repositories_contributed_to),
        pull_requests: count_of(&user.pull_requests),
        open_issues: count_of(&user.open_issues),
        closed_issues: count_of(&user.closed_issues),
        followers: count_of(&user.followers),
        repositories: count_of(&user.repositories),
    }
}

pub fn to_star_entry(node: &StarRepositoryNode) -> RepositoryStarEntry {
    RepositoryStarEntry {
        name: node.name.clone(),
        stars: count_of(&node.stargazers),
    }
}

/// Convert a repository node into its language edges, keeping the API's order.
pub fn to_repository_languages(node: LanguageRepositoryNode) -> RepositoryLanguages {
    let languages = node
        .languages
        .map(|conn| {
            conn.edges
                .into_iter()
                .map(|edge| LanguageUsage {
                    name: edge.node.name,
                    color: edge.node.color.filter(|c| !c.is_empty()),
                    size: edge.size,
                })
                .collect()
        })
        .unwrap_or_default();

    RepositoryLanguages {
        name: node.name,
        languages,
    }
}
