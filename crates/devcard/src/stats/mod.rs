//! Multi-account stats aggregation.
//!
//! [`fetch_stats`] walks the account list in order. For each account it runs
//! the primary stats query, optionally the commit search, and the star
//! paginator, folding everything into one [`AggregatedStats`]. The first
//! unrecoverable error aborts the run and nothing accumulated so far is
//! returned.
//!
//! # Example
//!
//! ```ignore
//! use devcard::github::{GitHubClient, GITHUB_API_URL, DEFAULT_TIMEOUT};
//! use devcard::retry::TokenPool;
//! use devcard::stats::{fetch_stats, StatsOptions};
//!
//! let client = GitHubClient::new(GITHUB_API_URL, DEFAULT_TIMEOUT, None)?;
//! let pool = TokenPool::new([std::env::var("GITHUB_TOKEN")?]);
//! let stats = fetch_stats(&client, &pool, &StatsOptions::new("octocat")).await?;
//! println!("{} is ranked {}", stats.name, stats.rank.level);
//! ```

mod commits;
mod names;
mod stars;
mod types;

pub use commits::{MAX_USERNAME_LEN, fetch_total_commits, is_valid_username};
pub use names::combine_names;
pub use stars::{STAR_PAGE_LIMIT, STAR_PAGE_SIZE, fetch_total_stars, sum_stars};
pub use types::{AccountMetrics, AggregatedStats, RepositoryStarEntry, StatsOptions};

use serde_json::json;

use crate::error::StatsError;
use crate::github::queries::USER_STATS;
use crate::github::types::UserStatsData;
use crate::github::{GitHubClient, to_account_metrics};
use crate::rank::calculate_rank;
use crate::retry::TokenPool;

/// Split a comma-delimited account list.
///
/// Entries are trimmed and blanks dropped. An empty result is a
/// [`StatsError::MissingParameter`].
pub fn split_usernames(usernames: &str) -> Result<Vec<&str>, StatsError> {
    let logins: Vec<&str> = usernames
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if logins.is_empty() {
        return Err(StatsError::MissingParameter {
            params: vec!["username"],
        });
    }
    Ok(logins)
}

/// Run the primary stats query for one account.
pub async fn fetch_account_metrics(
    client: &GitHubClient,
    pool: &TokenPool,
    login: &str,
) -> Result<AccountMetrics, StatsError> {
    let response = client
        .query::<UserStatsData>(pool, USER_STATS, json!({ "login": login }), login)
        .await?;

    if response.has_errors() {
        return Err(StatsError::from_query_errors(&response.errors, "stats"));
    }

    match response.data.and_then(|d| d.user) {
        Some(user) => Ok(to_account_metrics(&user, login)),
        None => Err(StatsError::user_not_found(login)),
    }
}

/// Aggregate stats across every account in `options.usernames`.
pub async fn fetch_stats(
    client: &GitHubClient,
    pool: &TokenPool,
    options: &StatsOptions,
) -> Result<AggregatedStats, StatsError> {
    let logins = split_usernames(&options.usernames)?;
    let exclusions = options.exclusion_set();

    let mut stats = AggregatedStats::default();
    let mut names = Vec::with_capacity(logins.len());

    for login in logins {
        let metrics = fetch_account_metrics(client, pool, login).await?;

        stats.total_issues += metrics.open_issues + metrics.closed_issues;

        stats.total_commits += if options.include_all_commits {
            fetch_total_commits(client, pool, login).await
        } else {
            metrics.total_commit_contributions
        };
        if options.include_private_contributions {
            stats.total_commits += metrics.restricted_contributions;
        }

        stats.total_prs += metrics.pull_requests;
        stats.contributed_to += metrics.contributed_to;
        stats.total_repos += metrics.repositories;
        stats.total_followers += metrics.followers;

        stats.total_stars += fetch_total_stars(client, pool, login, &exclusions).await?;

        tracing::debug!(
            login,
            commits = stats.total_commits,
            stars = stats.total_stars,
            "Accumulated account"
        );
        names.push(metrics.display_name);
    }

    stats.name = combine_names(&names);
    stats.rank = calculate_rank(&stats.rank_input());

    tracing::info!(
        name = %stats.name,
        rank = %stats.rank.level,
        "Aggregated stats"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::http::{HttpMethod, MockTransport};
    use crate::retry::RetryConfig;

    const API: &str = "https://api.github.test";

    fn client(transport: &MockTransport) -> GitHubClient {
        GitHubClient::new_with_transport(API, None, Arc::new(transport.clone())).with_retry_config(
            RetryConfig::new(Duration::from_millis(1), Duration::from_millis(5), 1)
                .with_jitter(false),
        )
    }

    fn user_payload(name: Option<&str>, login: &str, commits: u64, restricted: u64) -> serde_json::Value {
        json!({
            "data": {
                "user": {
                    "name": name,
                    "login": login,
                    "contributionsCollection": {
                        "totalCommitContributions": commits,
                        "restrictedContributionsCount": restricted
                    },
                    "repositoriesContributedTo": {"totalCount": 3},
                    "pullRequests": {"totalCount": 4},
                    "openIssues": {"totalCount": 1},
                    "closedIssues": {"totalCount": 2},
                    "followers": {"totalCount": 10},
                    "repositories": {"totalCount": 6}
                }
            }
        })
    }

    fn stars_payload(stars: &[(&str, u64)]) -> serde_json::Value {
        let nodes: Vec<_> = stars
            .iter()
            .map(|(name, n)| json!({"name": name, "stargazers": {"totalCount": n}}))
            .collect();
        json!({
            "data": {
                "user": {
                    "repositories": {
                        "nodes": nodes,
                        "pageInfo": {"hasNextPage": false, "endCursor": null}
                    }
                }
            }
        })
    }

    #[test]
    fn test_split_usernames_trims_and_skips_blanks() {
        assert_eq!(
            split_usernames(" octocat , ,hubot,").expect("usernames"),
            vec!["octocat", "hubot"]
        );
    }

    #[test]
    fn test_split_usernames_rejects_empty_list() {
        for input in ["", "   ", ",,"] {
            let err = split_usernames(input).expect_err("missing");
            assert!(matches!(err, StatsError::MissingParameter { .. }));
        }
    }

    #[tokio::test]
    async fn test_missing_username_makes_no_request() {
        let transport = MockTransport::new();
        let pool = TokenPool::new(["tok"]);

        let err = fetch_stats(&client(&transport), &pool, &StatsOptions::new(" "))
            .await
            .expect_err("missing");

        assert!(matches!(err, StatsError::MissingParameter { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_single_account_stats() {
        let transport = MockTransport::new();
        let url = format!("{API}/graphql");
        transport.push_json(HttpMethod::Post, url.clone(), user_payload(None, "octocat", 100, 7));
        transport.push_json(HttpMethod::Post, url, stars_payload(&[("a", 20), ("b", 5)]));
        let pool = TokenPool::new(["tok"]);

        let options = StatsOptions::new("octocat").exclude_repos(["b"]);
        let stats = fetch_stats(&client(&transport), &pool, &options)
            .await
            .expect("stats");

        assert_eq!(stats.name, "octocat");
        assert_eq!(stats.total_commits, 100);
        assert_eq!(stats.total_issues, 3);
        assert_eq!(stats.total_prs, 4);
        assert_eq!(stats.contributed_to, 3);
        assert_eq!(stats.total_followers, 10);
        assert_eq!(stats.total_repos, 6);
        assert_eq!(stats.total_stars, 20);
        assert_ne!(stats.rank, crate::rank::Rank::default());
    }

    #[tokio::test]
    async fn test_private_contributions_are_added() {
        let transport = MockTransport::new();
        let url = format!("{API}/graphql");
        transport.push_json(HttpMethod::Post, url.clone(), user_payload(Some("Mona"), "octocat", 100, 7));
        transport.push_json(HttpMethod::Post, url, stars_payload(&[]));
        let pool = TokenPool::new(["tok"]);

        let options = StatsOptions::new("octocat").include_private_contributions(true);
        let stats = fetch_stats(&client(&transport), &pool, &options)
            .await
            .expect("stats");

        assert_eq!(stats.name, "Mona");
        assert_eq!(stats.total_commits, 107);
    }

    #[tokio::test]
    async fn test_fetch_account_metrics_maps_error_payload() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            format!("{API}/graphql"),
            json!({"data": null, "errors": [{"message": "Something odd happened"}]}),
        );
        let pool = TokenPool::new(["tok"]);

        let err = fetch_account_metrics(&client(&transport), &pool, "octocat")
            .await
            .expect_err("remote query error");
        match err {
            StatsError::RemoteQuery { message } => assert_eq!(message, "Something odd happened"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
