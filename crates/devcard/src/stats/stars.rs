//! Star totals over an account's owned repositories.

use serde_json::json;

use crate::error::StatsError;
use crate::exclusion::ExclusionSet;
use crate::github::queries::STAR_REPOSITORIES;
use crate::github::types::StarRepositoriesData;
use crate::github::{GitHubClient, to_star_entry};
use crate::retry::TokenPool;

use super::types::RepositoryStarEntry;

/// Repositories requested per page.
pub const STAR_PAGE_SIZE: u32 = 100;

/// Pages walked per account.
///
/// Capped at one: accounts with thousands of repositories would otherwise
/// burn through the rate limit for stars that barely move the total. Only
/// the 100 most starred repositories are counted.
pub const STAR_PAGE_LIMIT: usize = 1;

/// Sum stars across `login`'s owned repositories, skipping excluded ones.
///
/// An error payload on any page fails the whole call; no partial sum is
/// returned.
pub async fn fetch_total_stars(
    client: &GitHubClient,
    pool: &TokenPool,
    login: &str,
    exclusions: &ExclusionSet,
) -> Result<u64, StatsError> {
    let mut total = 0;
    let mut after: Option<String> = None;

    for page in 1..=STAR_PAGE_LIMIT {
        let variables = json!({
            "login": login,
            "first": STAR_PAGE_SIZE,
            "after": after,
        });

        let response = client
            .query::<StarRepositoriesData>(pool, STAR_REPOSITORIES, variables, login)
            .await?;

        if response.has_errors() {
            return Err(StatsError::from_query_errors(&response.errors, "stats"));
        }

        let Some(user) = response.data.and_then(|d| d.user) else {
            return Err(StatsError::user_not_found(login));
        };
        let connection = user.repositories;

        let entries: Vec<RepositoryStarEntry> = connection.nodes.iter().map(to_star_entry).collect();
        let page_stars = sum_stars(&entries, exclusions);
        total += page_stars;

        tracing::debug!(login, page, repos = entries.len(), page_stars, "Fetched star page");

        // Pages are ordered by stars, so once a page ends on a zero-star
        // repository nothing further can contribute.
        let exhausted = entries.last().is_none_or(|e| e.stars == 0);
        if !connection.page_info.has_next_page || exhausted {
            break;
        }
        match connection.page_info.end_cursor {
            Some(cursor) => after = Some(cursor),
            None => break,
        }
    }

    Ok(total)
}

/// Sum star counts, dropping zero-star and excluded repositories.
pub fn sum_stars(entries: &[RepositoryStarEntry], exclusions: &ExclusionSet) -> u64 {
    entries
        .iter()
        .filter(|e| e.stars > 0 && !exclusions.contains(&e.name))
        .map(|e| e.stars)
        .sum()
}
