//! All-time commit count through the commit search endpoint.
//!
//! This is the one best-effort call in the engine: every failure degrades to
//! zero and is logged, never surfaced.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::github::{COMMIT_SEARCH_ACCEPT, GitHubClient, short_error_message};
use crate::retry::TokenPool;

/// GitHub's maximum username length.
pub const MAX_USERNAME_LEN: usize = 39;

static USERNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9](?:[a-zA-Z0-9]|-[a-zA-Z0-9]){0,38}$")
        .expect("username pattern is valid")
});

/// Whether `login` is a syntactically valid GitHub username.
///
/// ASCII letters and digits separated by single hyphens, with no leading or
/// trailing hyphen, at most 39 characters.
pub fn is_valid_username(login: &str) -> bool {
    login.len() <= MAX_USERNAME_LEN && USERNAME.is_match(login)
}

/// Total commits authored by `login` according to the commit search.
///
/// Returns 0 for an invalid username (without any request), on any failure,
/// and when the response has no usable `total_count`.
pub async fn fetch_total_commits(client: &GitHubClient, pool: &TokenPool, login: &str) -> u64 {
    if !is_valid_username(login) {
        tracing::warn!(login, "Invalid username, skipping commit search");
        return 0;
    }

    let path = format!("/search/commits?q=author:{login}");
    match client
        .get_json_with_retry::<Value>(pool, &path, COMMIT_SEARCH_ACCEPT, login)
        .await
    {
        Ok(body) => total_count(&body),
        Err(e) => {
            tracing::warn!(login, "Commit search failed: {}", short_error_message(&e));
            0
        }
    }
}

fn total_count(body: &Value) -> u64 {
    body.get("total_count").and_then(Value::as_u64).unwrap_or(0)
}
