//! Top-language aggregation.
//!
//! Repository language edges from every account are pooled, filtered by the
//! exclusion set, merged by language name and ranked by total bytes.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::json;

use crate::error::StatsError;
use crate::exclusion::ExclusionSet;
use crate::github::queries::TOP_LANGUAGES;
use crate::github::types::LanguageRepositoriesData;
use crate::github::{GitHubClient, to_repository_languages};
use crate::retry::TokenPool;
use crate::stats::split_usernames;

/// One language and its cumulative size in bytes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LanguageUsage {
    pub name: String,
    pub color: Option<String>,
    pub size: u64,
}

/// A repository and its language edges, largest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLanguages {
    pub name: String,
    pub languages: Vec<LanguageUsage>,
}

/// Languages ordered by descending size.
///
/// Serializes as a JSON object keyed by language name whose key order is the
/// ranking order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopLanguages {
    languages: Vec<LanguageUsage>,
}

impl TopLanguages {
    pub fn get(&self, name: &str) -> Option<&LanguageUsage> {
        self.languages.iter().find(|l| l.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageUsage> {
        self.languages.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Drop languages whose name matches one of `hidden`, ignoring case.
    #[must_use]
    pub fn hide<S: AsRef<str>>(mut self, hidden: &[S]) -> Self {
        if hidden.is_empty() {
            return self;
        }
        let hidden: Vec<String> = hidden
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        self.languages
            .retain(|l| !hidden.contains(&l.name.trim().to_lowercase()));
        self
    }

    /// Keep at most `count` languages.
    #[must_use]
    pub fn limit(mut self, count: usize) -> Self {
        self.languages.truncate(count);
        self
    }

    pub fn into_vec(self) -> Vec<LanguageUsage> {
        self.languages
    }
}

impl<'a> IntoIterator for &'a TopLanguages {
    type Item = &'a LanguageUsage;
    type IntoIter = std::slice::Iter<'a, LanguageUsage>;

    fn into_iter(self) -> Self::IntoIter {
        self.languages.iter()
    }
}

impl Serialize for TopLanguages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.languages.len()))?;
        for language in &self.languages {
            map.serialize_entry(&language.name, language)?;
        }
        map.end()
    }
}

/// Options for [`fetch_top_languages`].
#[derive(Debug, Clone, Default)]
pub struct LanguageOptions {
    /// Comma-delimited account list.
    pub usernames: String,
    /// Repositories whose languages are ignored.
    pub exclude_repos: Vec<String>,
    /// Language names removed from the result, ignoring case.
    pub hide: Vec<String>,
    /// Maximum number of languages returned.
    pub langs_count: Option<usize>,
}

impl LanguageOptions {
    pub fn new(usernames: impl Into<String>) -> Self {
        Self {
            usernames: usernames.into(),
            ..Self::default()
        }
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

    #[must_use]
    pub fn hide<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hide = languages.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn langs_count(mut self, count: usize) -> Self {
        self.langs_count = Some(count);
        self
    }
}

/// Fetch up to 100 owned, non-fork repositories of `login` with their languages.
pub async fn fetch_repository_languages(
    client: &GitHubClient,
    pool: &TokenPool,
    login: &str,
) -> Result<Vec<RepositoryLanguages>, StatsError> {
    let response = client
        .query::<LanguageRepositoriesData>(pool, TOP_LANGUAGES, json!({ "login": login }), login)
        .await?;

    if response.has_errors() {
        return Err(StatsError::from_query_errors(&response.errors, "language"));
    }

    let Some(user) = response.data.and_then(|d| d.user) else {
        return Err(StatsError::user_not_found(login));
    };

    Ok(user
        .repositories
        .nodes
        .into_iter()
        .map(to_repository_languages)
        .collect())
}

/// Rank languages across every account in `options.usernames`.
///
/// Accounts are fetched in order and their repositories concatenated without
/// deduplication. Any failure aborts the whole call.
pub async fn fetch_top_languages(
    client: &GitHubClient,
    pool: &TokenPool,
    options: &LanguageOptions,
) -> Result<TopLanguages, StatsError> {
    let logins = split_usernames(&options.usernames)?;
    let exclusions = ExclusionSet::from_names(&options.exclude_repos);

    let mut repositories = Vec::new();
    for login in logins {
        let mut repos = fetch_repository_languages(client, pool, login).await?;
        tracing::debug!(login, repos = repos.len(), "Fetched repository languages");
        repositories.append(&mut repos);
    }

    let mut top = rank_languages(repositories, &exclusions).hide(&options.hide);
    if let Some(count) = options.langs_count {
        top = top.limit(count);
    }

    tracing::info!(languages = top.len(), "Aggregated top languages");
    Ok(top)
}

/// Merge language edges by name and order by descending total size.
///
/// Excluded repositories and repositories without languages are skipped.
/// The first non-empty color seen for a language is kept. Equal sizes keep
/// first-seen order.
pub fn rank_languages(
    repositories: Vec<RepositoryLanguages>,
    exclusions: &ExclusionSet,
) -> TopLanguages {
    let mut merged: Vec<LanguageUsage> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let edges = repositories
        .into_iter()
        .filter(|repo| !exclusions.contains(&repo.name))
        .filter(|repo| !repo.languages.is_empty())
        .flat_map(|repo| repo.languages);

    for edge in edges {
        match index.get(&edge.name) {
            Some(&i) => {
                let entry = &mut merged[i];
                entry.size += edge.size;
                if entry.color.is_none() {
                    entry.color = edge.color;
                }
            }
            None => {
                index.insert(edge.name.clone(), merged.len());
                merged.push(edge);
            }
        }
    }

    merged.sort_by(|a, b| b.size.cmp(&a.size));
    TopLanguages { languages: merged }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::http::{HttpMethod, MockTransport};
    use crate::retry::RetryConfig;

    const API: &str = "https://api.github.test";

    fn lang(name: &str, color: Option<&str>, size: u64) -> LanguageUsage {
        LanguageUsage {
            name: name.to_string(),
            color: color.map(String::from),
            size,
        }
    }

    fn repo(name: &str, languages: Vec<LanguageUsage>) -> RepositoryLanguages {
        RepositoryLanguages {
            name: name.to_string(),
            languages,
        }
    }

    fn client(transport: &MockTransport) -> GitHubClient {
        GitHubClient::new_with_transport(API, None, Arc::new(transport.clone())).with_retry_config(
            RetryConfig::new(Duration::from_millis(1), Duration::from_millis(5), 1)
                .with_jitter(false),
        )
    }

    #[test]
    fn test_merges_same_language_across_repositories() {
        let repos = vec![
            repo("one", vec![lang("Go", Some("#00ADD8"), 100)]),
            repo("two", vec![lang("Go", Some("#00ADD8"), 50), lang("Rust", Some("#dea584"), 10)]),
        ];

        let top = rank_languages(repos, &ExclusionSet::new());

        assert_eq!(top.names(), vec!["Go", "Rust"]);
        assert_eq!(top.get("Go").map(|l| l.size), Some(150));
        assert_eq!(top.get("Rust").map(|l| l.size), Some(10));
    }

    #[test]
    fn test_excluded_repositories_are_skipped() {
        let repos = vec![
            repo("keep", vec![lang("Rust", None, 30)]),
            repo("fork-of-linux", vec![lang("C", None, 1_000_000)]),
        ];

        let top = rank_languages(repos, &ExclusionSet::from_names(["fork-of-linux"]));

        assert_eq!(top.names(), vec!["Rust"]);
    }

    #[test]
    fn test_orders_by_descending_size() {
        let repos = vec![
            repo("a", vec![lang("Shell", None, 5), lang("Python", None, 40)]),
            repo("b", vec![lang("Shell", None, 50)]),
            repo("c", vec![]),
        ];

        let top = rank_languages(repos, &ExclusionSet::new());

        assert_eq!(top.names(), vec!["Shell", "Python"]);
        assert_eq!(top.get("Shell").map(|l| l.size), Some(55));
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let repos = vec![
            repo("a", vec![lang("Zig", None, 10)]),
            repo("b", vec![lang("Ada", None, 10)]),
        ];

        let top = rank_languages(repos, &ExclusionSet::new());
        assert_eq!(top.names(), vec!["Zig", "Ada"]);
    }

    #[test]
    fn test_first_color_wins_and_missing_color_is_filled() {
        let repos = vec![
            repo("a", vec![lang("Go", Some("#first"), 1), lang("Nix", None, 1)]),
            repo("b", vec![lang("Go", Some("#second"), 1), lang("Nix", Some("#7e7eff"), 1)]),
        ];

        let top = rank_languages(repos, &ExclusionSet::new());

        assert_eq!(top.get("Go").and_then(|l| l.color.as_deref()), Some("#first"));
        assert_eq!(top.get("Nix").and_then(|l| l.color.as_deref()), Some("#7e7eff"));
    }

    #[test]
    fn test_hide_is_case_insensitive_and_limit_truncates() {
        let repos = vec![repo(
            "a",
            vec![lang("HTML", None, 90), lang("Rust", None, 80), lang("CSS", None, 70)],
        )];

        let top = rank_languages(repos, &ExclusionSet::new())
            .hide(&["html"])
            .limit(1);

        assert_eq!(top.names(), vec!["Rust"]);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let repos = vec![repo(
            "a",
            vec![lang("Rust", Some("#dea584"), 10), lang("Go", None, 150)],
        )];

        let json = serde_json::to_string(&rank_languages(repos, &ExclusionSet::new()))
            .expect("serialize");

        assert_eq!(
            json,
            r##"{"Go":{"name":"Go","color":null,"size":150},"Rust":{"name":"Rust","color":"#dea584","size":10}}"##
        );
    }

    #[tokio::test]
    async fn test_fetch_top_languages_concatenates_accounts() {
        let transport = MockTransport::new();
        let url = format!("{API}/graphql");
        for (repo_name, size) in [("first", 100), ("second", 50)] {
            transport.push_json(
                HttpMethod::Post,
                url.clone(),
                json!({
                    "data": {"user": {"repositories": {"nodes": [{
                        "name": repo_name,
                        "languages": {"edges": [
                            {"size": size, "node": {"name": "Go", "color": "#00ADD8"}}
                        ]}
                    }]}}}
                }),
            );
        }
        let pool = TokenPool::new(["tok"]);

        let top = fetch_top_languages(&client(&transport), &pool, &LanguageOptions::new("a,b"))
            .await
            .expect("languages");

        assert_eq!(top.len(), 1);
        assert_eq!(top.get("Go").map(|l| l.size), Some(150));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_top_languages_error_names_language_context() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            format!("{API}/graphql"),
            json!({"data": null, "errors": [{"type": "SOMETHING"}]}),
        );
        let pool = TokenPool::new(["tok"]);

        let err = fetch_top_languages(&client(&transport), &pool, &LanguageOptions::new("a"))
            .await
            .expect_err("failure");
        assert!(matches!(
            err,
            StatsError::GraphQueryFailure {
                context: "language"
            }
        ));
    }
}
