//! GitHub GraphQL and REST wire types.
//!
//! Only the fields the engine consumes are declared. Every counter is optional
//! because GitHub returns `null` for connections it refuses to resolve, and
//! the engine treats those as zero.

use serde::Deserialize;

/// The GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

impl<T> GraphQlResponse<T> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlError {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

/// Closed classification of a GraphQL error entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The requested entity does not exist.
    NotFound { message: Option<String> },
    /// The query was throttled.
    RateLimited { message: Option<String> },
    /// Any other error that carries a human readable message.
    Described { message: String },
    /// An error entry with neither a known type nor a message.
    Unspecified,
}

impl GraphQlError {
    pub fn classify(&self) -> QueryError {
        let message = self.message.clone().filter(|m| !m.is_empty());
        match self.kind.as_deref() {
            Some("NOT_FOUND") => QueryError::NotFound { message },
            Some("RATE_LIMITED") => QueryError::RateLimited { message },
            _ => match message {
                Some(message) => QueryError::Described { message },
                None => QueryError::Unspecified,
            },
        }
    }
}

/// A `{ totalCount }` connection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: Option<u64>,
}

impl TotalCount {
    pub fn count(&self) -> u64 {
        self.total_count.unwrap_or(0)
    }
}

/// Helper for optional connections: `None` and `{ totalCount: null }` are both zero.
pub(crate) fn count_of(connection: &Option<TotalCount>) -> u64 {
    connection.as_ref().map(TotalCount::count).unwrap_or(0)
}

// ─── Primary stats query ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct UserStatsData {
    pub user: Option<UserStatsNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsNode {
    pub name: Option<String>,
    pub login: Option<String>,
    pub contributions_collection: Option<ContributionsCollection>,
    pub repositories_contributed_to: Option<TotalCount>,
    pub pull_requests: Option<TotalCount>,
    pub open_issues: Option<TotalCount>,
    pub closed_issues: Option<TotalCount>,
    pub followers: Option<TotalCount>,
    pub repositories: Option<TotalCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub total_commit_contributions: Option<u64>,
    pub restricted_contributions_count: Option<u64>,
}

// ─── Star pagination query ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct StarRepositoriesData {
    pub user: Option<StarRepositoriesUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StarRepositoriesUser {
    pub repositories: StarRepositoryConnection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarRepositoryConnection {
    #[serde(default)]
    pub nodes: Vec<StarRepositoryNode>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StarRepositoryNode {
    pub name: String,
    pub stargazers: Option<TotalCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

// ─── Top languages query ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageRepositoriesData {
    pub user: Option<LanguageRepositoriesUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageRepositoriesUser {
    pub repositories: LanguageRepositoryConnection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageRepositoryConnection {
    #[serde(default)]
    pub nodes: Vec<LanguageRepositoryNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageRepositoryNode {
    pub name: String,
    pub languages: Option<LanguageConnection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageConnection {
    #[serde(default)]
    pub edges: Vec<LanguageEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEdge {
    #[serde(default)]
    pub size: u64,
    pub node: LanguageNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageNode {
    pub name: String,
    pub color: Option<String>,
}
