//! GitHub API client.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{GitHubError, classify_failure, rate_limit_reset};
use super::types::{GraphQlResponse, QueryError};
use crate::error::StatsError;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::rate_limit::ApiRateLimiter;
use crate::retry::{RetryConfig, TokenPool, with_token_rotation};

/// Default GitHub API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default per-attempt timeout for the reqwest transport.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Accept header required by the commit search endpoint.
pub const COMMIT_SEARCH_ACCEPT: &str = "application/vnd.github.cloak-preview";

const USER_AGENT: &str = "devcard";

/// GitHub API client.
///
/// The client holds no credentials. Each call receives the token chosen by
/// the retry policy, so one client can serve any number of pools.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    /// Optional rate limiter for pacing API requests.
    rate_limiter: Option<ApiRateLimiter>,
    retry_config: RetryConfig,
}

impl GitHubClient {
    /// Create a client backed by reqwest.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GitHubClient::new(GITHUB_API_URL, DEFAULT_TIMEOUT, None)?;
    /// ```
    pub fn new(
        api_url: &str,
        timeout: StdDuration,
        rate_limiter: Option<ApiRateLimiter>,
    ) -> Result<Self, GitHubError> {
        let transport = ReqwestTransport::with_timeout(timeout)
            .map_err(|e| GitHubError::Http(e.to_string()))?;

        Ok(Self::new_with_transport(
            api_url,
            rate_limiter,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        api_url: &str,
        rate_limiter: Option<ApiRateLimiter>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            api_url: api_url.trim_end_matches('/').to_string(),
            rate_limiter,
            retry_config: RetryConfig::default(),
        }
    }

    /// Replace the retry configuration used by [`GitHubClient::query`] and friends.
    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Wait for rate limiter if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    fn graphql_url(&self) -> String {
        format!("{}/graphql", self.api_url)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GitHubError> {
        self.wait_for_rate_limit().await;

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| GitHubError::Http(e.to_string()))?;

        if !response.is_success() {
            return Err(classify_failure(
                response.status,
                &response.headers,
                &response.body,
            ));
        }

        Ok(response)
    }

    /// Execute a single GraphQL request.
    ///
    /// A `RATE_LIMITED` entry in `errors` is turned into
    /// [`GitHubError::RateLimited`] so the retry policy can rotate; every other
    /// error entry is returned to the caller inside the envelope.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        token: &str,
    ) -> Result<GraphQlResponse<T>, GitHubError> {
        let body = serde_json::to_vec(&serde_json::json!({
            "query": query,
            "variables": variables,
        }))?;

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.graphql_url(),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
                ("Authorization".to_string(), format!("bearer {token}")),
            ],
            body,
        };

        let response = self.send(request).await?;
        let parsed: GraphQlResponse<T> = serde_json::from_slice(&response.body)?;

        if let Some(first) = parsed.errors.first()
            && matches!(first.classify(), QueryError::RateLimited { .. })
        {
            return Err(GitHubError::RateLimited {
                reset_at: rate_limit_reset(&response.headers),
            });
        }

        Ok(parsed)
    }

    /// Execute an authenticated REST GET and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        accept: &str,
        token: &str,
    ) -> Result<T, GitHubError> {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{}", self.api_url, path),
            headers: vec![
                ("Accept".to_string(), accept.to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
                ("Authorization".to_string(), format!("token {token}")),
            ],
            body: Vec::new(),
        };

        let response = self.send(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// GraphQL request through the retry policy.
    pub async fn query<T: DeserializeOwned>(
        &self,
        pool: &TokenPool,
        query: &str,
        variables: Value,
        label: &str,
    ) -> Result<GraphQlResponse<T>, StatsError> {
        with_token_rotation(pool, &self.retry_config, label, |token| {
            let variables = variables.clone();
            async move { self.graphql(query, variables, &token).await }
        })
        .await
    }

    /// REST GET through the retry policy.
    pub async fn get_json_with_retry<T: DeserializeOwned>(
        &self,
        pool: &TokenPool,
        path: &str,
        accept: &str,
        label: &str,
    ) -> Result<T, StatsError> {
        with_token_rotation(pool, &self.retry_config, label, |token| async move {
            self.get_json(path, accept, &token).await
        })
        .await
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("rate_limiter", &self.rate_limiter)
            .field("retry_config", &self.retry_config)
            .finish()
    }
}
