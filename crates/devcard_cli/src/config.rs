//! Configuration file support for devcard.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `DEVCARD_`, nested keys joined
//!    with `__`, e.g. `DEVCARD_RETRY__MAX_RETRIES`)
//! 3. Config file (./devcard.toml, then ~/.config/devcard/config.toml)
//! 4. Built-in defaults
//!
//! Credentials are collected into a pool in this order: `github.token`,
//! `github.tokens`, `DEVCARD_GITHUB_TOKEN`, then `PAT_1` through `PAT_8`.
//!
//! Example config file:
//! ```toml
//! [github]
//! tokens = ["ghp_first", "ghp_second"]
//! api_url = "https://api.github.com"
//! timeout_secs = 30
//! requests_per_second = 10
//!
//! [retry]
//! max_retries = 7
//! min_delay_ms = 250
//! max_delay_ms = 10000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use devcard::github::{GITHUB_API_URL, GitHubClient, GitHubError};
use devcard::rate_limit::GITHUB_DEFAULT_RPS;
use devcard::retry::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRIES};
use devcard::{ApiRateLimiter, RetryConfig, TokenPool};
use directories::ProjectDirs;
use serde::Deserialize;

/// Number of `PAT_n` credential slots read from the environment.
pub const PAT_SLOTS: usize = 8;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Retry policy.
    pub retry: RetrySettings,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// A single API token.
    pub token: Option<String>,
    /// Additional tokens, rotated through on rate limits.
    pub tokens: Vec<String>,
    /// API root, for GitHub Enterprise.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Proactive request pacing. 0 disables it.
    pub requests_per_second: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            tokens: Vec::new(),
            api_url: GITHUB_API_URL.to_string(),
            timeout_secs: 30,
            requests_per_second: GITHUB_DEFAULT_RPS,
        }
    }
}

/// Retry policy settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            min_delay_ms: INITIAL_BACKOFF_MS,
            max_delay_ms: MAX_BACKOFF_MS,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/devcard/config.toml)
    /// 3. Local config file (./devcard.toml)
    /// 4. Environment variables with DEVCARD_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("devcard.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./devcard.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., DEVCARD_GITHUB__API_URL -> github.api_url
        builder = builder.add_source(
            Environment::with_prefix("DEVCARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "devcard").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Collect every configured credential, in priority order, without duplicates.
    ///
    /// `env` looks up an environment variable by name.
    pub fn tokens_with<F>(&self, env: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = std::iter::once("DEVCARD_GITHUB_TOKEN".to_string())
            .chain((1..=PAT_SLOTS).map(|n| format!("PAT_{n}")))
            .filter_map(|name| env(&name));

        let mut tokens: Vec<String> = Vec::new();
        let candidates = self
            .github
            .token
            .iter()
            .cloned()
            .chain(self.github.tokens.iter().cloned())
            .chain(from_env);

        for token in candidates {
            let token = token.trim().to_string();
            if !token.is_empty() && !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }

    /// Build the credential pool from config and the process environment.
    pub fn token_pool(&self) -> TokenPool {
        TokenPool::new(self.tokens_with(|name| std::env::var(name).ok()))
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            Duration::from_millis(self.retry.min_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
            self.retry.max_retries,
        )
    }

    /// Build the API client described by this configuration.
    pub fn client(&self) -> Result<GitHubClient, GitHubError> {
        let rate_limiter = match self.github.requests_per_second {
            0 => None,
            rps => Some(ApiRateLimiter::new(rps)),
        };

        Ok(GitHubClient::new(
            &self.github.api_url,
            Duration::from_secs(self.github.timeout_secs),
            rate_limiter,
        )?
        .with_retry_config(self.retry_config()))
    }
}
