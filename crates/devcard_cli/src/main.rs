//! devcard CLI - GitHub profile statistics from the command line.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::langs::LangsArgs;
use crate::commands::stats::StatsArgs;

#[derive(Parser)]
#[command(name = "devcard")]
#[command(version)]
#[command(about = "GitHub profile statistics and top languages")]
#[command(
    long_about = "devcard aggregates one or more GitHub accounts' activity into a single \
stats record with a percentile rank, and ranks the languages used across their \
repositories by size."
)]
#[command(after_long_help = r#"EXAMPLES
    Stats for one account:
        $ devcard stats octocat

    Combined stats for two accounts, counting all commits:
        $ devcard stats octocat,hubot --include-all-commits

    Top five languages, ignoring a vendored repository:
        $ devcard langs octocat --exclude-repo linux-mirror --langs-count 5

CONFIGURATION
    devcard reads configuration from:
      1. ~/.config/devcard/config.toml (or $XDG_CONFIG_HOME/devcard/config.toml)
      2. ./devcard.toml
      3. Environment variables (DEVCARD_* prefix, nested keys joined with __)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    DEVCARD_GITHUB_TOKEN      GitHub personal access token
    PAT_1 .. PAT_8            Additional tokens, rotated through on rate limits
    DEVCARD_GITHUB__API_URL   API root (default: https://api.github.com)
    RUST_LOG                  Log filter (default: devcard=info,devcard_cli=info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate stats and rank for one or more accounts
    Stats(StatsArgs),
    /// Rank languages across one or more accounts' repositories
    Langs(LangsArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("devcard=info,devcard_cli=info"),
    };

    // stdout carries the result; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let run = async {
        match cli.command {
            Commands::Stats(args) => commands::stats::handle_stats(args, &config).await,
            Commands::Langs(args) => commands::langs::handle_langs(args, &config).await,
        }
    };

    tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted");
            std::process::exit(130);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn stats_flags_parse() {
        let cli = Cli::try_parse_from([
            "devcard",
            "stats",
            "octocat,hubot",
            "--include-all-commits",
            "--count-private",
            "--exclude-repo",
            "a",
            "-x",
            "b",
            "-o",
            "json",
        ])
        .expect("stats should parse");

        match cli.command {
            Commands::Stats(args) => {
                assert_eq!(args.usernames, "octocat,hubot");
                assert!(args.include_all_commits);
                assert!(args.count_private);
                assert_eq!(args.exclude_repos, vec!["a", "b"]);
                assert!(matches!(
                    args.output,
                    Some(commands::output::OutputFormat::Json)
                ));
            }
            _ => panic!("expected stats"),
        }
    }

    #[test]
    fn langs_flags_parse() {
        let cli = Cli::try_parse_from([
            "devcard",
            "langs",
            "octocat",
            "--hide",
            "HTML",
            "--langs-count",
            "3",
        ])
        .expect("langs should parse");

        match cli.command {
            Commands::Langs(args) => {
                assert_eq!(args.hide, vec!["HTML"]);
                assert_eq!(args.langs_count, Some(3));
                assert!(args.output.is_none());
            }
            _ => panic!("expected langs"),
        }
    }

    #[test]
    fn usernames_are_required() {
        assert!(Cli::try_parse_from(["devcard", "stats"]).is_err());
    }

    #[test]
    fn only_stats_and_langs_are_subcommands() {
        let names: Vec<_> = Cli::command()
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["stats", "langs"]);
        assert!(Cli::try_parse_from(["devcard", "completions", "bash"]).is_err());
    }
}
