use devcard::{AggregatedStats, StatsOptions, fetch_stats};
use tabled::Tabled;

use crate::commands::output::{OutputFormat, render_json, render_table};
use crate::config::Config;

/// Arguments for `devcard stats`.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StatsArgs {
    /// Comma-separated GitHub usernames (e.g. "octocat,hubot")
    pub usernames: String,

    /// Count all-time commits through the commit search API
    #[arg(short = 'a', long)]
    pub include_all_commits: bool,

    /// Add private contributions to the commit count
    #[arg(short = 'p', long)]
    pub count_private: bool,

    /// Repository to leave out of the star total (repeatable)
    #[arg(short = 'x', long = "exclude-repo", value_name = "REPO")]
    pub exclude_repos: Vec<String>,

    /// Output format (default: table on a terminal, JSON otherwise)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl StatsArgs {
    fn options(&self) -> StatsOptions {
        StatsOptions::new(self.usernames.clone())
            .include_all_commits(self.include_all_commits)
            .include_private_contributions(self.count_private)
            .exclude_repos(self.exclude_repos.iter().cloned())
    }
}

#[derive(Debug, Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn stat_rows(stats: &AggregatedStats) -> Vec<StatRow> {
    let row = |metric, value: u64| StatRow {
        metric,
        value: value.to_string(),
    };

    vec![
        StatRow {
            metric: "Name",
            value: stats.name.clone(),
        },
        row("Total Stars", stats.total_stars),
        row("Total Commits", stats.total_commits),
        row("Total PRs", stats.total_prs),
        row("Total Issues", stats.total_issues),
        row("Contributed To", stats.contributed_to),
        row("Followers", stats.total_followers),
        row("Repositories", stats.total_repos),
        StatRow {
            metric: "Rank",
            value: format!("{} ({:.2})", stats.rank.level, stats.rank.score),
        },
    ]
}

pub(crate) async fn handle_stats(
    args: StatsArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = config.client()?;
    let pool = config.token_pool();
    tracing::debug!(credentials = pool.len(), "Fetching stats for {}", args.usernames);

    let stats = fetch_stats(&client, &pool, &args.options()).await?;

    match OutputFormat::resolve(args.output) {
        OutputFormat::Table => println!("{}", render_table(stat_rows(&stats))),
        OutputFormat::Json => println!("{}", render_json(&stats)?),
    }

    Ok(())
}
