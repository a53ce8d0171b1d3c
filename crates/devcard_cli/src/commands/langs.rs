use devcard::{LanguageOptions, TopLanguages, fetch_top_languages};
use tabled::Tabled;

use crate::commands::output::{OutputFormat, render_json, render_table};
use crate::config::Config;

/// Arguments for `devcard langs`.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LangsArgs {
    /// Comma-separated GitHub usernames (e.g. "octocat,hubot")
    pub usernames: String,

    /// Repository whose languages are ignored (repeatable)
    #[arg(short = 'x', long = "exclude-repo", value_name = "REPO")]
    pub exclude_repos: Vec<String>,

    /// Language to hide from the result, case-insensitive (repeatable)
    #[arg(long = "hide", value_name = "LANGUAGE")]
    pub hide: Vec<String>,

    /// Maximum number of languages to show
    #[arg(short = 'n', long)]
    pub langs_count: Option<usize>,

    /// Output format (default: table on a terminal, JSON otherwise)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl LangsArgs {
    fn options(&self) -> LanguageOptions {
        let options = LanguageOptions::new(self.usernames.clone())
            .exclude_repos(self.exclude_repos.iter().cloned())
            .hide(self.hide.iter().cloned());
        match self.langs_count {
            Some(count) => options.langs_count(count),
            None => options,
        }
    }
}

#[derive(Debug, Tabled)]
struct LanguageRow {
    #[tabled(rename = "Language")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Bytes")]
    size: u64,
    #[tabled(rename = "Share")]
    share: String,
}

fn language_rows(languages: &TopLanguages) -> Vec<LanguageRow> {
    let total: u64 = languages.iter().map(|l| l.size).sum();

    languages
        .iter()
        .map(|l| {
            let share = if total > 0 {
                l.size as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            LanguageRow {
                name: l.name.clone(),
                color: l.color.clone().unwrap_or_else(|| "-".to_string()),
                size: l.size,
                share: format!("{share:.1}%"),
            }
        })
        .collect()
}

pub(crate) async fn handle_langs(
    args: LangsArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = config.client()?;
    let pool = config.token_pool();
    tracing::debug!(credentials = pool.len(), "Fetching languages for {}", args.usernames);

    let languages = fetch_top_languages(&client, &pool, &args.options()).await?;

    match OutputFormat::resolve(args.output) {
        OutputFormat::Table => println!("{}", render_table(language_rows(&languages))),
        OutputFormat::Json => println!("{}", render_json(&languages)?),
    }

    Ok(())
}
