use clap::ValueEnum;
use console::Term;
use serde::Serialize;
use tabled::Tabled;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table
    Table,
    /// Display as JSON
    Json,
}

impl OutputFormat {
    /// Table on a terminal, JSON when piped.
    pub(crate) fn detect() -> Self {
        if Term::stdout().is_term() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    }

    pub(crate) fn resolve(requested: Option<Self>) -> Self {
        requested.unwrap_or_else(Self::detect)
    }
}

/// Render `rows` as a rounded table.
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

pub(crate) fn render_json<T: Serialize + ?Sized>(
    value: &T,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(serde_json::to_string_pretty(value)?)
}
