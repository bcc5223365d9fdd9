use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/ledger_tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the `entries.json` slot.
    pub data_dir: String,
    pub log_file: String,
    pub level: String,
    /// Set from the CLI only: write the rendered entries here and exit.
    #[serde(skip)]
    pub export_html: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            log_file: "data/ledger_tui.log".to_string(),
            level: "info".to_string(),
            export_html: None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ledger_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<String>,
    /// Override the log file path.
    #[arg(long)]
    log_file: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long)]
    level: Option<String>,
    /// Render every entry to an HTML file and exit.
    #[arg(long, value_name = "PATH")]
    export_html: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("LEDGER_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }
    if let Some(level) = args.level {
        settings.level = level;
    }
    settings.export_html = args.export_html;

    Ok(settings)
}
