mod app;
mod config;
mod error;
mod ui;

use std::{fs, path::Path, sync::Mutex};

use ledger::{EntryStore, FileStorage, HtmlSurface};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_tracing(&config)?;

    if let Some(path) = &config.export_html {
        return export_html(&config, path);
    }

    let app = app::App::new(config)?;
    app.run().await
}

/// Logs go to a file: the terminal belongs to the UI.
fn init_tracing(config: &AppConfig) -> Result<()> {
    if let Some(parent) = Path::new(&config.log_file).parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledger={level},ledger_tui={level}",
            level = config.level
        ))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}

fn export_html(config: &AppConfig, path: &str) -> Result<()> {
    let store = EntryStore::builder()
        .storage(FileStorage::new(&config.data_dir))
        .load()?;

    let mut surface = HtmlSurface::new();
    store.render_to(&mut surface);

    let document = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Entries</title></head>\n<body>\n{}</body>\n</html>\n",
        surface.html()
    );
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, document)?;
    tracing::info!(entries = store.len(), path, "entries exported");
    Ok(())
}
