pub mod db;
pub mod error;
pub mod scrape;
pub mod settings;
pub mod tasks;
pub mod utils;

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use log::info;

use db::Database;
use scrape::{BatchExport, ExportSummary, HttpPageSource};
use settings::{SettingsStore, UserSettings};
use tasks::TaskConsole;

pub struct AppState {
    pub db: Database,
    pub settings: SettingsStore,
}

impl AppState {
    /// Open settings and the task store. `db_path` overrides the configured file.
    pub fn open(settings_path: PathBuf, db_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let settings = SettingsStore::new(settings_path.clone())
            .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;
        let db_path = db_path.unwrap_or_else(|| settings.task_list().db_path);
        let db = Database::new(db_path.clone())
            .with_context(|| format!("failed to prepare task store {}", db_path.display()))?;
        Ok(Self { db, settings })
    }
}

/// One-off changes to the page range or output of a single export.
#[derive(Debug, Clone, Default)]
pub struct ExportOverrides {
    pub output_path: Option<PathBuf>,
    pub first_page: Option<u32>,
    pub last_page: Option<u32>,
}

/// Settings edits requested from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigChanges {
    pub base_url: Option<String>,
    pub page_path: Option<String>,
    pub first_page: Option<u32>,
    pub last_page: Option<u32>,
    pub output_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub db_path: Option<PathBuf>,
}

impl ConfigChanges {
    pub fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.page_path.is_none()
            && self.first_page.is_none()
            && self.last_page.is_none()
            && self.output_path.is_none()
            && self.timeout_secs.is_none()
            && self.db_path.is_none()
    }

    pub fn apply(self, settings: &mut UserSettings) {
        let extractor = &mut settings.extractor;
        if let Some(base_url) = self.base_url {
            extractor.base_url = base_url;
        }
        if let Some(page_path) = self.page_path {
            extractor.page_path = page_path;
        }
        if let Some(first_page) = self.first_page {
            extractor.first_page = first_page;
        }
        if let Some(last_page) = self.last_page {
            extractor.last_page = last_page;
        }
        if let Some(output_path) = self.output_path {
            extractor.output_path = output_path;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            extractor.timeout_secs = timeout_secs;
        }
        if let Some(db_path) = self.db_path {
            settings.task_list.db_path = db_path;
        }
    }
}

/// Interactive task list on stdin/stdout.
pub fn run_task_list(settings_path: PathBuf, db_path: Option<PathBuf>) -> anyhow::Result<()> {
    let state = AppState::open(settings_path, db_path)?;
    tasks::commands::initialize(&state).map_err(anyhow::Error::msg)?;
    info!("Task list opened on {}", state.db.path().display());

    let stdin = io::stdin();
    let stdout = io::stdout();
    TaskConsole::new(&state, stdin.lock(), stdout.lock())
        .run()
        .context("task list terminal I/O failed")?;
    Ok(())
}

/// Fetch every configured page over HTTP and write the CSV export.
pub fn run_export(settings_path: PathBuf, overrides: ExportOverrides) -> anyhow::Result<ExportSummary> {
    let store = SettingsStore::new(settings_path.clone())
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;

    let mut settings = store.extractor();
    if let Some(output_path) = overrides.output_path {
        settings.output_path = output_path;
    }
    if let Some(first_page) = overrides.first_page {
        settings.first_page = first_page;
    }
    if let Some(last_page) = overrides.last_page {
        settings.last_page = last_page;
    }

    info!(
        "Exporting pages {}..={} from {}",
        settings.first_page, settings.last_page, settings.base_url
    );
    let source = HttpPageSource::from_settings(&settings);
    let mut export = BatchExport::new(source, settings)?;
    let summary = export
        .run()
        .with_context(|| "failed to write export file")?;
    Ok(summary)
}

/// Apply `changes` (if any) and return the settings now in effect.
pub fn run_config(settings_path: PathBuf, changes: ConfigChanges) -> anyhow::Result<UserSettings> {
    let store = SettingsStore::new(settings_path.clone())
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;
    if changes.is_empty() {
        return Ok(store.snapshot());
    }

    let mut updated = store.snapshot();
    changes.apply(&mut updated);
    store.update_extractor(updated.extractor)?;
    store.update_task_list(updated.task_list)?;
    info!("Settings saved to {}", store.path().display());
    Ok(store.snapshot())
}
