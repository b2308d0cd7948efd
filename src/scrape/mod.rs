pub mod export;
pub mod fetch;
pub mod parse;
pub mod record;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, ShelfError};
use crate::settings::ExtractorSettings;

pub use fetch::{HttpPageSource, PageSource};
pub use record::BookRecord;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Lifecycle of one export. A run whose file could not be written drops back
/// to `Pending` and may be retried; once `Done`, `run` refuses to start again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Pending,
    Running,
    Done,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub pages_attempted: usize,
    pub failed_pages: Vec<u32>,
    pub records: usize,
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Fetches the configured page range in order, collects every record and
/// writes them out once at the end.
pub struct BatchExport<S: PageSource> {
    source: S,
    settings: ExtractorSettings,
    state: RunState,
}

impl<S: PageSource> BatchExport<S> {
    pub fn new(source: S, settings: ExtractorSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            source,
            settings,
            state: RunState::Pending,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the whole range and write the output file.
    ///
    /// A page that fails to fetch is logged and contributes no records; the
    /// run carries on with the next page. Only failing to write the output
    /// file is an error.
    pub fn run(&mut self) -> Result<ExportSummary> {
        if self.state == RunState::Done {
            return Err(ShelfError::AlreadyFinished);
        }
        let started_at = Utc::now();
        self.state = RunState::Running;

        let mut records: Vec<BookRecord> = Vec::new();
        let mut failed_pages = Vec::new();
        let mut pages_attempted = 0;

        for page in self.settings.pages() {
            pages_attempted += 1;
            let url = self.settings.page_url(page);
            match self.source.fetch_page(&url) {
                Ok(content) => {
                    let page_records = parse::parse_records(&content);
                    log_info!("Page {page}: {} records from {url}", page_records.len());
                    records.extend(page_records);
                }
                Err(err) => {
                    log_warn!("Page {page} skipped: {err}");
                    failed_pages.push(page);
                }
            }
        }

        if let Err(err) = export::write_csv(&self.settings.output_path, &records) {
            log_error!(
                "Could not write {}: {err}",
                self.settings.output_path.display()
            );
            self.state = RunState::Pending;
            return Err(err);
        }
        self.state = RunState::Done;

        log_info!(
            "Saved {} records to {} ({} of {} pages failed)",
            records.len(),
            self.settings.output_path.display(),
            failed_pages.len(),
            pages_attempted
        );

        Ok(ExportSummary {
            pages_attempted,
            failed_pages,
            records: records.len(),
            output_path: self.settings.output_path.clone(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}
