use std::path::{Path, PathBuf};

use log::{info, warn};
use rusqlite::Connection;

mod helpers;
mod migrations;
pub mod models;
mod repositories;

use crate::error::{Result, ShelfError};
use migrations::{run_migrations, SchemaStatus};

/// Handle to the SQLite file holding the `tasks` table.
///
/// No connection is kept between calls: [`Database::execute`] opens the file,
/// runs one unit of work and closes it again. Every statement auto-commits.
#[derive(Debug, Clone)]
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Ensure the schema exists. Safe to call on every startup.
    pub fn initialize(&self) -> Result<()> {
        let status = self.execute(|conn| run_migrations(conn).map_err(ShelfError::from))?;
        let path = self.db_path.display();
        match status {
            SchemaStatus::Current => info!("Task store ready at {path}"),
            SchemaStatus::Created => info!("Created task store at {path}"),
            SchemaStatus::Adopted => info!("Adopted existing tasks table at {path}"),
        }
        Ok(())
    }

    pub fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = Connection::open(&self.db_path)?;
        let result = task(&mut conn);

        if let Err((_, err)) = conn.close() {
            warn!("Failed to close task store connection: {err}");
        }

        result
    }
}
