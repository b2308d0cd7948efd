use std::cmp::Ordering;

use anyhow::{bail, Context, Result};
use rusqlite::{Connection, Transaction};

const CURRENT_SCHEMA_VERSION: i32 = 1;

/// What `run_migrations` found when it opened the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Already at the current version; nothing ran.
    Current,
    /// Empty file; the `tasks` table was created.
    Created,
    /// Unversioned file that already held a `tasks` table with rows of the
    /// same layout. The table is kept as-is and only the version is stamped.
    Adopted,
}

pub fn run_migrations(conn: &mut Connection) -> Result<SchemaStatus> {
    let found = schema_version(conn)?;
    match found.cmp(&CURRENT_SCHEMA_VERSION) {
        Ordering::Greater => bail!(
            "task store schema version {found} is newer than this build supports ({CURRENT_SCHEMA_VERSION})"
        ),
        Ordering::Equal => return Ok(SchemaStatus::Current),
        Ordering::Less => {}
    }

    let status = if has_tasks_table(conn)? {
        SchemaStatus::Adopted
    } else {
        SchemaStatus::Created
    };

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;
    for target in (found + 1)..=CURRENT_SCHEMA_VERSION {
        apply_migration(&tx, target)
            .with_context(|| format!("migration to version {target} failed"))?;
    }
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to stamp user_version")?;
    tx.commit().context("failed to commit migrations")?;

    Ok(status)
}

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")
}

fn has_tasks_table(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'tasks'",
            [],
            |row| row.get(0),
        )
        .context("failed to inspect sqlite_master")?;
    Ok(count > 0)
}

fn apply_migration(tx: &Transaction<'_>, version: i32) -> Result<()> {
    match version {
        // IF NOT EXISTS: an adopted table is left untouched.
        1 => {
            tx.execute_batch(include_str!("schemas/schema_v1.sql"))
                .context("failed to execute schema_v1.sql")?;
            Ok(())
        }
        _ => bail!("unknown migration target version: {version}"),
    }
}
