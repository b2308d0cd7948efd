use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::scrape::record::BookRecord;

const HEADER: [&str; 2] = ["Title", "Price"];

/// Render records as CSV: `Title,Price` header, one row per record, `\n` line
/// endings.
pub fn to_csv(records: &[BookRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER[0], HEADER[1]);
    for record in records {
        push_row(&mut out, &record.title, &record.price);
    }
    out
}

/// Write the whole export in one go. The content lands in a sibling temporary
/// file first and is then renamed over `path`, so an existing file is replaced
/// and a half-written export is never visible at `path`.
pub fn write_csv(path: &Path, records: &[BookRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let staging = staging_path(path);
    fs::write(&staging, to_csv(records))?;
    if let Err(err) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn push_row(out: &mut String, title: &str, price: &str) {
    push_field(out, title);
    out.push(',');
    push_field(out, price);
    out.push('\n');
}

fn push_field(out: &mut String, value: &str) {
    if value.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(value);
    }
}
