// src/export/mod.rs
pub mod database;
pub mod json;
pub mod spreadsheet;

pub use database::MetricsDb;
pub use json::JsonWriter;
pub use spreadsheet::WorkbookWriter;

use std::fs;
use std::path::{Path, PathBuf};

use crate::edgar::FilingRecord;
use crate::utils::error::ExportError;

/// Persists an unparseable model reply next to the regular outputs so the
/// failure can be diagnosed later.
pub fn write_raw_reply(
    output_dir: &Path,
    record: &FilingRecord,
    raw_reply: &str,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}_raw_reply.txt", record.file_stem()));
    fs::write(&path, raw_reply)?;
    tracing::warn!("Saved unparseable model reply to {}", path.display());
    Ok(path)
}

/// Debug-only cache of the normalized document text.
pub fn write_debug_text(
    output_dir: &Path,
    record: &FilingRecord,
    text: &str,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}_text.txt", record.file_stem()));
    fs::write(&path, text)?;
    tracing::info!("Saved normalized text to {}", path.display());
    Ok(path)
}
