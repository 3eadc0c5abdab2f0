//! Data Export
//!
//! CSV rendering of mood history on the client side, and saving the
//! server-produced export to disk.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::MoodEntry;

/// Columns of a client-side mood export
pub const MOOD_CSV_COLUMNS: [&str; 6] = ["id", "date", "sentiment", "risk", "text", "created_at"];

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No data to export")]
    Empty,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write {path:?}: {error}")]
    Io { path: PathBuf, error: String },
}

/// Render mood entries as CSV.
///
/// Every data field is quoted with embedded quotes doubled. Returns an empty
/// string for an empty history.
pub fn mood_entries_to_csv(entries: &[MoodEntry]) -> Result<String, ExportError> {
    if entries.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for entry in entries {
        writer.write_record([
            entry.id.to_string(),
            entry.date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            entry.sentiment.map(|s| s.to_string()).unwrap_or_default(),
            entry.risk.map(|r| r.to_string()).unwrap_or_default(),
            entry.text.clone().unwrap_or_default(),
            String::new(),
        ])?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;

    let mut csv = MOOD_CSV_COLUMNS.join(",");
    csv.push('\n');
    csv.push_str(&String::from_utf8_lossy(&body));
    Ok(csv)
}

/// Default download name for an export made on `today`
pub fn export_filename(today: NaiveDate) -> String {
    format!("mh_export_{}.csv", today.format("%Y-%m-%d"))
}

/// Write export bytes to `path`, refusing an empty payload
pub fn save_export(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if bytes.is_empty() {
        return Err(ExportError::Empty);
    }

    std::fs::write(path, bytes).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    tracing::info!(path = ?path, bytes = bytes.len(), "Export saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use tempfile::tempdir;

    fn sample() -> MoodEntry {
        MoodEntry {
            id: 12,
            user_id: Some(1),
            date: NaiveDate::from_ymd_opt(2024, 2, 9)
                .unwrap()
                .and_hms_opt(8, 15, 0)
                .unwrap(),
            text: Some("said \"fine\", wasn't".to_string()),
            mood_value: 4,
            risk: Some(RiskLevel::Medium),
            sentiment: Some(-0.4),
        }
    }

    #[test]
    fn test_csv_quotes_every_field() {
        let csv = mood_entries_to_csv(&[sample()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,date,sentiment,risk,text,created_at"));
        assert_eq!(
            lines.next(),
            Some(r#""12","2024-02-09T08:15:00","-0.4","MEDIUM","said ""fine"", wasn't","""#)
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_empty_history() {
        assert_eq!(mood_entries_to_csv(&[]).unwrap(), "");
    }

    #[test]
    fn test_export_filename() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        assert_eq!(export_filename(day), "mh_export_2024-12-05.csv");
    }

    #[test]
    fn test_save_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        assert!(matches!(save_export(&path, b""), Err(ExportError::Empty)));
        save_export(&path, b"type,id\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "type,id\n");
    }
}
