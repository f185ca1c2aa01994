//! Parser for cleaned movie catalogs.
//!
//! The catalog is a JSON Lines file: one `MovieRecord` per line, in the
//! order rows should appear in the feature table.
//!
//! ```text
//! {"id": 19995, "title": "Avatar", "tags": "...", "genres": "action adventure", ...}
//! ```
//!
//! Rust concepts you'll learn here:
//! - Error handling with `?` operator and `map_err`
//! - serde_json for typed deserialization
//! - Working with file I/O

use crate::error::{DataLoadError, Result};
use crate::types::{FeatureTable, MovieRecord};
use std::fs;
use std::path::Path;

/// Parse a catalog file into a validated feature table
pub fn parse_catalog(path: &Path) -> Result<FeatureTable> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let rows = parse_records(&content, &file)?;
    FeatureTable::from_rows(rows)
}

/// Parse JSON Lines content into movie records
///
/// Blank lines are skipped; line numbers in errors are 1-based.
pub fn parse_records(content: &str, file: &str) -> Result<Vec<MovieRecord>> {
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue; // Skip empty lines
        }

        let record: MovieRecord =
            serde_json::from_str(line_trimmed).map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: e.to_string(),
            })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records_keeps_order() {
        let content = r#"
{"id": 2, "title": "Second", "tags": "b"}

{"id": 1, "title": "First", "tags": "a", "display": {"genres": ["Drama"], "overview": "o", "release_date": "2001-01-01", "poster_ref": null}}
"#;
        let records = parse_records(content, "catalog.jsonl").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 2);
        assert_eq!(records[1].id, 1);
        assert_eq!(records[1].display.genres, vec!["Drama".to_string()]);
        assert!(records[1].display.poster_ref.is_none());
        // Missing feature columns default to empty text
        assert_eq!(records[0].cast, "");
    }

    #[test]
    fn test_parse_error_reports_line() {
        let content = "{\"id\": 1, \"title\": \"Ok\"}\nnot json\n";
        let err = parse_records(content, "catalog.jsonl").unwrap_err();

        match err {
            DataLoadError::ParseError { file, line, .. } => {
                assert_eq!(file, "catalog.jsonl");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = parse_catalog(Path::new("definitely/not/here.jsonl")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
