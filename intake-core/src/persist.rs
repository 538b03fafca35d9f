//! Persistence writer — appends completed answer sets to a CSV sheet.
//!
//! Row 1 of the file is the header and fixes the column order for every later
//! row. The first session to write creates the file and its header from its own
//! answer order. Later sessions are aligned to that header: labels the session
//! lacks are written as empty cells, answers with no column are dropped.
//! There is no file locking; one writer process per file is assumed.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::IntakeError;
use crate::session::Answers;

/// Destination for completed sessions.
pub trait RecordWriter: Send + Sync {
    /// Append exactly one row for `answers`.
    fn persist(&self, answers: &Answers) -> Result<(), IntakeError>;

    /// Human-readable target, for logs and health output.
    fn target(&self) -> String;
}

/// Writes to a CSV file on local disk.
#[derive(Debug, Clone)]
pub struct CsvRecordWriter {
    path: PathBuf,
}

impl CsvRecordWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordWriter for CsvRecordWriter {
    fn persist(&self, answers: &Answers) -> Result<(), IntakeError> {
        persist(answers, &self.path)
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

/// Append `answers` as one row of `target`, creating the file with a header
/// row when it does not exist yet (or is empty).
pub fn persist(answers: &Answers, target: &Path) -> Result<(), IntakeError> {
    let is_new = match std::fs::metadata(target) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(e.into()),
    };

    if is_new {
        let headers: Vec<&str> = answers.keys().map(|k| k.label()).collect();
        let values: Vec<&str> = answers.values().map(String::as_str).collect();

        let mut writer = csv::Writer::from_path(target)?;
        writer.write_record(&headers)?;
        writer.write_record(&values)?;
        writer.flush()?;

        tracing::info!(path = %target.display(), columns = headers.len(), "Created output sheet");
        return Ok(());
    }

    let headers = read_header(target)?;
    let row = align_to_header(answers, &headers);

    let mut file = OpenOptions::new().read(true).append(true).open(target)?;
    if !ends_with_newline(&mut file)? {
        file.write_all(b"\n")?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(&row)?;
    writer.flush()?;

    tracing::info!(path = %target.display(), "Appended response row");
    Ok(())
}

/// Row 1 of the sheet.
pub fn read_header(target: &Path) -> Result<Vec<String>, IntakeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(target)?;
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

/// Look up each header label in `answers`; absent labels become empty cells.
pub fn align_to_header(answers: &Answers, headers: &[String]) -> Vec<String> {
    let row: Vec<String> = headers
        .iter()
        .map(|header| {
            answers
                .iter()
                .find(|(kind, _)| kind.label() == header.as_str())
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        })
        .collect();

    let missing: Vec<&str> = headers
        .iter()
        .filter(|h| !answers.keys().any(|k| k.label() == h.as_str()))
        .map(String::as_str)
        .collect();
    let dropped: Vec<&str> = answers
        .keys()
        .map(|k| k.label())
        .filter(|label| !headers.iter().any(|h| h.as_str() == *label))
        .collect();

    if !missing.is_empty() || !dropped.is_empty() {
        tracing::warn!(
            missing = ?missing,
            dropped = ?dropped,
            "Answer set does not match sheet header; row aligned to existing columns"
        );
    }

    row
}

fn ends_with_newline(file: &mut File) -> Result<bool, IntakeError> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;

    fn answers(pairs: &[(FieldKind, &str)]) -> Answers {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_first_write_creates_header_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hiring_data.csv");

        persist(&answers(&[(FieldKind::Name, "Alice"), (FieldKind::Age, "25")]), &path).unwrap();

        assert_eq!(
            read_rows(&path),
            vec![vec!["name", "age"], vec!["Alice", "25"]]
        );
    }

    #[test]
    fn test_second_write_appends_without_touching_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hiring_data.csv");

        persist(&answers(&[(FieldKind::Name, "Alice"), (FieldKind::Age, "25")]), &path).unwrap();
        persist(&answers(&[(FieldKind::Name, "Bob"), (FieldKind::Age, "30")]), &path).unwrap();

        assert_eq!(
            read_rows(&path),
            vec![vec!["name", "age"], vec!["Alice", "25"], vec!["Bob", "30"]]
        );
    }

    #[test]
    fn test_later_rows_follow_header_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        persist(&answers(&[(FieldKind::Name, "Alice"), (FieldKind::Age, "25")]), &path).unwrap();
        persist(&answers(&[(FieldKind::Age, "30"), (FieldKind::Name, "Bob")]), &path).unwrap();

        assert_eq!(read_rows(&path)[2], vec!["Bob", "30"]);
    }

    #[test]
    fn test_header_mismatch_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        persist(&answers(&[(FieldKind::Name, "Alice"), (FieldKind::Age, "25")]), &path).unwrap();
        persist(
            &answers(&[(FieldKind::Name, "Carol"), (FieldKind::Skills, "Rust")]),
            &path,
        )
        .unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows[0], vec!["name", "age"]);
        assert_eq!(rows[2], vec!["Carol", ""]);
    }

    #[test]
    fn test_values_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        persist(&answers(&[(FieldKind::Skills, "Python, ML, Java")]), &path).unwrap();

        assert_eq!(read_rows(&path)[1], vec!["Python, ML, Java"]);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"Python, ML, Java\""), "raw file: {raw}");
    }

    #[test]
    fn test_empty_existing_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "").unwrap();

        persist(&answers(&[(FieldKind::Name, "Alice")]), &path).unwrap();

        assert_eq!(read_rows(&path), vec![vec!["name"], vec!["Alice"]]);
    }

    #[test]
    fn test_append_to_file_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "name,age\nAlice,25").unwrap();

        persist(&answers(&[(FieldKind::Name, "Bob"), (FieldKind::Age, "30")]), &path).unwrap();

        assert_eq!(
            read_rows(&path),
            vec![vec!["name", "age"], vec!["Alice", "25"], vec!["Bob", "30"]]
        );
    }

    #[test]
    fn test_csv_record_writer_delegates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let writer = CsvRecordWriter::new(&path);

        writer.persist(&answers(&[(FieldKind::Year, "3")])).unwrap();

        assert_eq!(writer.target(), path.display().to_string());
        assert_eq!(read_rows(&path), vec![vec!["year"], vec!["3"]]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let result = persist(
            &answers(&[(FieldKind::Name, "Alice")]),
            Path::new("/nonexistent/dir/out.csv"),
        );
        assert!(result.is_err());
    }
}
