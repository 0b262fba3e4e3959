//! CSV session log.
//!
//! One header row `DATE,PATTERN,CYCLES,TIME` followed by one row per ended
//! session. Rows are only ever appended; nothing here rewrites or deletes
//! existing rows. A missing file reads as an empty log.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use super::{SessionRecord, SessionStore};
use crate::error::StoreError;

pub const HEADER: [&str; 4] = ["DATE", "PATTERN", "CYCLES", "TIME"];
pub const DEFAULT_FILE_NAME: &str = "breathing_log.csv";

#[derive(Debug, Clone)]
pub struct CsvSessionLog {
    path: PathBuf,
}

impl CsvSessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    /// True when the file is non-empty and its last byte is not a newline.
    fn missing_trailing_newline(file: &mut File) -> std::io::Result<bool> {
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::Start(len - 1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }
}

impl SessionStore for CsvSessionLog {
    fn append(&self, record: &SessionRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        let is_new = file.metadata().map_err(|e| self.io_error(e))?.len() == 0;
        if !is_new && Self::missing_trailing_newline(&mut file).map_err(|e| self.io_error(e))? {
            file.write_all(b"\n").map_err(|e| self.io_error(e))?;
        }

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        if is_new {
            writer.write_record(HEADER).map_err(|e| self.csv_error(e))?;
        }
        writer
            .write_record(&to_row(record))
            .map_err(|e| self.csv_error(e))?;
        writer.flush().map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), pattern = %record.pattern, "session row appended");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        parse_log(&content)
    }
}

fn to_row(record: &SessionRecord) -> [String; 4] {
    [
        record.date.clone(),
        record.pattern.clone(),
        record.cycles.to_string(),
        record.total_seconds.to_string(),
    ]
}

fn malformed(err: csv::Error) -> StoreError {
    let line = err.position().map_or(0, |p| p.line() as usize);
    StoreError::Malformed {
        line,
        reason: err.to_string(),
    }
}

fn parse_log(content: &str) -> Result<Vec<SessionRecord>, StoreError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::None)
        .from_reader(content.as_bytes());

    let header = reader.headers().map_err(malformed)?.clone();
    if header.is_empty() {
        return Ok(Vec::new());
    }
    let header_ok = header.len() == HEADER.len()
        && header
            .iter()
            .zip(HEADER)
            .all(|(got, want)| got.trim().eq_ignore_ascii_case(want));
    if !header_ok {
        return Err(StoreError::Malformed {
            line: header.position().map_or(1, |p| p.line() as usize),
            reason: format!("expected header {}", HEADER.join(",")),
        });
    }

    reader
        .records()
        .map(|row| {
            let row = row.map_err(malformed)?;
            let line = row.position().map_or(0, |p| p.line() as usize);
            parse_row(&row).map_err(|reason| StoreError::Malformed { line, reason })
        })
        .collect()
}

/// Text fields are kept verbatim; only the numeric columns tolerate padding.
fn parse_row(row: &StringRecord) -> Result<SessionRecord, String> {
    let [date, pattern, cycles, time] = [0, 1, 2, 3].map(|i| row.get(i).unwrap_or_default());

    Ok(SessionRecord {
        date: date.to_string(),
        pattern: pattern.to_string(),
        cycles: cycles
            .trim()
            .parse()
            .map_err(|_| format!("CYCLES '{cycles}' is not a non-negative integer"))?,
        total_seconds: time
            .trim()
            .parse()
            .map_err(|_| format!("TIME '{time}' is not a non-negative integer"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, pattern: &str, cycles: u32, secs: u64) -> SessionRecord {
        SessionRecord {
            date: date.into(),
            pattern: pattern.into(),
            cycles,
            total_seconds: secs,
        }
    }

    #[test]
    fn missing_file_is_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSessionLog::new(dir.path().join("absent.csv"));
        assert!(log.load_all().unwrap().is_empty());
    }

    #[test]
    fn first_append_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSessionLog::new(dir.path().join("log.csv"));
        log.append(&record("2026-10-18 07:30", "4-4-4-4", 1, 16)).unwrap();
        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw, "DATE,PATTERN,CYCLES,TIME\n2026-10-18 07:30,4-4-4-4,1,16\n");
    }

    #[test]
    fn appends_preserve_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSessionLog::new(dir.path().join("log.csv"));
        let a = record("2026-10-18 07:30", "4-4-4-4", 1, 16);
        let b = record("2026-10-18 21:05", "4-7-8-0", 5, 97);
        log.append(&a).unwrap();
        log.append(&b).unwrap();
        assert_eq!(log.load_all().unwrap(), vec![a, b]);
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSessionLog::new(dir.path().join("nested/deeper/log.csv"));
        log.append(&record("2026-10-18 07:30", "1-0-1-0", 3, 6)).unwrap();
        assert_eq!(log.load_all().unwrap().len(), 1);
    }

    #[test]
    fn appends_after_file_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "DATE,PATTERN,CYCLES,TIME\n2026-01-01 09:00,4-4-4-4,2,33").unwrap();
        let log = CsvSessionLog::new(&path);
        log.append(&record("2026-01-02 09:00", "4-4-4-4", 1, 17)).unwrap();
        let all = log.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].total_seconds, 17);
    }

    #[test]
    fn multiline_and_padded_dates_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSessionLog::new(dir.path().join("log.csv"));
        let split = record("2026-10-18\n07:30", "4-4-4-4", 2, 33);
        let padded = record(" 2026-10-18 07:30 ", "4-7-8-0", 1, 19);
        let plain = record("2026-10-19 08:00", "1-0-1-0", 3, 6);
        log.append(&split).unwrap();
        log.append(&padded).unwrap();
        log.append(&plain).unwrap();
        assert_eq!(log.load_all().unwrap(), vec![split, padded, plain]);
    }

    #[test]
    fn quoted_fields_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSessionLog::new(dir.path().join("log.csv"));
        let odd = record("Oct 18, 2026 \"dawn\"", "4-4-4-4", 0, 3);
        log.append(&odd).unwrap();
        assert_eq!(log.load_all().unwrap(), vec![odd]);
    }

    #[test]
    fn header_only_file_is_empty() {
        assert!(parse_log("DATE,PATTERN,CYCLES,TIME\n").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_header() {
        let err = parse_log("WHEN,WHAT\n").unwrap_err();
        assert!(matches!(err, StoreError::Malformed { line: 1, .. }));
    }

    #[test]
    fn reports_line_of_bad_row() {
        let err = parse_log("DATE,PATTERN,CYCLES,TIME\n2026-01-01,4-4-4-4,1,16\n2026-01-02,4-4-4-4,many,16\n")
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed { line: 3, .. }));
    }

    #[test]
    fn tolerates_crlf_and_blank_lines() {
        let all = parse_log("DATE,PATTERN,CYCLES,TIME\r\n\r\n2026-01-01 09:00,4-4-4-4,2,33\r\n").unwrap();
        assert_eq!(all, vec![record("2026-01-01 09:00", "4-4-4-4", 2, 33)]);
    }
}
