//! Append-only, human-readable validation log.
//!
//! Each record becomes one block:
//!
//! ```text
//! ------------------------------------------------------------
//! Timestamp       : 2025-01-01 12:00:00
//! Language        : EN
//! Query           : How do I renew my Emirates ID?
//! Status          : FAIL
//! AI Full Response:
//! You can renew it online...
//! Failure Reasons : Incomplete response
//! ```

use crate::error::ProbeResult;
use crate::validator::ValidationRecord;
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Query text beyond this many characters is cut from the log
const MAX_LOGGED_QUERY_CHARS: usize = 200;

/// Destination for validation records
pub trait ValidationLog {
    /// Append one record
    fn append(&self, record: &ValidationRecord) -> ProbeResult<()>;
}

/// Escape `& < > " '` for display
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a record as a log block stamped with `timestamp`
#[must_use]
pub fn format_entry(record: &ValidationRecord, timestamp: &str) -> String {
    let query: String = record.query().chars().take(MAX_LOGGED_QUERY_CHARS).collect();
    let status = if record.passed() { "PASS" } else { "FAIL" };
    let mut entry = format!(
        "\n{rule}\nTimestamp       : {timestamp}\nLanguage        : {lang}\nQuery           : {query}\nStatus          : {status}\nAI Full Response:\n{response}\n",
        rule = "-".repeat(60),
        lang = record.language().code().to_uppercase(),
        query = escape_html(&query),
        response = escape_html(record.response_text()),
    );
    if !record.passed() {
        entry.push_str(&format!(
            "Failure Reasons : {}\n",
            record.failure_reasons().join(", ")
        ));
    }
    entry
}

/// Appends records to a UTF-8 file, opening and closing it per record
#[derive(Debug, Clone)]
pub struct FileValidationLog {
    path: PathBuf,
}

impl FileValidationLog {
    /// Log writing to `path`; parent directories are created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ValidationLog for FileValidationLog {
    fn append(&self, record: &ValidationRecord) -> ProbeResult<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let entry = format_entry(record, &timestamp);
        emit(record, &entry);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())?;
        Ok(())
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryValidationLog {
    records: RefCell<Vec<ValidationRecord>>,
}

impl MemoryValidationLog {
    /// Empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records appended so far
    #[must_use]
    pub fn records(&self) -> Vec<ValidationRecord> {
        self.records.borrow().clone()
    }
}

impl ValidationLog for MemoryValidationLog {
    fn append(&self, record: &ValidationRecord) -> ProbeResult<()> {
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }
}

fn emit(record: &ValidationRecord, entry: &str) {
    if record.passed() {
        info!(language = %record.language(), entry, "validation passed");
    } else {
        warn!(
            language = %record.language(),
            reasons = %record.failure_reasons().join(", "),
            entry,
            "validation failed"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn failed() -> ValidationRecord {
        ValidationRecord::new(
            Language::Arabic,
            "<b>كيف</b>",
            "نعم...",
            vec!["Response too short".into(), "Incomplete response".into()],
        )
    }

    mod emit_tests {
        use super::*;
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        #[test]
        fn test_entry_is_a_field_of_one_json_event() {
            let captured = Captured::default();
            let writer = captured.clone();
            let subscriber = tracing_subscriber::fmt()
                .json()
                .with_writer(move || writer.clone())
                .finish();

            let entry = format_entry(&failed(), "2025-01-01 12:00:00");
            tracing::subscriber::with_default(subscriber, || emit(&failed(), &entry));

            let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
            let lines: Vec<&str> = output.lines().collect();
            assert_eq!(lines.len(), 1);
            let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
            assert_eq!(event["fields"]["message"], "validation failed");
            assert_eq!(event["fields"]["entry"], entry.as_str());
            assert_eq!(
                event["fields"]["reasons"],
                "Response too short, Incomplete response"
            );
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_escape_html() {
            assert_eq!(
                escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
                "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
            );
            assert_eq!(escape_html("الهوية"), "الهوية");
        }

        #[test]
        fn test_failed_entry_layout() {
            let entry = format_entry(&failed(), "2025-01-01 12:00:00");
            let expected = format!(
                "\n{}\nTimestamp       : 2025-01-01 12:00:00\nLanguage        : AR\nQuery           : &lt;b&gt;كيف&lt;/b&gt;\nStatus          : FAIL\nAI Full Response:\nنعم...\nFailure Reasons : Response too short, Incomplete response\n",
                "-".repeat(60)
            );
            assert_eq!(entry, expected);
        }

        #[test]
        fn test_passed_entry_has_no_reasons() {
            let record = ValidationRecord::new(Language::English, "q", "answer", Vec::new());
            let entry = format_entry(&record, "2025-01-01 12:00:00");
            assert!(entry.contains("Status          : PASS"));
            assert!(entry.contains("Language        : EN"));
            assert!(!entry.contains("Failure Reasons"));
        }

        #[test]
        fn test_query_cut_at_200_chars() {
            let long = "x".repeat(250);
            let record = ValidationRecord::new(Language::English, long, "r", Vec::new());
            let entry = format_entry(&record, "t");
            let line = entry.lines().find(|l| l.starts_with("Query")).unwrap();
            assert_eq!(line.len(), "Query           : ".len() + 200);
        }
    }

    mod file_log_tests {
        use super::*;

        #[test]
        fn test_appends_blocks() {
            let tmp = tempfile::tempdir().unwrap();
            let log = FileValidationLog::new(tmp.path().join("logs").join("validation.log"));
            log.append(&failed()).unwrap();
            log.append(&ValidationRecord::new(Language::English, "q", "fine", Vec::new()))
                .unwrap();

            let text = std::fs::read_to_string(log.path()).unwrap();
            assert_eq!(text.matches(&"-".repeat(60)).count(), 2);
            assert!(text.contains("Status          : FAIL"));
            assert!(text.contains("Status          : PASS"));
            assert!(text.find("FAIL").unwrap() < text.find("PASS").unwrap());
        }

        #[test]
        fn test_memory_log() {
            let log = MemoryValidationLog::new();
            log.append(&failed()).unwrap();
            assert_eq!(log.records().len(), 1);
            assert!(!log.records()[0].passed());
        }
    }
}
