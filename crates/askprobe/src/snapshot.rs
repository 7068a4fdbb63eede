//! Diagnostic screenshots.
//!
//! Snapshots are evidence, not assertions: nothing compares them. The
//! directory sink names files `<name>_<YYYYmmdd_HHMMSS>.png`.

use crate::error::ProbeResult;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Longest file stem kept from a snapshot name
const MAX_STEM_CHARS: usize = 100;

/// Destination for screenshots
pub trait SnapshotSink {
    /// Store a PNG under `name`; returns where it went
    fn save(&self, name: &str, png: &[u8]) -> ProbeResult<PathBuf>;
}

/// Make a snapshot name safe to use as a file stem.
///
/// Whitespace becomes `_`, question marks (Latin and Arabic) are dropped,
/// and anything else that is not a letter, digit, `_` or `-` becomes `_`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '?' | '\u{061F}'))
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_CHARS)
        .collect();
    if stem.is_empty() {
        "snapshot".to_string()
    } else {
        stem
    }
}

/// Writes screenshots into a directory, creating it on demand
#[derive(Debug, Clone)]
pub struct DirectorySnapshotSink {
    dir: PathBuf,
}

impl DirectorySnapshotSink {
    /// Sink writing into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotSink for DirectorySnapshotSink {
    fn save(&self, name: &str, png: &[u8]) -> ProbeResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .dir
            .join(format!("{}_{timestamp}.png", sanitize_name(name)));
        std::fs::write(&path, png)?;
        debug!(path = %path.display(), bytes = png.len(), "snapshot saved");
        Ok(path)
    }
}

/// Keeps snapshots in memory
#[derive(Debug, Default)]
pub struct MemorySnapshotSink {
    saved: RefCell<Vec<(String, Vec<u8>)>>,
}

impl MemorySnapshotSink {
    /// Empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitized names in save order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.saved.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Whether a snapshot whose name starts with `prefix` was saved
    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.saved.borrow().iter().any(|(n, _)| n.starts_with(prefix))
    }
}

impl SnapshotSink for MemorySnapshotSink {
    fn save(&self, name: &str, png: &[u8]) -> ProbeResult<PathBuf> {
        let name = sanitize_name(name);
        let path = PathBuf::from(format!("{name}.png"));
        self.saved.borrow_mut().push((name, png.to_vec()));
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod sanitize_tests {
        use super::*;

        #[test]
        fn test_spaces_and_question_marks() {
            assert_eq!(
                sanitize_name("How to renew Emirates ID?"),
                "How_to_renew_Emirates_ID"
            );
            assert_eq!(sanitize_name("كيف أجدد الهوية؟"), "كيف_أجدد_الهوية");
        }

        #[test]
        fn test_path_characters_replaced() {
            assert_eq!(sanitize_name("xss_<script>/x"), "xss__script__x");
            assert!(!sanitize_name("../../etc/passwd").contains('/'));
        }

        #[test]
        fn test_empty_and_long_names() {
            assert_eq!(sanitize_name("  ???  "), "snapshot");
            assert_eq!(sanitize_name(&"a".repeat(500)).chars().count(), MAX_STEM_CHARS);
        }
    }

    mod sink_tests {
        use super::*;

        #[test]
        fn test_directory_sink_creates_dir_and_file() {
            let tmp = tempfile::tempdir().unwrap();
            let sink = DirectorySnapshotSink::new(tmp.path().join("screenshots"));
            let path = sink.save("failure_widget loads", b"png").unwrap();

            assert!(path.exists());
            let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(file_name.starts_with("failure_widget_loads_"));
            assert!(file_name.ends_with(".png"));
            // <stem>_YYYYmmdd_HHMMSS.png
            let suffix = &file_name["failure_widget_loads_".len()..];
            assert_eq!(suffix.len(), "20250101_120000.png".len());
            assert_eq!(std::fs::read(&path).unwrap(), b"png");
        }

        #[test]
        fn test_memory_sink_records_names() {
            let sink = MemorySnapshotSink::new();
            sink.save("input_field_timeout", &[1, 2]).unwrap();
            sink.save("ai response?", &[]).unwrap();
            assert_eq!(sink.names(), ["input_field_timeout", "ai_response"]);
            assert!(sink.contains("ai_"));
        }
    }
}
