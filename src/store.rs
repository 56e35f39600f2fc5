//! In-memory log line store.
//!
//! A [`LineStore`] holds the whole log as parsed [`LogLine`]s. Parsing
//! happens once at load time; every downstream component reads the same
//! immutable line table.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, instrument};

use crate::error::{Result, SiftError};
use crate::model::LogLine;
use crate::patterns::PatternCatalog;

/// All lines of one log file, parsed and numbered.
#[derive(Debug, Clone)]
pub struct LineStore {
    lines: Vec<LogLine>,
}

impl LineStore {
    /// Load and parse a log file.
    ///
    /// The file is decoded leniently: invalid UTF-8 byte sequences are
    /// replaced rather than rejected, since SDK logs occasionally embed
    /// raw binary in trace output.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>, catalog: &PatternCatalog) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SiftError::FileNotFound {
                path: path.to_path_buf(),
            },
            ErrorKind::PermissionDenied => SiftError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => SiftError::io(format!("failed to read {}", path.display()), e),
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Self::parse(&text, catalog))
    }

    /// Parse log text already in memory.
    #[must_use]
    pub fn parse(text: &str, catalog: &PatternCatalog) -> Self {
        let mut lines = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let mut timestamp_ms = None;
            let mut thread_id = None;
            if let Some(caps) = catalog.header.captures(raw) {
                thread_id = Some(caps[1].to_string());
                timestamp_ms = caps[2].parse().ok();
            }
            lines.push(LogLine {
                line_number: idx + 1,
                timestamp_ms,
                thread_id,
                text: raw.to_string(),
            });
        }
        debug!(line_count = lines.len(), "parsed log text");
        Self { lines }
    }

    /// All lines in file order.
    #[must_use]
    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    /// Number of lines in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the store holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines whose header thread ID equals `thread_id`, in file order.
    /// Lines without a header never match.
    pub fn thread_lines<'a>(&'a self, thread_id: &'a str) -> impl Iterator<Item = &'a LogLine> {
        self.lines
            .iter()
            .filter(move |line| line.thread_id.as_deref() == Some(thread_id))
    }

    /// Raw text of all lines for one thread, newline-joined.
    #[must_use]
    pub fn thread_log_text(&self, thread_id: &str) -> String {
        let mut out = String::new();
        for line in self.thread_lines(thread_id) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&line.text);
        }
        out
    }

    /// Whether any line carries the given header thread ID.
    #[must_use]
    pub fn has_thread(&self, thread_id: &str) -> bool {
        self.thread_lines(thread_id).next().is_some()
    }
}
