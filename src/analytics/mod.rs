//! Session-scoped analysis passes.
//!
//! Every extractor here runs over a session excerpt: the reconstructed,
//! time-ordered line sequence for one session, re-numbered 1-based so
//! report line numbers are positions within the excerpt rather than the
//! source file.

pub mod metrics;
pub mod recognition;
pub mod timeline;

pub use metrics::MetricsExtractor;
pub use recognition::{extract_basic_info, extract_errors, extract_recognition_config, extract_recognition_results};
pub use timeline::TimelineBuilder;

/// One line of a session excerpt with its excerpt-relative number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcerptLine {
    /// 1-based position within the excerpt.
    pub number: usize,
    /// The trimmed line text.
    pub text: String,
}

/// Split reconstructed session text into numbered excerpt lines,
/// skipping blanks.
#[must_use]
pub fn excerpt_lines(text: &str) -> Vec<ExcerptLine> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(ExcerptLine {
                    number: i + 1,
                    text: trimmed.to_string(),
                })
            }
        })
        .collect()
}

/// Truncate `text` to at most `max` characters, appending an ellipsis
/// marker when anything was cut. Counts characters, not bytes, so
/// multi-byte text never splits mid-character.
#[must_use]
pub fn truncate_excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}
