//! Session log reconstruction.
//!
//! Builds the literal, time-ordered excerpt of the log belonging to one
//! session: lines that carry the session ID itself, plus lines from the
//! threads the correlator tied to the session, widened by a keyword
//! census that catches helper threads the role heuristics missed.
//!
//! When the primary path yields too little material it degrades to a
//! broader search anchored only on literal session ID mentions. Both
//! paths are total; the worst outcome is an empty excerpt.

use indexmap::IndexSet;
use tracing::{debug, instrument};

use crate::config::ReconstructionConfig;
use crate::model::{LogLine, ThreadRoleSet};
use crate::patterns::{PatternCatalog, SDK_EXPANSION_KEYWORDS};
use crate::store::LineStore;

/// Reconstructs per-session log excerpts.
#[derive(Debug)]
pub struct SessionReconstructor<'a> {
    store: &'a LineStore,
    catalog: &'a PatternCatalog,
    settings: &'a ReconstructionConfig,
}

impl<'a> SessionReconstructor<'a> {
    /// Create a reconstructor over a parsed log.
    #[must_use]
    pub fn new(
        store: &'a LineStore,
        catalog: &'a PatternCatalog,
        settings: &'a ReconstructionConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            settings,
        }
    }

    /// Build the excerpt for `session_id`, ordered by timestamp.
    ///
    /// `roles` enables the primary thread-based path; without it (or when
    /// the primary path comes up short) the degraded search runs instead.
    /// The ID is matched as a raw substring, so callers should pass the
    /// spelling captured from the log.
    #[instrument(skip_all, fields(session_id))]
    #[must_use]
    pub fn reconstruct(
        &self,
        session_id: &str,
        roles: Option<&ThreadRoleSet>,
    ) -> Vec<&'a LogLine> {
        if let Some(roles) = roles {
            let candidates = self.primary_candidates(session_id, roles);
            if candidates.len() >= self.settings.degrade_threshold {
                debug!(lines = candidates.len(), "primary reconstruction");
                return sorted_by_timestamp(candidates);
            }
            debug!(
                lines = candidates.len(),
                threshold = self.settings.degrade_threshold,
                "primary reconstruction too small, degrading"
            );
        }
        let lines = self.degraded_search(session_id);
        debug!(lines = lines.len(), "degraded reconstruction");
        sorted_by_timestamp(lines)
    }

    /// Excerpt joined to a single string, one line per log line.
    #[must_use]
    pub fn reconstruct_text(&self, session_id: &str, roles: Option<&ThreadRoleSet>) -> String {
        let lines: Vec<&str> = self
            .reconstruct(session_id, roles)
            .into_iter()
            .map(|l| l.text.as_str())
            .collect();
        lines.join("\n")
    }

    /// Primary path: role threads plus keyword-expanded threads, fenced
    /// by the session's literal time range.
    fn primary_candidates(&self, session_id: &str, roles: &ThreadRoleSet) -> Vec<&'a LogLine> {
        let mut related: IndexSet<String> = roles.thread_ids().into_iter().collect();
        let time_range = self.literal_time_range(session_id);

        if let Some((t_min, t_max)) = time_range {
            for thread_id in self.expansion_threads(t_min, t_max) {
                related.insert(thread_id);
            }
        }

        let mut candidates = Vec::new();
        for line in self.store.lines() {
            if line.text.contains(session_id) {
                candidates.push(line);
                continue;
            }
            let (Some(thread_id), Some(ts)) = (&line.thread_id, line.timestamp_ms) else {
                continue;
            };
            let Some((t_min, t_max)) = time_range else {
                continue;
            };
            let buffer = self.settings.buffer_window_ms;
            if related.contains(thread_id.as_str())
                && ts >= t_min.saturating_sub(buffer)
                && ts <= t_max + buffer
            {
                candidates.push(line);
            }
        }
        candidates
    }

    /// Thread IDs with enough SDK keyword activity inside the expanded
    /// time window to count as session-related.
    fn expansion_threads(&self, t_min: u64, t_max: u64) -> Vec<String> {
        let window = self.settings.expansion_window_ms;
        let start = t_min.saturating_sub(window);
        let end = t_max + window;

        let mut activity: indexmap::IndexMap<&str, usize> = indexmap::IndexMap::new();
        for line in self.store.lines() {
            let (Some(thread_id), Some(ts)) = (&line.thread_id, line.timestamp_ms) else {
                continue;
            };
            if ts < start || ts > end {
                continue;
            }
            if SDK_EXPANSION_KEYWORDS.iter().any(|k| line.text.contains(k)) {
                *activity.entry(thread_id.as_str()).or_insert(0) += 1;
            }
        }

        activity
            .into_iter()
            .filter(|(_, count)| *count >= self.settings.keyword_threshold)
            .map(|(id, _)| id.to_string())
            .collect()
    }

    /// Min/max header timestamp over lines literally containing the ID.
    fn literal_time_range(&self, session_id: &str) -> Option<(u64, u64)> {
        let mut range: Option<(u64, u64)> = None;
        for line in self.store.lines() {
            if !line.text.contains(session_id) {
                continue;
            }
            if let Some(ts) = line.timestamp_ms {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(ts), hi.max(ts)),
                    None => (ts, ts),
                });
            }
        }
        range
    }

    /// Degraded path: literal mentions, their threads, and SDK-marker
    /// lines inside a buffer capped relative to the session duration.
    fn degraded_search(&self, session_id: &str) -> Vec<&'a LogLine> {
        let mut session_lines = Vec::new();
        let mut session_threads: IndexSet<&str> = IndexSet::new();
        let mut range: Option<(u64, u64)> = None;

        for line in self.store.lines() {
            if !line.text.contains(session_id) {
                continue;
            }
            session_lines.push(line);
            if let Some(thread_id) = &line.thread_id {
                session_threads.insert(thread_id.as_str());
            }
            if let Some(ts) = line.timestamp_ms {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(ts), hi.max(ts)),
                    None => (ts, ts),
                });
            }
        }

        let Some((start, end)) = range else {
            return session_lines;
        };
        let buffer = self.settings.degraded_cap_ms.min((end - start) * 2);

        for line in self.store.lines() {
            if line.text.contains(session_id) {
                continue;
            }
            let (Some(thread_id), Some(ts)) = (&line.thread_id, line.timestamp_ms) else {
                continue;
            };
            if ts < start.saturating_sub(buffer) || ts > end + buffer {
                continue;
            }
            if session_threads.contains(thread_id.as_str())
                || self
                    .catalog
                    .degraded_sdk_markers
                    .iter()
                    .any(|re| re.is_match(&line.text))
            {
                session_lines.push(line);
            }
        }
        session_lines
    }
}

/// Stable sort by header timestamp; headerless lines order as time 0.
fn sorted_by_timestamp(mut lines: Vec<&LogLine>) -> Vec<&LogLine> {
    lines.sort_by_key(|l| l.sort_timestamp());
    lines
}
