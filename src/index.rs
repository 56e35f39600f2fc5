//! Session enumeration over a parsed log.
//!
//! One pass over the line store yields two views of the sessions a log
//! mentions: a cheap summary list (every ID sighted anywhere) and the
//! authoritative core identifier table (only sessions with a real
//! `Firing SessionStarted event` line). A session can appear in the
//! summary list without a core identifier; such sessions are listable
//! but not analyzable.

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::model::{normalize_session_id, CoreIdentifier, SessionSummary};
use crate::patterns::PatternCatalog;
use crate::store::LineStore;

/// Index of every session the log mentions.
#[derive(Debug, Clone, Default)]
pub struct SessionIndex {
    summaries: Vec<SessionSummary>,
    core: IndexMap<String, CoreIdentifier>,
}

impl SessionIndex {
    /// Build the index in a single pass over the store.
    ///
    /// For both views, sessions are keyed by normalized (lowercased) ID
    /// and the first sighting wins; later mentions of the same session
    /// never replace earlier evidence.
    #[instrument(skip_all)]
    #[must_use]
    pub fn build(store: &LineStore, catalog: &PatternCatalog) -> Self {
        let mut summaries: Vec<SessionSummary> = Vec::new();
        let mut seen: IndexMap<String, ()> = IndexMap::new();
        let mut core: IndexMap<String, CoreIdentifier> = IndexMap::new();

        for line in store.lines() {
            if let Some(caps) = catalog.session_id.captures(&line.text) {
                let raw_id = caps[1].to_string();
                let key = normalize_session_id(&raw_id);
                if seen.insert(key, ()).is_none() {
                    summaries.push(SessionSummary {
                        session_id: raw_id,
                        start_line: line.line_number,
                    });
                }
            }

            if let Some(caps) = catalog.session_started.captures(&line.text) {
                let raw_id = caps[1].to_string();
                let key = normalize_session_id(&raw_id);
                if !core.contains_key(&key) {
                    let audio_stream_address = catalog
                        .audio_stream_session
                        .captures(&line.text)
                        .map(|c| c[1].to_string());
                    core.insert(
                        key,
                        CoreIdentifier {
                            session_id: raw_id,
                            audio_stream_address,
                            background_thread_id: line.thread_id.clone(),
                            discovery_line: line.line_number,
                            raw_line: line.text.clone(),
                        },
                    );
                }
            }
        }

        debug!(
            sessions = summaries.len(),
            core_identifiers = core.len(),
            "session index built"
        );
        Self { summaries, core }
    }

    /// Summaries for every session sighted anywhere, in first-sighting order.
    #[must_use]
    pub fn summaries(&self) -> &[SessionSummary] {
        &self.summaries
    }

    /// Core identifiers keyed by normalized session ID, in discovery order.
    #[must_use]
    pub fn core_identifiers(&self) -> &IndexMap<String, CoreIdentifier> {
        &self.core
    }

    /// Look up a core identifier by session ID, case-insensitively.
    #[must_use]
    pub fn core_for(&self, session_id: &str) -> Option<&CoreIdentifier> {
        self.core.get(&normalize_session_id(session_id))
    }

    /// Whether any session has an authoritative start event.
    #[must_use]
    pub fn has_core_identifiers(&self) -> bool {
        !self.core.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SID: &str = "abcdef12-3456-7890-abcd-ef1234567890";

    fn index(text: &str) -> SessionIndex {
        let catalog = PatternCatalog::new();
        let store = LineStore::parse(text, &catalog);
        SessionIndex::build(&store, &catalog)
    }

    #[test]
    fn test_summary_without_core_identifier() {
        let idx = index(&format!("[10]: 5ms usp.cpp request SessionId: {SID}"));
        assert_eq!(idx.summaries().len(), 1);
        assert_eq!(idx.summaries()[0].session_id, SID);
        assert_eq!(idx.summaries()[0].start_line, 1);
        assert!(idx.core_for(SID).is_none());
        assert!(!idx.has_core_identifiers());
    }

    #[test]
    fn test_core_identifier_fields() {
        let line = format!(
            "[77]: 40ms [0x00007F9B94183400]CSpxAudioStreamSession::FireSessionStartedEvent: \
             Firing SessionStarted event: SessionId: {SID}"
        );
        let idx = index(&line);
        let core = idx.core_for(SID).unwrap();
        assert_eq!(core.session_id, SID);
        assert_eq!(
            core.audio_stream_address.as_deref(),
            Some("0x00007F9B94183400")
        );
        assert_eq!(core.background_thread_id.as_deref(), Some("77"));
        assert_eq!(core.discovery_line, 1);
    }

    #[test]
    fn test_first_sighting_and_first_event_win() {
        let upper = SID.to_ascii_uppercase();
        let text = format!(
            "[1]: 5ms early mention SessionId: {SID}\n\
             [77]: 40ms Firing SessionStarted event: SessionId: {SID}\n\
             [88]: 90ms Firing SessionStarted event: SessionId: {upper}"
        );
        let idx = index(&text);
        assert_eq!(idx.summaries().len(), 1);
        assert_eq!(idx.summaries()[0].start_line, 1);

        // the duplicate event under a different spelling does not replace
        // the first core identifier
        assert_eq!(idx.core_identifiers().len(), 1);
        let core = idx.core_for(&upper).unwrap();
        assert_eq!(core.discovery_line, 2);
        assert_eq!(core.background_thread_id.as_deref(), Some("77"));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let idx = index(&format!("[77]: 40ms Firing SessionStarted event: SessionId: {SID}"));
        assert!(idx.core_for(&SID.to_ascii_uppercase()).is_some());
    }
}
