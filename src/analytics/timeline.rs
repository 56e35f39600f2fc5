//! Session lifecycle timeline construction.

use tracing::instrument;

use crate::model::{TimelineEvent, TimelineEventKind};
use crate::patterns::PatternCatalog;

use super::{truncate_excerpt, ExcerptLine};

/// Maximum characters kept from a line in a timeline entry.
const EXCERPT_LIMIT: usize = 100;

/// Builds lifecycle timelines from session excerpts.
#[derive(Debug)]
pub struct TimelineBuilder<'a> {
    catalog: &'a PatternCatalog,
}

impl<'a> TimelineBuilder<'a> {
    /// Create a builder using the given catalog.
    #[must_use]
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self { catalog }
    }

    /// Build the timeline for one session excerpt, ascending by
    /// timestamp with headerless lines ordering first.
    ///
    /// Each line contributes at most one event; kinds are tried in a
    /// fixed priority order and the first match wins.
    #[instrument(skip_all)]
    #[must_use]
    pub fn build(&self, lines: &[ExcerptLine]) -> Vec<TimelineEvent> {
        let kinds = [
            (TimelineEventKind::SessionStart, &self.catalog.session_started),
            (TimelineEventKind::WebsocketOpen, &self.catalog.websocket_opened),
            (TimelineEventKind::SpeechStart, &self.catalog.speech_start),
            (TimelineEventKind::SpeechEnd, &self.catalog.speech_end),
            (TimelineEventKind::TurnStart, &self.catalog.turn_start),
            (TimelineEventKind::TurnEnd, &self.catalog.turn_end),
            (TimelineEventKind::WebsocketClose, &self.catalog.websocket_closed),
        ];

        let mut timeline = Vec::new();
        for line in lines {
            let timestamp_ms = self
                .catalog
                .header
                .captures(&line.text)
                .and_then(|c| c[2].parse().ok());

            for (kind, pattern) in &kinds {
                if pattern.is_match(&line.text) {
                    timeline.push(TimelineEvent {
                        line_number: line.number,
                        timestamp_ms,
                        event_type: *kind,
                        excerpt: truncate_excerpt(&line.text, EXCERPT_LIMIT),
                    });
                    break;
                }
            }
        }

        timeline.sort_by_key(|e| e.timestamp_ms.unwrap_or(0));
        timeline
    }
}
