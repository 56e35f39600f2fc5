//! Data model for speech SDK diagnostic logs.
//!
//! This module provides strongly-typed structures for everything the
//! analysis pipeline derives from a log: parsed lines, session identity
//! records, thread role assignments, performance metrics, and report
//! payloads. "Field absent" is always modeled as `Option`, never as a
//! zero sentinel.

pub mod metrics;
pub mod report;

pub use metrics::*;
pub use report::*;

use serde::Serialize;

/// A single parsed log line. Derived once at load time, never mutated.
///
/// The optional `thread_id` and `timestamp_ms` come from the leading
/// `[threadId]: <n>ms` header the SDK writes on most lines; lines without
/// a header (continuation lines, stack dumps) carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    /// 1-based line number in the source file.
    pub line_number: usize,
    /// Relative timestamp in milliseconds, if the line carries a header.
    pub timestamp_ms: Option<u64>,
    /// Numeric thread ID from the header, if present.
    pub thread_id: Option<String>,
    /// The full line text with trailing newline removed.
    pub text: String,
}

impl LogLine {
    /// Timestamp used for ordering: absent sorts as 0.
    #[must_use]
    pub fn sort_timestamp(&self) -> u64 {
        self.timestamp_ms.unwrap_or(0)
    }
}

/// Cheap per-session summary from the enumeration pass.
///
/// A summary exists for every session ID seen anywhere in the log, even
/// when no authoritative start event exists for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// The session ID as captured from the log.
    pub session_id: String,
    /// 1-based line number of the first mention.
    pub start_line: usize,
}

/// Authoritative identity record for one session, captured from its
/// "Firing SessionStarted event" line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreIdentifier {
    /// The session ID.
    pub session_id: String,
    /// Memory address of the owning audio stream session object, when the
    /// start event line carries one.
    pub audio_stream_address: Option<String>,
    /// Header thread ID of the start event line (the background thread).
    pub background_thread_id: Option<String>,
    /// 1-based line number where the start event was found.
    pub discovery_line: usize,
    /// The raw start event line.
    pub raw_line: String,
}

/// Roles a physical thread can play relative to one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadRole {
    /// The application thread that created the recognizer.
    Main,
    /// The thread that spawned the session's background thread.
    Kickoff,
    /// The session's own worker thread.
    Background,
    /// The user event dispatch thread.
    User,
    /// The audio pump thread.
    Audio,
    /// The streaming pipeline (GStreamer) thread.
    Gstreamer,
}

impl ThreadRole {
    /// All roles in resolution priority order.
    pub const ALL: [Self; 6] = [
        Self::Main,
        Self::Kickoff,
        Self::Background,
        Self::User,
        Self::Audio,
        Self::Gstreamer,
    ];

    /// Human-readable label for this role.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Main => "Main thread",
            Self::Kickoff => "Kickoff thread",
            Self::Background => "Background thread",
            Self::User => "User thread",
            Self::Audio => "Audio thread",
            Self::Gstreamer => "GStreamer thread",
        }
    }
}

impl std::fmt::Display for ThreadRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Evidence binding a thread ID to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadBinding {
    /// The resolved thread ID.
    pub thread_id: String,
    /// Line where the binding was discovered.
    pub discovery_line: usize,
    /// The raw line the binding was derived from.
    pub raw_line: String,
}

/// Thread role assignments for one session. Every role is optional;
/// absence means the heuristics found no evidence, which is a normal
/// outcome rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThreadRoleSet {
    /// The session this set belongs to.
    pub session_id: String,
    /// Memory address of the owning session object, if known.
    pub audio_stream_address: Option<String>,
    /// Resolved main (application) thread.
    pub main: Option<ThreadBinding>,
    /// Resolved kickoff thread.
    pub kickoff: Option<ThreadBinding>,
    /// Resolved background thread.
    pub background: Option<ThreadBinding>,
    /// Resolved user event thread.
    pub user: Option<ThreadBinding>,
    /// Resolved audio pump thread.
    pub audio: Option<ThreadBinding>,
    /// Resolved streaming pipeline thread.
    pub gstreamer: Option<ThreadBinding>,
}

impl ThreadRoleSet {
    /// Get the binding for a role.
    #[must_use]
    pub fn get(&self, role: ThreadRole) -> Option<&ThreadBinding> {
        match role {
            ThreadRole::Main => self.main.as_ref(),
            ThreadRole::Kickoff => self.kickoff.as_ref(),
            ThreadRole::Background => self.background.as_ref(),
            ThreadRole::User => self.user.as_ref(),
            ThreadRole::Audio => self.audio.as_ref(),
            ThreadRole::Gstreamer => self.gstreamer.as_ref(),
        }
    }

    /// Set the binding for a role.
    pub fn set(&mut self, role: ThreadRole, binding: ThreadBinding) {
        let slot = match role {
            ThreadRole::Main => &mut self.main,
            ThreadRole::Kickoff => &mut self.kickoff,
            ThreadRole::Background => &mut self.background,
            ThreadRole::User => &mut self.user,
            ThreadRole::Audio => &mut self.audio,
            ThreadRole::Gstreamer => &mut self.gstreamer,
        };
        *slot = Some(binding);
    }

    /// Iterate over all resolved (role, binding) pairs in priority order.
    pub fn resolved(&self) -> impl Iterator<Item = (ThreadRole, &ThreadBinding)> {
        ThreadRole::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|b| (role, b)))
    }

    /// Collect the distinct thread IDs resolved in this set.
    #[must_use]
    pub fn thread_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for (_, binding) in self.resolved() {
            if !ids.contains(&binding.thread_id) {
                ids.push(binding.thread_id.clone());
            }
        }
        ids
    }

    /// Number of resolved roles.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved().count()
    }
}

/// Normalize a session ID for identity comparison.
///
/// Session IDs are case-insensitive hex-with-dashes tokens; two spellings
/// that differ only in letter case denote the same session.
#[must_use]
pub fn normalize_session_id(session_id: &str) -> String {
    session_id.to_ascii_lowercase()
}
