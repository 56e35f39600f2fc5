//! Report payloads returned by the analyzer facade: session details,
//! timelines, recognition results, and thread analysis.

use indexmap::IndexMap;
use serde::Serialize;

use super::{CoreIdentifier, PerformanceMetrics, ThreadRoleSet};

/// Lifecycle event kinds tracked by the timeline builder, in the fixed
/// priority order used when a line matches more than one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    /// Authoritative session start event.
    SessionStart,
    /// Websocket open completed.
    WebsocketOpen,
    /// Speech start detected by the service.
    SpeechStart,
    /// Speech end detected by the service.
    SpeechEnd,
    /// Turn started.
    TurnStart,
    /// Turn ended.
    TurnEnd,
    /// Websocket closed.
    WebsocketClose,
}

/// One lifecycle event in a session timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    /// 1-based position within the session excerpt.
    pub line_number: usize,
    /// Header timestamp of the line, if present.
    pub timestamp_ms: Option<u64>,
    /// Event type.
    pub event_type: TimelineEventKind,
    /// Line excerpt, truncated to 100 characters.
    pub excerpt: String,
}

/// One recognition result (hypothesis or final phrase) carrying text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionResult {
    /// 1-based position within the session excerpt.
    pub line_number: usize,
    /// Recognized text.
    pub text: String,
    /// Recognition status, when reported on the same line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Confidence score, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Result duration in ticks, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Result offset in ticks, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// One error or exception line found in a session excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// 1-based position within the session excerpt.
    pub line_number: usize,
    /// The offending line, truncated to 200 characters.
    pub message: String,
}

/// Recognizer configuration extracted from `name='K'; value='V'` property
/// reads, grouped the way the SDK groups them. First occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecognitionConfig {
    /// Audio capture settings.
    pub audio: AudioConfig,
    /// Recognition settings.
    pub recognition: RecognizerConfig,
    /// System and connection settings.
    pub system: SystemConfig,
}

/// Audio capture settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudioConfig {
    /// Capture sample rate in Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<String>,
    /// Bits per sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bits_per_sample: Option<String>,
    /// Channel count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<String>,
}

/// Recognition settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecognizerConfig {
    /// Recognition mode (interactive, conversation, dictation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Recognition language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Candidate languages for auto-detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_detect_languages: Option<String>,
    /// Language identification mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_id_mode: Option<String>,
    /// Segmentation silence timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmentation_timeout: Option<String>,
}

/// System and connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemConfig {
    /// Maximum audio buffer size in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<String>,
    /// Deployment region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Service connection URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_url: Option<String>,
    /// HTTP user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Basic session identity information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BasicInfo {
    /// The session ID, when any excerpt line carries one.
    pub session_id: Option<String>,
}

/// Full per-session report returned by `session_details`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetails {
    /// The requested session ID.
    pub session_id: String,
    /// Basic identity details.
    pub basic_info: BasicInfo,
    /// Extracted recognizer configuration.
    pub recognition_config: RecognitionConfig,
    /// Derived performance metrics.
    pub performance_metrics: PerformanceMetrics,
    /// Recognition results in session order.
    pub recognition_results: Vec<RecognitionResult>,
    /// Error and exception lines.
    pub error_analysis: Vec<ErrorEntry>,
    /// Lifecycle timeline, ascending by timestamp.
    pub timeline: Vec<TimelineEvent>,
}

/// Result of thread analysis across one or all sessions.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadAnalysis {
    /// Core identifiers keyed by session ID, in discovery order.
    pub core_identifiers: IndexMap<String, CoreIdentifier>,
    /// Resolved thread role sets keyed by session ID.
    pub session_threads: IndexMap<String, ThreadRoleSet>,
    /// Set when exactly one session was analyzed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_session: Option<String>,
}

impl ThreadAnalysis {
    /// The role set for the primary session, when one exists.
    #[must_use]
    pub fn primary_threads(&self) -> Option<&ThreadRoleSet> {
        self.primary_session
            .as_deref()
            .and_then(|sid| self.session_threads.get(sid))
    }
}
