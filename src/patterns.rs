//! Pattern catalog for speech SDK log lines.
//!
//! Every matcher the pipeline uses lives here, compiled once into an
//! immutable [`PatternCatalog`] that is passed explicitly to each
//! component. Entries are pure text matchers with no side effects;
//! they tolerate variable whitespace and missing optional fields.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

/// Shared catalog instance so repeated analyzer construction does not
/// recompile the pattern table.
static SHARED: Lazy<Arc<PatternCatalog>> = Lazy::new(|| Arc::new(PatternCatalog::new()));

/// Literal substrings used to expand a session's thread set during
/// reconstruction. Matched case-sensitively, first hit counts.
pub const SDK_EXPANSION_KEYWORDS: &[&str] = &[
    "SPX_",
    "CognitiveSpeech",
    "AudioConfig",
    "SpeechConfig",
    "RecognitionResult",
    "StartRecognition",
    "StopRecognition",
    "WebSocket",
    "speech.",
    "turn.",
    "AudioInputStream",
    "CSpx",
    "ISpx",
    "speechsdk",
];

/// The complete matcher table for SDK diagnostic logs.
#[derive(Debug)]
pub struct PatternCatalog {
    // Line header
    /// `[threadId]: <n>ms` header prefix; captures (thread_id, timestamp_ms).
    pub header: Regex,

    // Session markers
    /// Authoritative session start event; captures the session ID.
    pub session_started: Regex,
    /// Generic `SessionId:` mention anywhere; captures the session ID.
    pub session_id: Regex,
    /// Owning audio stream session address on the start event line.
    pub audio_stream_session: Regex,

    // Thread lifecycle
    /// `Started thread <Name> with ID [<id>ll]`; captures (name, id).
    pub thread_started: Regex,

    // State transitions
    /// Recognizer/session state transition; captures the four states.
    pub state_change: Regex,
    /// Adapter audio/usp state transition; captures the four states.
    pub adapter_state: Regex,

    // Websocket events
    /// Open requested.
    pub websocket_start: Regex,
    /// Open completed.
    pub websocket_opened: Regex,
    /// Connection closed.
    pub websocket_closed: Regex,
    /// Outbound message send started.
    pub websocket_send: Regex,
    /// Outbound message send completed.
    pub websocket_send_complete: Regex,
    /// Inbound service message received.
    pub websocket_message_received: Regex,

    // Audio events
    /// Audio chunk received by the session.
    pub audio_chunk: Regex,
    /// `read frame duration: <n> ms`; captures the duration.
    pub frame_duration: Regex,
    /// Pump read progress; captures total bytes read.
    pub pump_read: Regex,
    /// End of audio stream detected.
    pub audio_end: Regex,

    // Performance fields
    /// `unacknowledgedAudioDuration = <n> msec`; captures the duration.
    pub unacknowledged_audio: Regex,
    /// Upload rate in KB/s; captures the rate.
    pub upload_rate: Regex,
    /// `RESULT-RecognitionLatencyMs` property; captures the latency.
    pub recognition_latency: Regex,
    /// `TimeInQueue: <n>ms`; captures the delay.
    pub time_in_queue: Regex,
    /// Service timestamp of a turn.start response; captures the TS.
    pub turn_start_ts: Regex,
    /// Service timestamp of a speech.hypothesis response; captures the TS.
    pub first_hypothesis_ts: Regex,

    // Recognition events
    /// turn.start response path.
    pub turn_start: Regex,
    /// turn.end response path.
    pub turn_end: Regex,
    /// speech.startDetected response path.
    pub speech_start: Regex,
    /// speech.endDetected response path.
    pub speech_end: Regex,
    /// speech.hypothesis response (either wire or event form).
    pub speech_hypothesis: Regex,
    /// speech.phrase response (either wire or event form).
    pub speech_phrase: Regex,

    // Recognition result fields
    /// `Text: <text>`; captures the recognized text.
    pub recognition_text: Regex,
    /// `RecognitionStatus: <status>`; captures the status token.
    pub recognition_status: Regex,
    /// `Confidence: <score>`; captures the score.
    pub confidence: Regex,
    /// `Duration: <ticks>`; captures the duration.
    pub duration_field: Regex,
    /// `Offset: <ticks>`; captures the offset.
    pub offset_field: Regex,

    // Errors
    /// Generic error/exception keyword.
    pub error_keyword: Regex,

    // Thread correlation
    /// SPEECH-Region property read on the background thread; captures the
    /// caller's memory address in `0x` or `0x0x` notation.
    pub region_property: Regex,
    /// Audio pump startup; captures the pump object address.
    pub pump_start: Regex,
    /// Markers identifying the pump thread itself, in priority order.
    pub pump_thread_markers: Vec<Regex>,
    /// Streaming pipeline markers, in priority order.
    pub gstreamer_markers: Vec<Regex>,
    /// SDK initialization markers for the temporal proximity fallback.
    pub sdk_init_markers: Vec<Regex>,
    /// Reduced SDK markers for degraded reconstruction.
    pub degraded_sdk_markers: Vec<Regex>,

    // Recognizer configuration properties
    /// Capture sample rate.
    pub cfg_sample_rate: Regex,
    /// Bits per sample.
    pub cfg_bits_per_sample: Regex,
    /// Channel count.
    pub cfg_channels: Regex,
    /// Recognition mode.
    pub cfg_reco_mode: Regex,
    /// Recognition language.
    pub cfg_reco_language: Regex,
    /// Auto-detect language candidates.
    pub cfg_auto_detect_languages: Regex,
    /// Language identification mode.
    pub cfg_language_id_mode: Regex,
    /// Segmentation silence timeout.
    pub cfg_segmentation_timeout: Regex,
    /// Maximum buffer size.
    pub cfg_buffer_size: Regex,
    /// Deployment region.
    pub cfg_region: Regex,
    /// Connection URL.
    pub cfg_connection_url: Regex,
    /// HTTP user agent.
    pub cfg_user_agent: Regex,
}

impl PatternCatalog {
    /// Compile the full catalog. All patterns are fixed and known-good,
    /// so compilation cannot fail at runtime.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Regex::new(r"^\[(\d+)\]:\s*(\d+)ms").unwrap(),

            session_started: Regex::new(
                r"(?i)Firing SessionStarted event: SessionId:\s*([a-f0-9\-]{32,36})",
            )
            .unwrap(),
            session_id: Regex::new(r"(?i)SessionId:\s*([a-f0-9\-]{32,36})").unwrap(),
            audio_stream_session: Regex::new(
                r"(?i)\[([A-F0-9x]{10,18})\]CSpxAudioStreamSession::FireSessionStartedEvent",
            )
            .unwrap(),

            thread_started: Regex::new(r"Started thread (\w+) with ID \[(\d+)ll\]").unwrap(),

            state_change: Regex::new(
                r"TryChangeState: recoKind/sessionState: (\d+)/(\d+) => (\d+)/(\d+)",
            )
            .unwrap(),
            adapter_state: Regex::new(
                r"TryChangeState: audioState/uspState: (\d+)/(\d+) => (\d+)/(\d+)",
            )
            .unwrap(),

            websocket_start: Regex::new(r"Start to open websocket").unwrap(),
            websocket_opened: Regex::new(r"Opening websocket completed|OnWebSocketOpened").unwrap(),
            websocket_closed: Regex::new(r"OnWebSocketClosed").unwrap(),
            websocket_send: Regex::new(r"Web socket sending message").unwrap(),
            websocket_send_complete: Regex::new(r"Web socket send message completed").unwrap(),
            websocket_message_received: Regex::new(r"USP message received").unwrap(),

            audio_chunk: Regex::new(r"Received audio chunk:").unwrap(),
            frame_duration: Regex::new(r"read frame duration:\s*(\d+)\s*ms").unwrap(),
            pump_read: Regex::new(r"Read: totalBytesRead=(\d+)").unwrap(),
            audio_end: Regex::new(r"Read: End of stream detected|read ZERO \(0\) bytes").unwrap(),

            unacknowledged_audio: Regex::new(r"unacknowledgedAudioDuration\s*=\s*(\d+)\s*msec")
                .unwrap(),
            upload_rate: Regex::new(r"Web socket upload rate.*?(\d+\.?\d*)\s*KB/s").unwrap(),
            recognition_latency: Regex::new(
                r"name='RESULT-RecognitionLatencyMs';\s*value='(\d+)'",
            )
            .unwrap(),
            time_in_queue: Regex::new(r"TimeInQueue:\s*(\d+)ms").unwrap(),
            turn_start_ts: Regex::new(r"TS:(\d+)\s+Response Message: path: turn\.start").unwrap(),
            first_hypothesis_ts: Regex::new(
                r"TS:(\d+)\s+Response Message: path: speech\.hypothesis",
            )
            .unwrap(),

            turn_start: Regex::new(r"path:\s*turn\.start").unwrap(),
            turn_end: Regex::new(r"path:\s*turn\.end").unwrap(),
            speech_start: Regex::new(r"path:\s*speech\.startDetected").unwrap(),
            speech_end: Regex::new(r"path:\s*speech\.endDetected").unwrap(),
            speech_hypothesis: Regex::new(
                r"(?i)path:\s*speech\.hypothesis|Response:\s*Speech\.Hypothesis\s+message",
            )
            .unwrap(),
            speech_phrase: Regex::new(
                r"(?i)path:\s*speech\.phrase|Response:\s*Speech\.Phrase\s+message",
            )
            .unwrap(),

            recognition_text: Regex::new(r"(?i)Text:\s+(.+?)\s*$").unwrap(),
            recognition_status: Regex::new(r"RecognitionStatus:\s*(\w+)").unwrap(),
            confidence: Regex::new(r"Confidence:\s*(\d+\.?\d*)").unwrap(),
            duration_field: Regex::new(r"Duration:\s*(\d+)").unwrap(),
            offset_field: Regex::new(r"Offset:\s*(\d+)").unwrap(),

            error_keyword: Regex::new(r"ERROR|EXCEPTION|Failed|Error").unwrap(),

            region_property: Regex::new(
                r"(?i)named_properties\.h:479\s+ISpxNamedProperties::GetStringValue:\s+this=(0x(?:0x)?[0-9a-fA-F]+).*?name='SPEECH-Region'",
            )
            .unwrap(),
            pump_start: Regex::new(r"(?i)\[([A-F0-9x]{10,18})\]CSpxAudioPump::StartPump\(\)")
                .unwrap(),
            pump_thread_markers: vec![
                Regex::new(r"(?i)\*\*\* AudioPump THREAD started! \*\*\*").unwrap(),
                Regex::new(r"(?i)PumpThread\(\): getting format from reader\.\.\.").unwrap(),
            ],
            gstreamer_markers: vec![
                Regex::new(r"(?i)base_gstreamer\.cpp:\d+ PushDataToPipeline:").unwrap(),
                Regex::new(r"(?i)opus_decoder\.cpp:\d+ Received new pad").unwrap(),
                Regex::new(r"(?i)oggdemux").unwrap(),
            ],
            sdk_init_markers: vec![
                Regex::new(r"(?i)StartRecognitionAsync").unwrap(),
                Regex::new(r"(?i)SpeechConfig").unwrap(),
                Regex::new(r"(?i)AudioConfig").unwrap(),
                Regex::new(r"(?i)CreateRecognizer").unwrap(),
                Regex::new(r"(?i)main\s*\(").unwrap(),
                Regex::new(r"(?i)WinMain").unwrap(),
                Regex::new(r"(?i)Application").unwrap(),
            ],
            degraded_sdk_markers: vec![
                Regex::new(r"(?i)SPX_[A-Z_]+").unwrap(),
                Regex::new(r"(?i)CognitiveSpeech").unwrap(),
                Regex::new(r"(?i)speech\.[a-zA-Z]+").unwrap(),
                Regex::new(r"(?i)turn\.[a-zA-Z]+").unwrap(),
                Regex::new(r"(?i)RecognitionResult").unwrap(),
                Regex::new(r"(?i)AudioConfig").unwrap(),
                Regex::new(r"(?i)SpeechConfig").unwrap(),
                Regex::new(r"(?i)WebSocket").unwrap(),
                Regex::new(r"(?i)StartRecognition").unwrap(),
                Regex::new(r"(?i)StopRecognition").unwrap(),
            ],

            cfg_sample_rate: Regex::new(
                r"name='AudioConfig_SampleRateForCapture';\s*value='(\d+)'",
            )
            .unwrap(),
            cfg_bits_per_sample: Regex::new(
                r"name='AudioConfig_BitsPerSampleForCapture';\s*value='(\d+)'",
            )
            .unwrap(),
            cfg_channels: Regex::new(
                r"name='AudioConfig_NumberOfChannelsForCapture';\s*value='(\d+)'",
            )
            .unwrap(),
            cfg_reco_mode: Regex::new(r"name='SPEECH-RecoMode';\s*value='(\w+)'").unwrap(),
            cfg_reco_language: Regex::new(r"name='SPEECH-RecoLanguage';\s*value='([^']+)'")
                .unwrap(),
            cfg_auto_detect_languages: Regex::new(
                r"name='Auto-Detect-Source-Languages';\s*value='([^']+)'",
            )
            .unwrap(),
            cfg_language_id_mode: Regex::new(r"name='SPEECH-LanguageIdMode';\s*value='(\w+)'")
                .unwrap(),
            cfg_segmentation_timeout: Regex::new(
                r"name='SPEECH-SegmentationSilenceTimeoutMs';\s*value='(\d+)'",
            )
            .unwrap(),
            cfg_buffer_size: Regex::new(r"name='SPEECH-MaxBufferSizeMs';\s*value='(\d+)'").unwrap(),
            cfg_region: Regex::new(r"name='SPEECH-Region';\s*value='([^']+)'").unwrap(),
            cfg_connection_url: Regex::new(r"name='SPEECH-ConnectionUrl';\s*value='([^']+)'")
                .unwrap(),
            cfg_user_agent: Regex::new(r"name='HttpHeader#User-agent';\s*value='([^']+)'").unwrap(),
        }
    }

    /// Get the process-wide shared catalog.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the first capture group of `re` from `text` as a `u64`.
pub(crate) fn capture_u64(re: &Regex, text: &str) -> Option<u64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract the first capture group of `re` from `text` as an `f64`.
pub(crate) fn capture_f64(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract the first capture group of `re` from `text` as a `String`.
pub(crate) fn capture_str(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_captures_thread_and_timestamp() {
        let catalog = PatternCatalog::new();
        let caps = catalog
            .header
            .captures("[4176]: 3672ms SPX_TRACE_INFO: session.cpp:100 message")
            .unwrap();
        assert_eq!(&caps[1], "4176");
        assert_eq!(&caps[2], "3672");
    }

    #[test]
    fn test_header_requires_line_start() {
        let catalog = PatternCatalog::new();
        assert!(catalog.header.captures("x [4176]: 3672ms").is_none());
    }

    #[test]
    fn test_session_started_is_case_insensitive() {
        let catalog = PatternCatalog::new();
        let line = "firing sessionstarted event: sessionid: ABCDEF12-3456-7890-abcd-ef1234567890";
        let caps = catalog.session_started.captures(line).unwrap();
        assert_eq!(&caps[1], "ABCDEF12-3456-7890-abcd-ef1234567890");
    }

    #[test]
    fn test_session_id_rejects_short_tokens() {
        let catalog = PatternCatalog::new();
        assert!(catalog.session_id.captures("SessionId: abc123").is_none());
    }

    #[test]
    fn test_thread_started_captures_name_and_id() {
        let catalog = PatternCatalog::new();
        let caps = catalog
            .thread_started
            .captures("Started thread Background with ID [140234ll]")
            .unwrap();
        assert_eq!(&caps[1], "Background");
        assert_eq!(&caps[2], "140234");
    }

    #[test]
    fn test_region_property_accepts_both_address_notations() {
        let catalog = PatternCatalog::new();
        for addr in ["0x00007f9b94183400", "0x0x00007F9B94183400"] {
            let line = format!(
                "named_properties.h:479 ISpxNamedProperties::GetStringValue: this={addr}; name='SPEECH-Region'; value='westus'"
            );
            let caps = catalog.region_property.captures(&line).unwrap();
            assert_eq!(&caps[1], addr);
        }
    }

    #[test]
    fn test_upload_rate_captures_fractional() {
        let catalog = PatternCatalog::new();
        let line = "Web socket upload rate (KB/s): average=54.3 KB/s";
        assert_eq!(capture_f64(&catalog.upload_rate, line), Some(54.3));
    }

    #[test]
    fn test_config_value_capture() {
        let catalog = PatternCatalog::new();
        let line = "propertybag: name='SPEECH-Region'; value='eastus2'";
        assert_eq!(
            capture_str(&catalog.cfg_region, line),
            Some("eastus2".to_string())
        );
    }

    #[test]
    fn test_pump_start_captures_address() {
        let catalog = PatternCatalog::new();
        let line = "[0x7f9b94999900]CSpxAudioPump::StartPump()";
        assert_eq!(
            capture_str(&catalog.pump_start, line),
            Some("0x7f9b94999900".to_string())
        );
    }

    #[test]
    fn test_state_transition_markers() {
        let catalog = PatternCatalog::new();
        let caps = catalog
            .state_change
            .captures("TryChangeState: recoKind/sessionState: 1/2 => 1/3")
            .unwrap();
        assert_eq!(&caps[4], "3");
        assert!(catalog
            .adapter_state
            .is_match("TryChangeState: audioState/uspState: 0/1 => 2/1"));
    }

    #[test]
    fn test_audio_progress_markers() {
        let catalog = PatternCatalog::new();
        assert_eq!(
            capture_u64(&catalog.pump_read, "Read: totalBytesRead=64000"),
            Some(64000)
        );
        assert!(catalog.audio_end.is_match("Read: End of stream detected"));
        assert!(catalog.audio_end.is_match("buffer read ZERO (0) bytes"));
        assert!(catalog
            .websocket_send_complete
            .is_match("Web socket send message completed. TimeInQueue: 3ms"));
    }

    #[test]
    fn test_shared_catalog_is_singleton() {
        let a = PatternCatalog::shared();
        let b = PatternCatalog::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
