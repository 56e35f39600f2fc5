//! Integration tests for spxsift.
//!
//! These tests drive the full pipeline (load, index, correlate,
//! reconstruct, report) over synthetic trace fixtures, plus a smoke
//! test of the CLI binary.

use spxsift::config::ReconstructionConfig;
use spxsift::model::ThreadRole;
use spxsift::{LogAnalyzer, SiftError};

const SID_A: &str = "abcdef12-3456-7890-abcd-ef1234567890";
const SID_B: &str = "11111111-2222-3333-4444-555555555555";

/// A two-session trace with interleaved threads, out-of-order
/// timestamps, and the full correlation evidence for session A.
fn two_session_trace() -> String {
    format!(
        "[100]: 10ms this=0x00007F9B94183400; CSpxAudioStreamSession::Init\n\
         [5]: 20ms SPX_TRACE_INFO: Started thread Background with ID [77ll]\n\
         [10]: 25ms StartRecognitionAsync for the second recognizer\n\
         [77]: 30ms named_properties.h:479 ISpxNamedProperties::GetStringValue: this=0x0x00007F9B94183400; name='SPEECH-Region'; value='westus'\n\
         [77]: 40ms [0x00007F9B94183400]CSpxAudioStreamSession::FireSessionStartedEvent: Firing SessionStarted event: SessionId: {SID_A}\n\
         [10]: 42ms Started thread Background with ID [20ll]\n\
         [20]: 45ms Firing SessionStarted event: SessionId: {SID_B}\n\
         [77]: 50ms Started thread User with ID [88ll]\n\
         [77]: 60ms [0x00007F9B94999900]CSpxAudioPump::StartPump()\n\
         [55]: 70ms [0x00007F9B94999900] *** AudioPump THREAD started! ***\n\
         [77]: 95ms out-of-order work item SessionId: {SID_A}\n\
         [77]: 80ms Web socket sending message. TimeInQueue: 4ms\n\
         [20]: 85ms second session traffic SessionId: {SID_B}\n\
         [66]: 90ms base_gstreamer.cpp:42 PushDataToPipeline: pushed bytes"
    )
}

fn analyzer_low_threshold(text: &str) -> LogAnalyzer {
    let settings = ReconstructionConfig {
        degrade_threshold: 2,
        ..ReconstructionConfig::default()
    };
    LogAnalyzer::from_text_with(text, settings)
}

mod sessions {
    use super::*;

    #[test]
    fn test_list_sessions_includes_summary_only_ids() {
        // session C never fires a start event; it must still be listed
        let sid_c = "cccccccc-1111-2222-3333-444444444444";
        let text = format!(
            "{}\n[9]: 200ms stray mention SessionId: {sid_c}",
            two_session_trace()
        );
        let analyzer = analyzer_low_threshold(&text);

        let ids: Vec<&str> = analyzer
            .list_sessions()
            .iter()
            .map(|s| s.session_id.as_str())
            .collect();
        assert_eq!(ids, vec![SID_A, SID_B, sid_c]);
    }

    #[test]
    fn test_summary_only_session_has_no_thread_analysis() {
        let sid_c = "cccccccc-1111-2222-3333-444444444444";
        let text = format!(
            "{}\n[9]: 200ms stray mention SessionId: {sid_c}",
            two_session_trace()
        );
        let analyzer = analyzer_low_threshold(&text);

        let err = analyzer.thread_analysis(Some(sid_c)).unwrap_err();
        assert!(matches!(err, SiftError::SessionNotFound { .. }));
    }
}

mod correlation {
    use super::*;

    #[test]
    fn test_interleaved_sessions_resolve_separately() {
        let analyzer = analyzer_low_threshold(&two_session_trace());
        let analysis = analyzer.thread_analysis(None).unwrap();

        assert_eq!(analysis.session_threads.len(), 2);
        assert!(analysis.primary_session.is_none());

        let a = &analysis.session_threads[SID_A];
        assert_eq!(a.get(ThreadRole::Background).unwrap().thread_id, "77");
        assert_eq!(a.get(ThreadRole::Kickoff).unwrap().thread_id, "5");
        assert_eq!(a.get(ThreadRole::Main).unwrap().thread_id, "100");
        assert_eq!(a.get(ThreadRole::User).unwrap().thread_id, "88");
        assert_eq!(a.get(ThreadRole::Audio).unwrap().thread_id, "55");
        assert_eq!(a.get(ThreadRole::Gstreamer).unwrap().thread_id, "66");

        let b = &analysis.session_threads[SID_B];
        assert_eq!(b.get(ThreadRole::Background).unwrap().thread_id, "20");
        assert_eq!(b.get(ThreadRole::Kickoff).unwrap().thread_id, "10");
    }

    #[test]
    fn test_single_session_filter_sets_primary() {
        let analyzer = analyzer_low_threshold(&two_session_trace());
        let analysis = analyzer.thread_analysis(Some(SID_A)).unwrap();

        assert_eq!(analysis.primary_session.as_deref(), Some(SID_A));
        assert_eq!(analysis.session_threads.len(), 1);
        // core identifiers still cover the whole log
        assert_eq!(analysis.core_identifiers.len(), 2);
    }

    #[test]
    fn test_memory_address_notation_invariance() {
        // plain-prefix, doubled-prefix, and case-flipped spellings must
        // all correlate to the same main thread; the decoy thread 9 sits
        // earliest in the file, so a missed address match would be
        // visible as the decoy winning through the fallback
        for (origin, bg_read) in [
            ("0xAB12CD34EF567890", "0x0xab12cd34ef567890"),
            ("0x0xAB12CD34EF567890", "0xab12cd34ef567890"),
            ("0xab12cd34ef567890", "0X0XAB12CD34EF567890"),
            ("0xAB12CD34EF567890", "0X0xab12cd34ef567890"),
        ] {
            let text = format!(
                "[9]: 5ms unrelated early chatter\n\
                 [100]: 10ms this={origin}; recognizer created\n\
                 [5]: 20ms Started thread Background with ID [77ll]\n\
                 [77]: 30ms named_properties.h:479 ISpxNamedProperties::GetStringValue: this={bg_read}; name='SPEECH-Region'\n\
                 [77]: 40ms Firing SessionStarted event: SessionId: {SID_A}"
            );
            let analyzer = analyzer_low_threshold(&text);
            let analysis = analyzer.thread_analysis(Some(SID_A)).unwrap();
            let roles = analysis.primary_threads().unwrap();
            assert_eq!(
                roles.get(ThreadRole::Main).unwrap().thread_id,
                "100",
                "failed for origin {origin} with read {bg_read}"
            );
        }
    }

    #[test]
    fn test_thread_analysis_is_idempotent() {
        let analyzer = analyzer_low_threshold(&two_session_trace());
        let first = analyzer.thread_analysis(None).unwrap();
        let second = analyzer.thread_analysis(None).unwrap();
        assert_eq!(first.session_threads, second.session_threads);
    }
}

mod reconstruction {
    use super::*;

    #[test]
    fn test_excerpt_is_superset_of_literal_lines() {
        let analyzer = analyzer_low_threshold(&two_session_trace());
        let excerpt = analyzer.session_log_text(SID_A).unwrap();
        for line in two_session_trace().lines().filter(|l| l.contains(SID_A)) {
            assert!(excerpt.contains(line), "missing literal line: {line}");
        }
    }

    #[test]
    fn test_excerpt_timestamps_non_decreasing() {
        let analyzer = analyzer_low_threshold(&two_session_trace());
        let excerpt = analyzer.session_log_text(SID_A).unwrap();

        let mut last = 0u64;
        for line in excerpt.lines() {
            let ts = line
                .split("ms")
                .next()
                .and_then(|head| head.rsplit(' ').next())
                .and_then(|tok| tok.parse().ok())
                .unwrap_or(0);
            assert!(ts >= last, "timestamps went backwards at: {line}");
            last = ts;
        }
    }

    #[test]
    fn test_small_session_degrades_but_stays_nonempty() {
        // default threshold of 50 cannot be met by this tiny trace, so
        // the degraded path must serve the request
        let analyzer = LogAnalyzer::from_text(&two_session_trace());
        let excerpt = analyzer.session_log_text(SID_B).unwrap();
        assert!(excerpt.contains(SID_B));
        assert!(!excerpt.is_empty());
    }

    #[test]
    fn test_session_lookup_is_case_insensitive() {
        let analyzer = analyzer_low_threshold(&two_session_trace());
        let lower = analyzer.session_log_text(SID_A).unwrap();
        let upper = analyzer
            .session_log_text(&SID_A.to_ascii_uppercase())
            .unwrap();
        assert_eq!(lower, upper);
    }
}

mod reports {
    use super::*;

    #[test]
    fn test_session_details_pipeline() {
        let analyzer = analyzer_low_threshold(&two_session_trace());
        let details = analyzer.session_details(SID_A).unwrap();

        assert_eq!(details.session_id, SID_A);
        assert_eq!(details.basic_info.session_id.as_deref(), Some(SID_A));
        assert_eq!(details.performance_metrics.websocket_messages, 1);
        assert_eq!(details.performance_metrics.queue_times, vec![4]);
        assert!(!details.timeline.is_empty());
    }

    #[test]
    fn test_thread_names_for_session() {
        let analyzer = analyzer_low_threshold(&two_session_trace());
        let names = analyzer.session_thread_names(SID_A).unwrap();

        assert_eq!(names.get("77").map(String::as_str), Some("Background thread"));
        assert_eq!(names.get("55").map(String::as_str), Some("Audio thread"));
        assert_eq!(names.get("66").map(String::as_str), Some("GStreamer thread"));
    }

    #[test]
    fn test_thread_log_text_is_single_thread() {
        let analyzer = analyzer_low_threshold(&two_session_trace());
        let text = analyzer.thread_log_text("77").unwrap();
        assert!(!text.is_empty());
        for line in text.lines() {
            assert!(line.starts_with("[77]:"), "foreign line: {line}");
        }
    }
}

mod cli {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn write_trace(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("trace.log");
        std::fs::write(&path, two_session_trace()).unwrap();
        path
    }

    #[test]
    fn test_sessions_command_lists_both() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_trace(&dir);

        Command::cargo_bin("spxsift")
            .unwrap()
            .arg("sessions")
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains(SID_A))
            .stdout(predicate::str::contains(SID_B));
    }

    #[test]
    fn test_threads_command_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_trace(&dir);

        Command::cargo_bin("spxsift")
            .unwrap()
            .args(["--json", "threads"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("core_identifiers"))
            .stdout(predicate::str::contains(SID_A));
    }

    #[test]
    fn test_missing_file_exit_code() {
        Command::cargo_bin("spxsift")
            .unwrap()
            .args(["sessions", "/nonexistent/trace.log"])
            .assert()
            .failure()
            .code(3)
            .stderr(predicate::str::contains("File not found"));
    }

    #[test]
    fn test_unknown_session_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_trace(&dir);

        Command::cargo_bin("spxsift")
            .unwrap()
            .arg("info")
            .arg(&path)
            .arg("00000000-0000-0000-0000-000000000000")
            .assert()
            .failure()
            .code(3)
            .stderr(predicate::str::contains("Session not found"));
    }
}
