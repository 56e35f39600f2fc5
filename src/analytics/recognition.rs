//! Recognition result, configuration, and error extraction.

use tracing::instrument;

use crate::model::{
    BasicInfo, ErrorEntry, RecognitionConfig, RecognitionResult,
};
use crate::patterns::{capture_str, capture_u64, PatternCatalog};

use super::{truncate_excerpt, ExcerptLine};

/// Maximum characters kept from an error line.
const ERROR_EXCERPT_LIMIT: usize = 200;

/// Extract basic identity info from the lines literally carrying the
/// session ID.
#[must_use]
pub fn extract_basic_info(catalog: &PatternCatalog, lines: &[ExcerptLine]) -> BasicInfo {
    let mut info = BasicInfo::default();
    for line in lines {
        if let Some(id) = capture_str(&catalog.session_id, &line.text) {
            info.session_id = Some(id);
            break;
        }
    }
    info
}

/// Extract recognizer configuration from property reads in the excerpt.
/// Every field keeps its first observed value.
#[instrument(skip_all)]
#[must_use]
pub fn extract_recognition_config(
    catalog: &PatternCatalog,
    lines: &[ExcerptLine],
) -> RecognitionConfig {
    let mut config = RecognitionConfig::default();

    for line in lines {
        let text = &line.text;
        fill(&mut config.audio.sample_rate, &catalog.cfg_sample_rate, text);
        fill(
            &mut config.audio.bits_per_sample,
            &catalog.cfg_bits_per_sample,
            text,
        );
        fill(&mut config.audio.channels, &catalog.cfg_channels, text);

        fill(&mut config.recognition.mode, &catalog.cfg_reco_mode, text);
        fill(
            &mut config.recognition.language,
            &catalog.cfg_reco_language,
            text,
        );
        fill(
            &mut config.recognition.auto_detect_languages,
            &catalog.cfg_auto_detect_languages,
            text,
        );
        fill(
            &mut config.recognition.language_id_mode,
            &catalog.cfg_language_id_mode,
            text,
        );
        fill(
            &mut config.recognition.segmentation_timeout,
            &catalog.cfg_segmentation_timeout,
            text,
        );

        fill(&mut config.system.buffer_size, &catalog.cfg_buffer_size, text);
        fill(&mut config.system.region, &catalog.cfg_region, text);
        fill(
            &mut config.system.connection_url,
            &catalog.cfg_connection_url,
            text,
        );
        fill(&mut config.system.user_agent, &catalog.cfg_user_agent, text);
    }
    config
}

fn fill(slot: &mut Option<String>, re: &regex::Regex, text: &str) {
    if slot.is_none() {
        *slot = capture_str(re, text);
    }
}

/// Extract recognition results (hypotheses and final phrases) from the
/// excerpt. Lines without recognized text are skipped even when they
/// match a result pattern.
#[instrument(skip_all)]
#[must_use]
pub fn extract_recognition_results(
    catalog: &PatternCatalog,
    lines: &[ExcerptLine],
) -> Vec<RecognitionResult> {
    let mut results = Vec::new();
    for line in lines {
        if !catalog.speech_phrase.is_match(&line.text)
            && !catalog.speech_hypothesis.is_match(&line.text)
        {
            continue;
        }
        let Some(text) = capture_str(&catalog.recognition_text, &line.text) else {
            continue;
        };

        results.push(RecognitionResult {
            line_number: line.number,
            text: text.trim().to_string(),
            status: capture_str(&catalog.recognition_status, &line.text),
            confidence: catalog
                .confidence
                .captures(&line.text)
                .and_then(|c| c[1].parse().ok()),
            duration: capture_u64(&catalog.duration_field, &line.text),
            offset: capture_u64(&catalog.offset_field, &line.text),
        });
    }
    results
}

/// Collect error and exception lines from the excerpt.
#[must_use]
pub fn extract_errors(catalog: &PatternCatalog, lines: &[ExcerptLine]) -> Vec<ErrorEntry> {
    lines
        .iter()
        .filter(|line| catalog.error_keyword.is_match(&line.text))
        .map(|line| ErrorEntry {
            line_number: line.number,
            message: truncate_excerpt(&line.text, ERROR_EXCERPT_LIMIT),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::excerpt_lines;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_first_value_wins() {
        let catalog = PatternCatalog::new();
        let lines = excerpt_lines(
            "[1]: 10ms name='SPEECH-Region'; value='westus'\n\
             [1]: 20ms name='SPEECH-Region'; value='eastus'\n\
             [1]: 30ms name='AudioConfig_SampleRateForCapture'; value='16000'\n\
             [1]: 40ms name='SPEECH-RecoLanguage'; value='en-US'",
        );
        let config = extract_recognition_config(&catalog, &lines);
        assert_eq!(config.system.region.as_deref(), Some("westus"));
        assert_eq!(config.audio.sample_rate.as_deref(), Some("16000"));
        assert_eq!(config.recognition.language.as_deref(), Some("en-US"));
        assert_eq!(config.recognition.mode, None);
    }

    #[test]
    fn test_results_require_text_field() {
        let catalog = PatternCatalog::new();
        let lines = excerpt_lines(
            "[1]: 10ms Response Message: path: speech.hypothesis without text\n\
             [1]: 20ms Response Message: path: speech.phrase. RecognitionStatus: Success, Text: hello world, Confidence: 0.93\n\
             [1]: 30ms Response Message: path: speech.phrase. Text: partial only. Duration: 9300000. Offset: 1200000",
        );
        let results = extract_recognition_results(&catalog, &lines);
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].line_number, 2);
        assert_eq!(results[0].text, "hello world, Confidence: 0.93");
        assert_eq!(results[0].status.as_deref(), Some("Success"));
        assert_eq!(results[0].confidence, Some(0.93));

        assert_eq!(results[1].duration, Some(9_300_000));
        assert_eq!(results[1].offset, Some(1_200_000));
    }

    #[test]
    fn test_errors_truncated_to_limit() {
        let catalog = PatternCatalog::new();
        let long = "e".repeat(300);
        let lines = excerpt_lines(&format!(
            "[1]: 10ms normal line\n[1]: 20ms ERROR: something broke {long}"
        ));
        let errors = extract_errors(&catalog, &lines);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line_number, 2);
        assert!(errors[0].message.ends_with("..."));
        assert_eq!(errors[0].message.chars().count(), 203);
    }

    #[test]
    fn test_basic_info_takes_first_session_id() {
        let catalog = PatternCatalog::new();
        let lines = excerpt_lines(
            "[1]: 10ms SessionId: abcdef12-3456-7890-abcd-ef1234567890\n\
             [1]: 20ms SessionId: ffffffff-3456-7890-abcd-ef1234567890",
        );
        let info = extract_basic_info(&catalog, &lines);
        assert_eq!(
            info.session_id.as_deref(),
            Some("abcdef12-3456-7890-abcd-ef1234567890")
        );
    }
}
