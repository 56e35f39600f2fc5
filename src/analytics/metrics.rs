//! Performance metric extraction from a session excerpt.

use tracing::instrument;

use crate::model::{LatencyPoint, PerformanceMetrics};
use crate::patterns::{capture_f64, capture_u64, PatternCatalog};

use super::ExcerptLine;

/// Single-pass metric extractor.
#[derive(Debug)]
pub struct MetricsExtractor<'a> {
    catalog: &'a PatternCatalog,
}

impl<'a> MetricsExtractor<'a> {
    /// Create an extractor using the given catalog.
    #[must_use]
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self { catalog }
    }

    /// Extract and finalize metrics for one session excerpt.
    ///
    /// Counters and sample lists accumulate over all matching lines;
    /// first-only fields keep their earliest observation. Connection
    /// time pairs each open completion with the latest preceding open
    /// request, so a reconnect overwrites the previous measurement.
    #[instrument(skip_all)]
    #[must_use]
    pub fn extract(&self, lines: &[ExcerptLine]) -> PerformanceMetrics {
        let mut metrics = PerformanceMetrics::default();
        let mut websocket_start_time: Option<u64> = None;

        for line in lines {
            let timestamp = self.header_timestamp(&line.text);

            if self.catalog.websocket_start.is_match(&line.text) {
                if let Some(ts) = timestamp {
                    websocket_start_time = Some(ts);
                }
            }
            if self.catalog.websocket_opened.is_match(&line.text) {
                if let (Some(opened), Some(started)) = (timestamp, websocket_start_time) {
                    metrics.websocket_connection_time = Some(opened as i64 - started as i64);
                }
            }

            if self.catalog.websocket_send.is_match(&line.text) {
                metrics.websocket_messages += 1;
                if let Some(queue) = capture_u64(&self.catalog.time_in_queue, &line.text) {
                    metrics.queue_times.push(queue);
                }
            }
            if self.catalog.websocket_message_received.is_match(&line.text) {
                metrics.websocket_messages_received += 1;
            }

            if self.catalog.audio_chunk.is_match(&line.text) {
                metrics.audio_chunks += 1;
            }
            if let Some(unack) = capture_u64(&self.catalog.unacknowledged_audio, &line.text) {
                metrics.unacknowledged_audio_durations.push(unack);
            }
            if let Some(frame) = capture_u64(&self.catalog.frame_duration, &line.text) {
                metrics.frame_durations.push(frame);
            }
            if let Some(rate) = capture_f64(&self.catalog.upload_rate, &line.text) {
                metrics.upload_rates.push(rate);
            }

            if metrics.turn_start_latency.is_none() {
                metrics.turn_start_latency = capture_u64(&self.catalog.turn_start_ts, &line.text);
            }
            if metrics.first_hypothesis_latency.is_none() {
                metrics.first_hypothesis_latency =
                    capture_u64(&self.catalog.first_hypothesis_ts, &line.text);
            }

            if let Some(latency) = capture_u64(&self.catalog.recognition_latency, &line.text) {
                if metrics.first_recognition_service_latency.is_none() {
                    metrics.first_recognition_service_latency = Some(latency);
                }
                metrics.latency_timeline.push(LatencyPoint {
                    index: metrics.recognition_latencies.len(),
                    timestamp_ms: timestamp,
                    latency_ms: latency,
                });
                metrics.recognition_latencies.push(latency);
            }
        }

        metrics.finalize();
        metrics
    }

    fn header_timestamp(&self, text: &str) -> Option<u64> {
        self.catalog
            .header
            .captures(text)
            .and_then(|c| c[2].parse().ok())
    }
}
