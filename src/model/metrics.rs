//! Performance metrics derived from a session-scoped line sequence.

use serde::Serialize;

/// One recognition latency observation with its position in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatencyPoint {
    /// 0-based index among all latency observations in the session.
    pub index: usize,
    /// Header timestamp of the carrying line, if present.
    pub timestamp_ms: Option<u64>,
    /// Reported recognition latency in milliseconds.
    pub latency_ms: u64,
}

/// Aggregate performance metrics for one session.
///
/// All derived statistics are computed once after the extraction pass.
/// A `None` derived field means the underlying sample list was empty;
/// it is never conflated with a measured zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Outbound websocket message count.
    pub websocket_messages: usize,
    /// Inbound websocket message count.
    pub websocket_messages_received: usize,
    /// Audio chunk count.
    pub audio_chunks: usize,

    /// Upload rate samples in KB/s.
    pub upload_rates: Vec<f64>,
    /// Recognition latency samples in milliseconds.
    pub recognition_latencies: Vec<u64>,
    /// Per-message send queue delay samples in milliseconds.
    pub queue_times: Vec<u64>,
    /// Unacknowledged audio duration samples in milliseconds.
    pub unacknowledged_audio_durations: Vec<u64>,
    /// Audio frame duration samples in milliseconds.
    pub frame_durations: Vec<u64>,

    /// Time from first open request to first open completion, ms.
    pub websocket_connection_time: Option<i64>,
    /// Service timestamp of the first turn.start response.
    pub turn_start_latency: Option<u64>,
    /// Service timestamp of the first speech.hypothesis response.
    pub first_hypothesis_latency: Option<u64>,
    /// The first reported recognition latency, ms.
    pub first_recognition_service_latency: Option<u64>,

    /// Average upload rate, KB/s, rounded to 2 decimal places.
    pub avg_upload_rate: Option<f64>,
    /// Average recognition latency, ms, rounded to the nearest integer.
    pub avg_recognition_latency: Option<f64>,
    /// Minimum recognition latency, ms.
    pub min_recognition_latency: Option<u64>,
    /// Maximum recognition latency, ms.
    pub max_recognition_latency: Option<u64>,
    /// Average queue time, ms, rounded to the nearest integer.
    pub avg_queue_time: Option<f64>,
    /// Maximum queue time, ms.
    pub max_queue_time: Option<u64>,
    /// Maximum unacknowledged audio duration, ms.
    pub max_unacknowledged_audio: Option<u64>,
    /// Minimum frame duration, ms.
    pub min_frame_duration: Option<u64>,
    /// Maximum frame duration, ms.
    pub max_frame_duration: Option<u64>,
    /// Average frame duration, ms, rounded to the nearest integer.
    pub avg_frame_duration: Option<f64>,

    /// Every recognition latency observation, in session order.
    pub latency_timeline: Vec<LatencyPoint>,
}

impl PerformanceMetrics {
    /// Compute the derived statistics from the collected sample lists.
    /// Empty lists leave their derived fields absent.
    pub fn finalize(&mut self) {
        if !self.upload_rates.is_empty() {
            let avg = self.upload_rates.iter().sum::<f64>() / self.upload_rates.len() as f64;
            self.avg_upload_rate = Some((avg * 100.0).round() / 100.0);
        }

        if !self.recognition_latencies.is_empty() {
            let sum: u64 = self.recognition_latencies.iter().sum();
            self.avg_recognition_latency =
                Some((sum as f64 / self.recognition_latencies.len() as f64).round());
            self.min_recognition_latency = self.recognition_latencies.iter().min().copied();
            self.max_recognition_latency = self.recognition_latencies.iter().max().copied();
        }

        if !self.queue_times.is_empty() {
            let sum: u64 = self.queue_times.iter().sum();
            self.avg_queue_time = Some((sum as f64 / self.queue_times.len() as f64).round());
            self.max_queue_time = self.queue_times.iter().max().copied();
        }

        if !self.unacknowledged_audio_durations.is_empty() {
            self.max_unacknowledged_audio =
                self.unacknowledged_audio_durations.iter().max().copied();
        }

        if !self.frame_durations.is_empty() {
            let sum: u64 = self.frame_durations.iter().sum();
            self.min_frame_duration = self.frame_durations.iter().min().copied();
            self.max_frame_duration = self.frame_durations.iter().max().copied();
            self.avg_frame_duration =
                Some((sum as f64 / self.frame_durations.len() as f64).round());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_empty_lists_stay_absent() {
        let mut metrics = PerformanceMetrics::default();
        metrics.finalize();

        assert!(metrics.avg_upload_rate.is_none());
        assert!(metrics.avg_recognition_latency.is_none());
        assert!(metrics.max_queue_time.is_none());
        assert!(metrics.max_unacknowledged_audio.is_none());
        assert!(metrics.avg_frame_duration.is_none());
    }

    #[test]
    fn test_finalize_latency_stats() {
        let mut metrics = PerformanceMetrics {
            recognition_latencies: vec![100, 200, 301],
            ..Default::default()
        };
        metrics.finalize();

        assert_eq!(metrics.avg_recognition_latency, Some(200.0));
        assert_eq!(metrics.min_recognition_latency, Some(100));
        assert_eq!(metrics.max_recognition_latency, Some(301));
    }

    #[test]
    fn test_finalize_upload_rate_rounding() {
        let mut metrics = PerformanceMetrics {
            upload_rates: vec![10.0, 10.335],
            ..Default::default()
        };
        metrics.finalize();

        assert_eq!(metrics.avg_upload_rate, Some(10.17));
    }
}
