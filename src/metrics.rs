//! Request statistics for the inference UI.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for served predictions
pub struct PredictionMetrics {
    /// Total predictions served
    pub predictions_served: AtomicU64,
    /// Predictions labelled as fraud
    pub fraud_flagged: AtomicU64,
    /// Interactions that ended in an error
    pub failures: AtomicU64,
    /// Predict + explain times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Fraud probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            fraud_flagged: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a served prediction
    pub fn record_prediction(
        &self,
        processing_time: Duration,
        fraud_probability: f64,
        is_fraud: bool,
    ) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        if is_fraud {
            self.fraud_flagged.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent samples
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (fraud_probability.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let mut sorted = match self.processing_times.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return ProcessingStats::default(),
        };
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[((count as f64 * 0.95) as usize).min(count - 1)],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Get fraud probability distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or_default()
    }

    /// Predictions per second since startup
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Point-in-time copy for the stats endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            fraud_flagged: self.fraud_flagged.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            uptime_secs: self.start_time.elapsed().as_secs(),
            throughput: self.get_throughput(),
            processing: self.get_processing_stats(),
            score_distribution: self.get_score_distribution(),
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let fraud_rate = if snapshot.predictions_served > 0 {
            snapshot.fraud_flagged as f64 / snapshot.predictions_served as f64 * 100.0
        } else {
            0.0
        };

        info!(
            predictions = snapshot.predictions_served,
            fraud_flagged = snapshot.fraud_flagged,
            fraud_rate = format!("{:.1}%", fraud_rate),
            failures = snapshot.failures,
            mean_us = snapshot.processing.mean_us,
            p95_us = snapshot.processing.p95_us,
            "Prediction summary"
        );

        let total: u64 = snapshot.score_distribution.iter().sum();
        for (i, &count) in snapshot.score_distribution.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let pct = count as f64 / total as f64 * 100.0;
            info!(
                "  {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                "█".repeat(((pct / 5.0) as usize).min(20))
            );
        }
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub predictions_served: u64,
    pub fraud_flagged: u64,
    pub failures: u64,
    pub uptime_secs: u64,
    pub throughput: f64,
    pub processing: ProcessingStats,
    pub score_distribution: [u64; 10],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PredictionMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0.07, false);
        metrics.record_prediction(Duration::from_micros(300), 0.75, true);
        metrics.record_prediction(Duration::from_micros(200), 1.0, true);
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.predictions_served, 3);
        assert_eq!(snapshot.fraud_flagged, 2);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.processing.mean_us, 200);
        assert_eq!(snapshot.processing.p50_us, 200);
        assert_eq!(snapshot.processing.max_us, 300);
        assert_eq!(snapshot.score_distribution[0], 1);
        assert_eq!(snapshot.score_distribution[7], 1);
        assert_eq!(snapshot.score_distribution[9], 1);
    }

    #[test]
    fn test_empty_stats() {
        let metrics = PredictionMetrics::new();
        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 0);
        assert_eq!(metrics.get_score_distribution(), [0; 10]);
    }
}
