//! Engine-agnostic metrics collection for codec statistics.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use kd_points::metrics::{CodecMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // After each encode:
//! metrics.record_encode(&stats, timing_us);
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::kd_tree::EncodeStats;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create a new rolling window with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Iterate over values (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Get the most recent value.
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
    /// Compute the sum of all values.
    pub fn sum(&self) -> T {
        self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
    }
}

impl RollingWindow<u64> {
    /// Compute the average of all values.
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum() as f64 / self.buffer.len() as f64
        }
    }

    /// Get min and max values.
    pub fn min_max(&self) -> Option<(u64, u64)> {
        let min = *self.buffer.iter().min()?;
        let max = *self.buffer.iter().max()?;
        Some((min, max))
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128)
    }
}

/// Codec statistics accumulated across encode/decode calls.
#[derive(Debug, Clone)]
pub struct CodecMetrics {
    // Timing
    /// Rolling window of encode times in microseconds.
    pub encode_timings: RollingWindow<u64>,
    /// Rolling window of decode times in microseconds.
    pub decode_timings: RollingWindow<u64>,
    /// Rolling window of k-d tree stream sizes in bytes.
    pub stream_sizes: RollingWindow<u64>,

    // Last call snapshot
    pub last_encode_us: u64,
    pub last_decode_us: u64,
    /// Stats of the most recent encode.
    pub last_encode: EncodeStats,

    // Cumulative
    pub total_encodes: u64,
    pub total_decodes: u64,
    pub total_points_encoded: u64,
    pub total_points_decoded: u64,
    /// Structure plus leaf bytes over all encodes.
    pub total_stream_bytes: u64,
    pub total_degenerate_nodes: u64,
}

impl Default for CodecMetrics {
    fn default() -> Self {
        Self {
            encode_timings: RollingWindow::new(128),
            decode_timings: RollingWindow::new(128),
            stream_sizes: RollingWindow::new(128),
            last_encode_us: 0,
            last_decode_us: 0,
            last_encode: EncodeStats::default(),
            total_encodes: 0,
            total_decodes: 0,
            total_points_encoded: 0,
            total_points_decoded: 0,
            total_stream_bytes: 0,
            total_degenerate_nodes: 0,
        }
    }
}

impl CodecMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset windows and last-call values.
    pub fn reset(&mut self) {
        self.encode_timings.clear();
        self.decode_timings.clear();
        self.stream_sizes.clear();
        self.last_encode_us = 0;
        self.last_decode_us = 0;
        self.last_encode = EncodeStats::default();
        // Totals are cumulative
    }

    /// Record one successful encode.
    pub fn record_encode(&mut self, stats: &EncodeStats, timing_us: u64) {
        if !is_enabled() {
            return;
        }

        self.encode_timings.push(timing_us);
        self.stream_sizes.push(stats.stream_bytes() as u64);
        self.last_encode_us = timing_us;
        self.last_encode = *stats;

        self.total_encodes += 1;
        self.total_points_encoded += stats.num_points as u64;
        self.total_stream_bytes += stats.stream_bytes() as u64;
        self.total_degenerate_nodes += stats.degenerate_nodes as u64;
    }

    /// Record one successful decode.
    pub fn record_decode(&mut self, num_points: u32, timing_us: u64) {
        if !is_enabled() {
            return;
        }

        self.decode_timings.push(timing_us);
        self.last_decode_us = timing_us;
        self.total_decodes += 1;
        self.total_points_decoded += num_points as u64;
    }

    pub fn avg_encode_timing_us(&self) -> f64 {
        self.encode_timings.average()
    }

    pub fn avg_decode_timing_us(&self) -> f64 {
        self.decode_timings.average()
    }

    /// Average coded bits per point over every recorded encode.
    pub fn average_bits_per_point(&self) -> f64 {
        if self.total_points_encoded == 0 {
            0.0
        } else {
            (self.total_stream_bytes * 8) as f64 / self.total_points_encoded as f64
        }
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_window() {
        let mut window = RollingWindow::new(3);
        assert!(window.is_empty());

        window.push(10u64);
        window.push(20);
        window.push(30);
        assert_eq!(window.len(), 3);
        assert_eq!(window.sum(), 60);
        assert_eq!(window.average(), 20.0);

        // Push one more, oldest should be evicted
        window.push(40);
        assert_eq!(window.len(), 3);
        assert_eq!(window.sum(), 90);
        assert_eq!(window.last(), Some(&40));

        let (min, max) = window.min_max().unwrap();
        assert_eq!(min, 20);
        assert_eq!(max, 40);
    }

    #[test]
    fn test_record_encode() {
        let mut metrics = CodecMetrics::new();
        let stats = EncodeStats {
            num_points: 100,
            degenerate_nodes: 2,
            structure_bytes: 30,
            leaf_bytes: 70,
            ..Default::default()
        };

        metrics.record_encode(&stats, 1000);
        metrics.record_encode(&stats, 3000);

        assert_eq!(metrics.total_encodes, 2);
        assert_eq!(metrics.total_points_encoded, 200);
        assert_eq!(metrics.total_stream_bytes, 200);
        assert_eq!(metrics.total_degenerate_nodes, 4);
        assert_eq!(metrics.avg_encode_timing_us(), 2000.0);
        assert_eq!(metrics.average_bits_per_point(), 8.0);
        assert_eq!(metrics.last_encode, stats);
    }

    #[test]
    fn test_reset_keeps_totals() {
        let mut metrics = CodecMetrics::new();
        metrics.record_decode(50, 400);
        metrics.reset();

        assert!(metrics.decode_timings.is_empty());
        assert_eq!(metrics.last_decode_us, 0);
        assert_eq!(metrics.total_decodes, 1);
        assert_eq!(metrics.total_points_decoded, 50);
    }
}
