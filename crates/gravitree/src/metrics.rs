//! Metrics collection for octree statistics.
//!
//! Feature-gated and runtime-toggled so disabled builds pay nothing.
//!
//! # Usage
//!
//! ```ignore
//! use gravitree::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let unhoused = tree.update();
//! println!("avg update: {:.1}us", tree.metrics().avg_update_timing_us());
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled at runtime.
#[inline]
pub fn is_enabled() -> bool {
    COLLECT_METRICS.load(Ordering::Relaxed)
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

    /// Get the number of values in the window.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the window is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear all values.
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

impl RollingWindow<u64> {
    /// Compute the sum of all values.
    pub fn sum(&self) -> u64 {
        self.buffer.iter().sum()
    }

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

/// Per-tree statistics updated by the octree facade.
#[derive(Debug, Clone, Default)]
pub struct TreeMetrics {
    /// Rolling window of update times in microseconds.
    pub update_timings: RollingWindow<u64>,
    /// Last update time in microseconds.
    pub last_update_us: u64,
    /// Total root growths performed.
    pub grows: u64,
    /// Total root shrinks performed.
    pub shrinks: u64,
}

impl TreeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all metrics to zero.
    pub fn reset(&mut self) {
        self.update_timings.clear();
        self.last_update_us = 0;
        self.grows = 0;
        self.shrinks = 0;
    }

    /// Record an update timing.
    pub fn record_update_timing(&mut self, timing_us: u64) {
        if is_enabled() {
            self.update_timings.push(timing_us);
            self.last_update_us = timing_us;
        }
    }

    /// Record a root growth.
    pub fn record_grow(&mut self) {
        if is_enabled() {
            self.grows += 1;
        }
    }

    /// Record a root shrink.
    pub fn record_shrink(&mut self) {
        if is_enabled() {
            self.shrinks += 1;
        }
    }

    /// Average update timing in microseconds.
    pub fn avg_update_timing_us(&self) -> f64 {
        self.update_timings.average()
    }
}
