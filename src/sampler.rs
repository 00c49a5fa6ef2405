//! Throughput rates from cumulative counters
//!
//! The backend reports block and network I/O as ever-growing counters. The
//! sampler keeps the last good reading and turns each new one into per-second
//! rates. Readings are only recorded after a successful fetch, so a dropped
//! poll simply widens the time delta of the next rate.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::types::{HistoryPoint, LiveMetrics};

/// Number of live points kept for charting
pub const LIVE_WINDOW: usize = 60;

/// Per-second rate between two counter readings.
///
/// Counter resets (container restart) produce a negative delta, which is
/// clamped to zero. A non-positive `elapsed_secs` yields zero.
pub fn compute_rate(previous: u64, current: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs.is_nan() || elapsed_secs <= 0.0 {
        return 0.0;
    }

    let delta = current as f64 - previous as f64;
    (delta / elapsed_secs).max(0.0)
}

/// Counter values at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterReading {
    pub at: DateTime<Utc>,
    pub block_read_bytes: u64,
    pub block_write_bytes: u64,
    pub net_rx_bytes: u64,
    pub net_tx_bytes: u64,
}

impl CounterReading {
    pub fn from_metrics(metrics: &LiveMetrics, at: DateTime<Utc>) -> Self {
        Self {
            at,
            block_read_bytes: metrics.block_read_bytes,
            block_write_bytes: metrics.block_write_bytes,
            net_rx_bytes: metrics.net_rx_bytes,
            net_tx_bytes: metrics.net_tx_bytes,
        }
    }
}

/// One charted point: gauges as reported, I/O as bytes per second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePoint {
    pub at: DateTime<Utc>,
    pub cpu_percent: f64,
    pub memory_mib: f64,
    pub disk_read_rate: f64,
    pub disk_write_rate: f64,
    pub net_rx_rate: f64,
    pub net_tx_rate: f64,
}

impl LivePoint {
    pub fn disk_rate(&self) -> f64 {
        self.disk_read_rate + self.disk_write_rate
    }

    pub fn net_rate(&self) -> f64 {
        self.net_rx_rate + self.net_tx_rate
    }
}

/// Turns consecutive readings into rates
#[derive(Debug, Clone, Default)]
pub struct RateSampler {
    /// Last successfully recorded reading
    last: Option<CounterReading>,
}

impl RateSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading taken at `at` and return its charted point.
    ///
    /// The first reading has nothing to compare against and yields zero rates.
    pub fn sample(&mut self, metrics: &LiveMetrics, at: DateTime<Utc>) -> LivePoint {
        let current = CounterReading::from_metrics(metrics, at);

        let point = match self.last {
            Some(previous) => {
                let elapsed = (current.at - previous.at).num_milliseconds() as f64 / 1000.0;

                LivePoint {
                    at,
                    cpu_percent: metrics.cpu_percent,
                    memory_mib: metrics.memory_mib,
                    disk_read_rate: compute_rate(
                        previous.block_read_bytes,
                        current.block_read_bytes,
                        elapsed,
                    ),
                    disk_write_rate: compute_rate(
                        previous.block_write_bytes,
                        current.block_write_bytes,
                        elapsed,
                    ),
                    net_rx_rate: compute_rate(previous.net_rx_bytes, current.net_rx_bytes, elapsed),
                    net_tx_rate: compute_rate(previous.net_tx_bytes, current.net_tx_bytes, elapsed),
                }
            }
            None => LivePoint {
                at,
                cpu_percent: metrics.cpu_percent,
                memory_mib: metrics.memory_mib,
                disk_read_rate: 0.0,
                disk_write_rate: 0.0,
                net_rx_rate: 0.0,
                net_tx_rate: 0.0,
            },
        };

        self.last = Some(current);
        point
    }

    /// Last good reading, if any
    pub fn reference(&self) -> Option<&CounterReading> {
        self.last.as_ref()
    }

    /// Forget the reference; the next sample starts from zero rates again
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Convert history readings into charted points, oldest first
pub fn history_series(points: &[HistoryPoint]) -> Vec<LivePoint> {
    let mut sorted: Vec<&HistoryPoint> = points.iter().collect();
    sorted.sort_by_key(|point| point.timestamp);

    let mut sampler = RateSampler::new();
    sorted
        .into_iter()
        .map(|point| sampler.sample(&point.metrics, point.timestamp))
        .collect()
}

/// Bounded FIFO window; pushing onto a full window drops the oldest entry
#[derive(Debug, Clone)]
pub struct SampleWindow<T> {
    points: VecDeque<T>,
    capacity: usize,
}

impl<T> SampleWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: T) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.points.iter()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl<T> Default for SampleWindow<T> {
    fn default() -> Self {
        Self::new(LIVE_WINDOW)
    }
}
