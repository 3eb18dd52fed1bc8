use chrono::{DateTime, Local};
use std::collections::VecDeque;

use crate::models::Snapshot;

pub const HISTORY_CAPACITY: usize = 60;

/// Fixed-capacity rolling buffer, oldest value first.
///
/// Once full, every push evicts the oldest entry. Readers get a copy, so a
/// caller holding the result never observes a later push.
#[derive(Debug, Clone)]
pub struct HistoryRing<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T: Clone> HistoryRing<T> {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: T) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn values(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&T> {
        self.values.back()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> Default for HistoryRing<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A cumulative counter reading and when it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterSample {
    pub at: DateTime<Local>,
    pub value: u64,
}

/// Rolling history of the scalar metrics shown in the graphs.
///
/// Counters are only recorded when the host reports them, so their rings can be
/// shorter than the CPU and memory ones.
#[derive(Debug, Clone, Default)]
pub struct MetricsHistory {
    pub cpu: HistoryRing<f32>,
    pub memory: HistoryRing<f32>,
    pub net_sent: HistoryRing<CounterSample>,
    pub net_recv: HistoryRing<CounterSample>,
    pub disk_read: HistoryRing<CounterSample>,
    pub disk_write: HistoryRing<CounterSample>,
}

impl MetricsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, snapshot: &Snapshot) {
        let at = snapshot.timestamp;
        self.cpu.push(snapshot.cpu.percent);
        self.memory.push(snapshot.memory.percent);

        if let Some(net) = &snapshot.network {
            self.net_sent.push(CounterSample {
                at,
                value: net.bytes_sent,
            });
            self.net_recv.push(CounterSample {
                at,
                value: net.bytes_received,
            });
        }
        if let Some(io) = &snapshot.disk_io {
            self.disk_read.push(CounterSample {
                at,
                value: io.read_bytes,
            });
            self.disk_write.push(CounterSample {
                at,
                value: io.write_bytes,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cpu.is_empty()
    }
}
