use serde::Serialize;

use crate::history::CounterSample;
use crate::models::disk::DiskIoCounters;
use crate::models::network::NetworkCounters;
use crate::models::Snapshot;

/// Per-second change of a cumulative counter.
///
/// `None` when either reading is unavailable, when the interval is not positive,
/// or when the counter went backwards. A decrease means the counter was reset
/// (reboot, driver reload, interface recreated) and the true delta is unknown.
pub fn rate(current: Option<u64>, previous: Option<u64>, interval_secs: f64) -> Option<f64> {
    let (current, previous) = (current?, previous?);
    if current < previous || interval_secs.is_nan() || interval_secs <= 0.0 {
        return None;
    }
    Some((current - previous) as f64 / interval_secs)
}

/// Per-second rates between consecutive counter samples.
///
/// Pairs that span a counter reset are left out.
pub fn per_second(samples: &[CounterSample]) -> Vec<f64> {
    samples
        .windows(2)
        .filter_map(|pair| {
            let elapsed = elapsed_secs(&pair[1], &pair[0]);
            rate(Some(pair[1].value), Some(pair[0].value), elapsed)
        })
        .collect()
}

fn elapsed_secs(current: &CounterSample, previous: &CounterSample) -> f64 {
    (current.at - previous.at).num_milliseconds() as f64 / 1000.0
}

/// Disk and network throughput between two snapshots, in bytes per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rates {
    pub disk_read: Option<f64>,
    pub disk_write: Option<f64>,
    pub net_sent: Option<f64>,
    pub net_received: Option<f64>,
}

impl Rates {
    /// Uses the wall-clock distance between the two snapshots as the interval.
    pub fn between(current: &Snapshot, previous: &Snapshot) -> Self {
        let interval =
            (current.timestamp - previous.timestamp).num_milliseconds() as f64 / 1000.0;
        let disk = |pick: fn(&DiskIoCounters) -> u64| {
            rate(
                current.disk_io.as_ref().map(pick),
                previous.disk_io.as_ref().map(pick),
                interval,
            )
        };
        let net = |pick: fn(&NetworkCounters) -> u64| {
            rate(
                current.network.as_ref().map(pick),
                previous.network.as_ref().map(pick),
                interval,
            )
        };

        Self {
            disk_read: disk(|io| io.read_bytes),
            disk_write: disk(|io| io.write_bytes),
            net_sent: net(|n| n.bytes_sent),
            net_received: net(|n| n.bytes_received),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local};

    #[test]
    fn test_rate() {
        assert_eq!(rate(Some(1000), Some(900), 1.0), Some(100.0));
        assert_eq!(rate(Some(1000), Some(1000), 2.0), Some(0.0));
        assert_eq!(rate(Some(3000), Some(1000), 2.0), Some(1000.0));
    }

    #[test]
    fn test_counter_reset_is_unavailable() {
        assert_eq!(rate(Some(900), Some(1000), 1.0), None);
    }

    #[test]
    fn test_unavailable_propagates() {
        assert_eq!(rate(None, Some(900), 1.0), None);
        assert_eq!(rate(Some(900), None, 1.0), None);
        assert_eq!(rate(Some(1000), Some(900), 0.0), None);
        assert_eq!(rate(Some(1000), Some(900), f64::NAN), None);
    }

    #[test]
    fn test_between_snapshots() {
        let now = Local::now();
        let previous = Snapshot {
            timestamp: now,
            disk_io: Some(DiskIoCounters {
                read_bytes: 1000,
                write_bytes: 5000,
                ..Default::default()
            }),
            network: Some(NetworkCounters {
                bytes_sent: 100,
                bytes_received: 200,
                ..Default::default()
            }),
            ..Default::default()
        };
        let current = Snapshot {
            timestamp: now + Duration::seconds(2),
            disk_io: Some(DiskIoCounters {
                read_bytes: 3000,
                write_bytes: 4000,
                ..Default::default()
            }),
            network: None,
            ..Default::default()
        };

        let rates = Rates::between(&current, &previous);

        assert_eq!(rates.disk_read, Some(1000.0));
        assert_eq!(rates.disk_write, None);
        assert_eq!(rates.net_sent, None);
        assert_eq!(rates.net_received, None);
    }

    #[test]
    fn test_per_second_skips_resets() {
        let start = Local::now();
        let sample = |secs: i64, value: u64| CounterSample {
            at: start + Duration::seconds(secs),
            value,
        };
        let samples = vec![sample(0, 0), sample(2, 2048), sample(4, 100), sample(5, 612)];

        assert_eq!(per_second(&samples), vec![1024.0, 512.0]);
        assert!(per_second(&samples[..1]).is_empty());
    }
}
