use log::{debug, error};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use systemstat::{BlockDeviceStats, Platform, System};

use crate::models::disk::{DeviceIoStats, DiskInfo, DiskIoCounters};
use crate::models::percent_of;

const SECTOR_SIZE: u64 = 512;
const SYS_BLOCK: &str = "/sys/block";

/// System-wide block device counters.
///
/// With an empty allow-list only whole disks are counted, so partitions are not
/// added on top of their parent device.
pub async fn collect_io(sys: &System, allowed: &[String]) -> Option<DiskIoCounters> {
    let start = Instant::now();
    let result = match sys.block_device_statistics() {
        Ok(stats) => Some(sum_counters(&stats, allowed, |name| {
            Path::new(SYS_BLOCK).join(name).exists()
        })),
        Err(x) => {
            error!("Block statistics error getting stats: {}", x);
            None
        }
    };
    debug!("collect_io took: {} ms", start.elapsed().as_millis());
    result
}

fn sum_counters<F>(
    stats: &BTreeMap<String, BlockDeviceStats>,
    allowed: &[String],
    is_whole_disk: F,
) -> DiskIoCounters
where
    F: Fn(&str) -> bool,
{
    let mut counters = DiskIoCounters::default();
    for block in stats.values() {
        if !is_counted(&block.name, allowed, &is_whole_disk) {
            continue;
        }
        counters.read_bytes = counters
            .read_bytes
            .saturating_add((block.read_sectors as u64).saturating_mul(SECTOR_SIZE));
        counters.write_bytes = counters
            .write_bytes
            .saturating_add((block.write_sectors as u64).saturating_mul(SECTOR_SIZE));
        counters.read_count = counters.read_count.saturating_add(block.read_ios as u64);
        counters.write_count = counters.write_count.saturating_add(block.write_ios as u64);
    }
    counters
}

fn is_counted<F>(name: &str, allowed: &[String], is_whole_disk: &F) -> bool
where
    F: Fn(&str) -> bool,
{
    if !allowed.is_empty() {
        return allowed.iter().any(|a| a == name);
    }
    if name.starts_with("loop") || name.starts_with("ram") {
        return false;
    }
    is_whole_disk(name)
}

/// Per-device counters for the disk I/O screen. `None` when the platform has none.
pub async fn collect_device_stats(sys: &System) -> Option<Vec<DeviceIoStats>> {
    let start = Instant::now();
    let result = match sys.block_device_statistics() {
        Ok(stats) => Some(
            stats
                .values()
                .map(|block| DeviceIoStats {
                    device: block.name.clone(),
                    read_count: block.read_ios as u64,
                    read_bytes: (block.read_sectors as u64).saturating_mul(SECTOR_SIZE),
                    read_time_ms: block.read_ticks as u64,
                    write_count: block.write_ios as u64,
                    write_bytes: (block.write_sectors as u64).saturating_mul(SECTOR_SIZE),
                    write_time_ms: block.write_ticks as u64,
                })
                .collect(),
        ),
        Err(x) => {
            error!("Block statistics error getting device stats: {}", x);
            None
        }
    };
    debug!(
        "collect_device_stats took: {} ms",
        start.elapsed().as_millis()
    );
    result
}

/// Usage of every mounted filesystem that reports a size.
pub async fn collect_block_info(disks: &sysinfo::Disks, allowed: &[String]) -> Vec<DiskInfo> {
    let start = Instant::now();
    let mut result = Vec::new();

    for disk in disks.list() {
        let mountpoint = disk.mount_point().to_string_lossy().to_string();
        if !allowed.is_empty() && !allowed.contains(&mountpoint) {
            continue;
        }
        let total = disk.total_space();
        if total == 0 {
            debug!("Skipping {} with no reported size", mountpoint);
            continue;
        }
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        result.push(DiskInfo {
            device: disk.name().to_string_lossy().to_string(),
            mountpoint,
            filesystem: disk.file_system().to_string_lossy().to_string(),
            total,
            used,
            free,
            percent: percent_of(used, total),
        });
    }

    debug!(
        "collect_block_info took: {} ms",
        start.elapsed().as_millis()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_counted_with_allow_list() {
        let allowed = vec!["sda".to_string()];
        let never = |_: &str| false;
        assert!(is_counted("sda", &allowed, &never));
        assert!(!is_counted("sdb", &allowed, &never));
    }

    #[test]
    fn test_is_counted_whole_disks_only() {
        let whole = |name: &str| !name.ends_with('1');
        assert!(is_counted("sda", &[], &whole));
        assert!(!is_counted("sda1", &[], &whole));
        assert!(!is_counted("loop0", &[], &whole));
        assert!(!is_counted("ram0", &[], &whole));
    }
}
