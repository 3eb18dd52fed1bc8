use chrono::{DateTime, Local};
use humansize::{format_size, FormatSizeOptions, WINDOWS};
use serde::Serialize;

pub mod battery;
pub mod cpu;
pub mod disk;
pub mod issue;
pub mod memory;
pub mod network;
pub mod system;

/// Name filters applied while collecting. Empty lists mean "everything".
#[derive(Debug, Clone, Default)]
pub struct AllowedResources {
    pub disks: Vec<String>,
    pub networks: Vec<String>,
    pub mount_points: Vec<String>,
}

/// One point-in-time set of resource readings.
///
/// Metrics the host cannot provide are `None` rather than zero so that consumers
/// never confuse "unavailable" with "idle".
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Local>,
    pub cpu: cpu::CpuInfo,
    pub memory: memory::MemoryInfo,
    pub swap: memory::SwapMemoryInfo,
    pub disks: Vec<disk::DiskInfo>,
    pub disk_io: Option<disk::DiskIoCounters>,
    pub network: Option<network::NetworkCounters>,
    pub battery: Option<battery::BatteryInfo>,
    pub process_count: usize,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            timestamp: Local::now(),
            cpu: cpu::CpuInfo::default(),
            memory: memory::MemoryInfo::default(),
            swap: memory::SwapMemoryInfo::default(),
            disks: Vec::new(),
            disk_io: None,
            network: None,
            battery: None,
            process_count: 0,
        }
    }
}

/// Percentage of `part` in `total`, clamped to 0-100. A zero total reads as 0%.
pub fn percent_of(part: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    clamp_percent((part as f64 / total as f64 * 100.0) as f32)
}

pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Byte count with 1024-based units ("1.50 KB").
pub fn format_bytes(bytes: u64) -> String {
    let formatted = format_size(bytes, FormatSizeOptions::from(WINDOWS).decimal_places(2));
    // humansize spells the kilo step as "kB" even on the 1024 scale
    match formatted.strip_suffix("kB") {
        Some(value) => format!("{}KB", value),
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(50, 200), 25.0);
        assert_eq!(percent_of(1, 0), 0.0);
        assert_eq!(percent_of(300, 200), 100.0);
    }

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(-3.0), 0.0);
        assert_eq!(clamp_percent(f32::NAN), 0.0);
        assert_eq!(clamp_percent(42.5), 42.5);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert!(format_bytes(2048).ends_with(" KB"));
        assert!(format_bytes(5 * 1024 * 1024).ends_with(" MB"));
        assert!(format_bytes(3 * 1024 * 1024 * 1024).ends_with(" GB"));
    }
}
