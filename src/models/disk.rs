use serde::Serialize;

/// Usage of one mounted filesystem.
#[derive(Debug, Clone, Serialize)]
pub struct DiskInfo {
    pub device: String,
    pub mountpoint: String,
    pub filesystem: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f32,
}

/// System-wide block device counters. Monotonic within a boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskIoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_count: u64,
    pub write_count: u64,
}

/// Counters for a single block device, used by the disk I/O screen.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceIoStats {
    pub device: String,
    pub read_count: u64,
    pub read_bytes: u64,
    pub read_time_ms: u64,
    pub write_count: u64,
    pub write_bytes: u64,
    pub write_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Partition {
    pub device: String,
    pub mountpoint: String,
    pub filesystem: String,
    pub removable: bool,
}

impl Default for DiskInfo {
    fn default() -> Self {
        Self {
            device: String::new(),
            mountpoint: String::new(),
            filesystem: String::new(),
            total: 0,
            used: 0,
            free: 0,
            percent: 0.0,
        }
    }
}

impl Default for DiskIoCounters {
    fn default() -> Self {
        Self {
            read_bytes: 0,
            write_bytes: 0,
            read_count: 0,
            write_count: 0,
        }
    }
}
