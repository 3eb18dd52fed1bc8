use chrono::{DateTime, Local};
use serde::Serialize;

/// Static facts about the host, shown by the info screen and the report.
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub system: String,
    pub version: String,
    pub kernel: String,
    pub processor: String,
    pub architecture: String,
    pub hostname: String,
    pub boot_time: Option<DateTime<Local>>,
    pub uptime: Option<u64>,
    pub uptime_display: String,
}

impl Default for HostInfo {
    fn default() -> Self {
        Self {
            system: String::new(),
            version: String::new(),
            kernel: String::new(),
            processor: String::new(),
            architecture: String::new(),
            hostname: String::new(),
            boot_time: None,
            uptime: None,
            uptime_display: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortBy {
    Cpu,
    Memory,
}

impl SortBy {
    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Cpu => "CPU",
            SortBy::Memory => "MEMORY",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub user: String,
    pub status: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub created_at: Option<DateTime<Local>>,
    pub command_line: String,
}

impl ProcessInfo {
    pub fn metric(&self, sort_by: SortBy) -> f32 {
        match sort_by {
            SortBy::Cpu => self.cpu_percent,
            SortBy::Memory => self.memory_percent,
        }
    }
}

impl Default for ProcessInfo {
    fn default() -> Self {
        Self {
            pid: 0,
            name: String::new(),
            user: String::new(),
            status: String::new(),
            cpu_percent: 0.0,
            memory_percent: 0.0,
            created_at: None,
            command_line: String::new(),
        }
    }
}

/// Detailed readings for the single-process monitor.
#[derive(Debug, Clone)]
pub struct ProcessDetails {
    pub pid: u32,
    pub name: String,
    pub status: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub memory_rss: u64,
    pub created_at: Option<DateTime<Local>>,
    pub running_secs: u64,
    pub threads: Option<usize>,
    pub io_read_bytes: u64,
    pub io_written_bytes: u64,
    pub command_line: String,
}
