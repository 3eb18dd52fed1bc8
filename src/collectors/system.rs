use chrono::{Local, TimeZone};
use log::{debug, error};
use std::time::{Duration, Instant};
use sysinfo::System as SysInfo;
use systemstat::{Platform, System};

use crate::models::system::HostInfo;

pub async fn collect_uptime(sys: &System) -> Option<u64> {
    let start = Instant::now();
    let result = match sys.uptime() {
        Ok(uptime) => Some(uptime.as_secs()),
        Err(x) => {
            error!("Uptime: error: {}", x);
            None
        }
    };
    debug!("collect_uptime took: {} ms", start.elapsed().as_millis());
    result
}

/// "3 days, 4 hours, 5 minutes"
pub fn format_uptime(duration: Duration) -> String {
    let secs = duration.as_secs();
    let days = secs / (24 * 3600);
    let hours = (secs % (24 * 3600)) / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{} days, {} hours, {} minutes", days, hours, minutes)
}

/// "1d 2h 3m 4s", skipping zero parts.
pub fn format_running_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    let parts = [
        (secs / (24 * 3600), "d"),
        ((secs % (24 * 3600)) / 3600, "h"),
        ((secs % 3600) / 60, "m"),
        (secs % 60, "s"),
    ];
    let rendered: Vec<String> = parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();
    if rendered.is_empty() {
        "0s".to_string()
    } else {
        rendered.join(" ")
    }
}

pub async fn collect_host_info(sys: &System, sys_info: &SysInfo) -> HostInfo {
    let start = Instant::now();
    let uptime = collect_uptime(sys).await;
    let boot_secs = SysInfo::boot_time();
    let boot_time = if boot_secs > 0 {
        Local.timestamp_opt(boot_secs as i64, 0).single()
    } else {
        None
    };

    let result = HostInfo {
        system: SysInfo::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
        version: SysInfo::long_os_version()
            .or_else(SysInfo::os_version)
            .unwrap_or_default(),
        kernel: SysInfo::kernel_version().unwrap_or_default(),
        processor: sys_info
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_default(),
        architecture: std::env::consts::ARCH.to_string(),
        hostname: SysInfo::host_name().unwrap_or_else(|| "unknown".to_string()),
        boot_time,
        uptime,
        uptime_display: uptime
            .map(|secs| format_uptime(Duration::from_secs(secs)))
            .unwrap_or_else(|| "N/A".to_string()),
    };
    debug!("collect_host_info took: {} ms", start.elapsed().as_millis());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        let d = Duration::from_secs(2 * 86400 + 3 * 3600 + 4 * 60 + 59);
        assert_eq!(format_uptime(d), "2 days, 3 hours, 4 minutes");
        assert_eq!(format_uptime(Duration::ZERO), "0 days, 0 hours, 0 minutes");
    }

    #[test]
    fn test_format_running_time() {
        assert_eq!(format_running_time(Duration::from_secs(3661)), "1h 1m 1s");
        assert_eq!(format_running_time(Duration::from_secs(86400)), "1d");
        assert_eq!(format_running_time(Duration::ZERO), "0s");
    }
}
