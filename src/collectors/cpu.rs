use log::{debug, error, warn};
use std::path::Path;
use std::time::{Duration, Instant};
use sysinfo::System as SysInfo;
use systemstat::{Platform, System};

use crate::models::clamp_percent;
use crate::utils::hwmon;

const HWMON_ROOT: &str = "/sys/class/hwmon";

/// Aggregate CPU utilisation measured over `window`, as a 0-100 percentage.
///
/// Falls back to sysinfo's global usage when the systemstat measurement fails.
pub async fn collect_load_aggregate(sys: &System, sys_info: &mut SysInfo, window: Duration) -> f32 {
    let start = Instant::now();
    let result = match sys.cpu_load_aggregate() {
        Ok(cpu) => {
            tokio::time::sleep(window).await;
            match cpu.done() {
                Ok(cpu) => Some(busy_percent(cpu.idle)),
                Err(x) => {
                    error!("CPU load measurement error: {}", x);
                    None
                }
            }
        }
        Err(x) => {
            warn!("CPU load: error: {}", x);
            None
        }
    };
    let result = match result {
        Some(percent) => percent,
        None => {
            sys_info.refresh_cpu_usage();
            tokio::time::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)).await;
            sys_info.refresh_cpu_usage();
            clamp_percent(sys_info.global_cpu_usage())
        }
    };
    debug!(
        "collect_load_aggregate took: {} ms",
        start.elapsed().as_millis()
    );
    result
}

/// Per-core utilisation measured over `window`, in core order.
pub async fn collect_load_per_core(
    sys: &System,
    sys_info: &mut SysInfo,
    window: Duration,
) -> Vec<f32> {
    let start = Instant::now();
    let result = match sys.cpu_load() {
        Ok(cpus) => {
            tokio::time::sleep(window).await;
            match cpus.done() {
                Ok(cpus) => Some(cpus.iter().map(|cpu| busy_percent(cpu.idle)).collect::<Vec<_>>()),
                Err(x) => {
                    error!("Per-core CPU load measurement error: {}", x);
                    None
                }
            }
        }
        Err(x) => {
            warn!("Per-core CPU load: error: {}", x);
            None
        }
    };
    let result = match result {
        Some(cores) => cores,
        None => {
            sys_info.refresh_cpu_usage();
            tokio::time::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)).await;
            sys_info.refresh_cpu_usage();
            sys_info
                .cpus()
                .iter()
                .map(|cpu| clamp_percent(cpu.cpu_usage()))
                .collect()
        }
    };
    debug!(
        "collect_load_per_core took: {} ms",
        start.elapsed().as_millis()
    );
    result
}

fn busy_percent(idle: f32) -> f32 {
    clamp_percent((1.0 - idle) * 100.0)
}

/// First non-zero CPU temperature the host exposes, if any.
pub async fn collect_temperature(sys: &System) -> Option<f32> {
    let start = Instant::now();
    let result = match sys.cpu_temp() {
        Ok(temp) if temp > 0.0 => Some(temp),
        Ok(_) => hwmon::first_temperature(Path::new(HWMON_ROOT)),
        Err(x) => {
            debug!("CPU temp: error: {}", x);
            hwmon::first_temperature(Path::new(HWMON_ROOT))
        }
    };
    debug!(
        "collect_temperature took: {} ms",
        start.elapsed().as_millis()
    );
    result
}

pub async fn collect_frequency(sys: &SysInfo) -> Option<u64> {
    let start = Instant::now();
    let result = sys
        .cpus()
        .first()
        .map(|cpu| cpu.frequency())
        .filter(|freq| *freq > 0);
    debug!("collect_frequency took: {} ms", start.elapsed().as_millis());
    result
}

pub async fn collect_count(sys: &SysInfo) -> (usize, Option<usize>) {
    let start = Instant::now();
    let result = (sys.cpus().len(), SysInfo::physical_core_count());
    debug!("collect_count took: {} ms", start.elapsed().as_millis());
    result
}
