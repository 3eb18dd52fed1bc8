use chrono::Local;
use log::debug;
use std::time::{Duration, Instant};
use sysinfo::{Disks as SysInfoDisks, System as SysInfo};
use systemstat::{Platform, System as SystemStat};

use crate::collectors::{battery, cpu, disk, memory, network, system};
use crate::error::{MonitorError, Result};
use crate::models::cpu::CpuInfo;
use crate::models::disk::{DeviceIoStats, Partition};
use crate::models::network::InterfaceAddress;
use crate::models::system::HostInfo;
use crate::models::{AllowedResources, Snapshot};

/// Blocking windows used while measuring CPU utilisation.
#[derive(Debug, Clone, Copy)]
pub struct SamplingWindows {
    pub aggregate: Duration,
    pub per_core: Duration,
}

impl Default for SamplingWindows {
    fn default() -> Self {
        Self {
            aggregate: Duration::from_secs(1),
            per_core: Duration::from_millis(100),
        }
    }
}

/// Captures point-in-time [`Snapshot`]s from the OS.
///
/// Owns the provider handles so repeated captures reuse them. Each field of the
/// snapshot is read independently; one unreadable metric never fails the capture.
pub struct SnapshotCollector {
    sys_stat: SystemStat,
    sys_info: SysInfo,
    disks: SysInfoDisks,
    allowed: AllowedResources,
    windows: SamplingWindows,
}

impl SnapshotCollector {
    pub fn new(allowed: AllowedResources, windows: SamplingWindows) -> Self {
        let mut sys_info = SysInfo::new();
        sys_info.refresh_cpu_all();
        sys_info.refresh_memory();
        Self {
            sys_stat: SystemStat::new(),
            sys_info,
            disks: SysInfoDisks::new_with_refreshed_list(),
            allowed,
            windows,
        }
    }

    pub async fn capture(&mut self) -> Result<Snapshot> {
        let start = Instant::now();

        self.sys_info.refresh_cpu_all();
        self.sys_info.refresh_processes(sysinfo::ProcessesToUpdate::All, true);
        self.disks.refresh(true);

        // Sampling windows run one after the other: the aggregate reading must not
        // overlap the per-core one.
        let cpu_percent =
            cpu::collect_load_aggregate(&self.sys_stat, &mut self.sys_info, self.windows.aggregate)
                .await;
        let per_core =
            cpu::collect_load_per_core(&self.sys_stat, &mut self.sys_info, self.windows.per_core)
                .await;
        let temperature = cpu::collect_temperature(&self.sys_stat).await;
        let frequency = cpu::collect_frequency(&self.sys_info).await;
        let (logical_cores, physical_cores) = cpu::collect_count(&self.sys_info).await;

        let mem = memory::collect_ram(&mut self.sys_info).await;
        let swap = memory::collect_swap(&self.sys_info).await;

        if logical_cores == 0 && mem.total == 0 {
            return Err(MonitorError::provider_unavailable(
                "no CPUs and no memory reported by the OS",
            ));
        }

        let disks = disk::collect_block_info(&self.disks, &self.allowed.mount_points).await;
        let disk_io = disk::collect_io(&self.sys_stat, &self.allowed.disks).await;
        let net = network::collect_io(&self.sys_stat, &self.allowed.networks).await;
        let battery = battery::collect(&self.sys_stat).await;

        let snapshot = Snapshot {
            timestamp: Local::now(),
            cpu: CpuInfo {
                percent: cpu_percent,
                per_core,
                frequency_mhz: frequency,
                temperature_celsius: temperature,
                logical_cores,
                physical_cores,
            },
            memory: mem,
            swap,
            disks,
            disk_io,
            network: net,
            battery,
            process_count: self.sys_info.processes().len(),
        };

        debug!("capture took: {} ms", start.elapsed().as_millis());
        debug!("{:?}", snapshot);
        Ok(snapshot)
    }

    pub async fn host_info(&mut self) -> HostInfo {
        self.sys_info.refresh_cpu_all();
        system::collect_host_info(&self.sys_stat, &self.sys_info).await
    }

    pub async fn interfaces(&self) -> Vec<InterfaceAddress> {
        network::collect_interfaces(&self.sys_stat).await
    }

    pub async fn device_stats(&self) -> Option<Vec<DeviceIoStats>> {
        disk::collect_device_stats(&self.sys_stat).await
    }

    /// Every mounted filesystem, ignoring the mount point allow-list.
    pub fn partitions(&mut self) -> Vec<Partition> {
        self.disks.refresh(true);
        self.disks
            .list()
            .iter()
            .map(|disk| Partition {
                device: disk.name().to_string_lossy().to_string(),
                mountpoint: disk.mount_point().to_string_lossy().to_string(),
                filesystem: disk.file_system().to_string_lossy().to_string(),
                removable: disk.is_removable(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_stays_in_range() {
        let windows = SamplingWindows {
            aggregate: Duration::from_millis(250),
            per_core: Duration::from_millis(50),
        };
        let mut collector = SnapshotCollector::new(AllowedResources::default(), windows);

        let snapshot = collector.capture().await.unwrap();

        assert!((0.0..=100.0).contains(&snapshot.cpu.percent));
        assert!(snapshot
            .cpu
            .per_core
            .iter()
            .all(|core| (0.0..=100.0).contains(core)));
        assert!((0.0..=100.0).contains(&snapshot.memory.percent));
        assert!(snapshot.memory.total > 0);
        assert!(snapshot.disks.iter().all(|d| d.percent <= 100.0));
        if let Some(battery) = &snapshot.battery {
            assert!((0.0..=100.0).contains(&battery.percent));
        }
    }
}
