use anyhow::Context;
use chrono::{DateTime, Local};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::collectors::system::format_running_time;
use crate::models::issue::Issue;
use crate::models::network::{Connection, InterfaceAddress};
use crate::models::system::{HostInfo, ProcessInfo};
use crate::models::Snapshot;
use crate::ui::format::{
    format_bytes, format_created, format_datetime, format_optional, format_temperature,
    NOT_AVAILABLE,
};

/// Connections listed in a report before the table is cut off.
pub const MAX_REPORT_CONNECTIONS: usize = 30;

const RULE_WIDTH: usize = 80;
const SECTION_RULE_WIDTH: usize = 30;

/// Everything a report is rendered from.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub generated: DateTime<Local>,
    pub host: HostInfo,
    pub snapshot: Snapshot,
    pub interfaces: Vec<InterfaceAddress>,
    pub issues: Vec<Issue>,
    pub top_cpu: Vec<ProcessInfo>,
    pub top_memory: Vec<ProcessInfo>,
    /// `None` when socket tables are not readable on this host.
    pub connections: Option<Vec<Connection>>,
}

/// `system_report_YYYYMMDD_HHMMSS.txt`
pub fn report_filename(time: &DateTime<Local>) -> String {
    format!("system_report_{}.txt", time.format("%Y%m%d_%H%M%S"))
}

/// Writes the report into `directory` and returns its path.
///
/// The file is closed before returning on every path, including errors.
pub fn write_report(directory: &Path, data: &ReportData) -> anyhow::Result<PathBuf> {
    let path = directory.join(report_filename(&data.generated));
    debug!("Writing report to {}", path.display());

    let file = File::create(&path)
        .with_context(|| format!("Failed to create report {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    render_report(data, &mut writer)
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    info!("Report saved to {}", path.display());
    Ok(path)
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn section<W: Write>(out: &mut W, title: &str) -> std::io::Result<()> {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(SECTION_RULE_WIDTH))
}

pub fn render_report<W: Write>(data: &ReportData, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "SYSTEM STATUS REPORT")?;
    writeln!(out, "Generated: {}", data.generated.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;

    render_host(&data.host, out)?;
    render_resources(&data.snapshot, &data.interfaces, out)?;
    render_issues(&data.issues, out)?;
    render_processes("TOP PROCESSES BY CPU USAGE", &data.top_cpu, out)?;
    render_processes("TOP PROCESSES BY MEMORY USAGE", &data.top_memory, out)?;
    render_connections(data.connections.as_deref(), out)
}

fn render_host<W: Write>(host: &HostInfo, out: &mut W) -> std::io::Result<()> {
    section(out, "SYSTEM INFORMATION")?;
    writeln!(out, "Operating System: {} {}", host.system, host.version)?;
    writeln!(out, "Kernel: {}", host.kernel)?;
    writeln!(out, "Processor: {}", host.processor)?;
    writeln!(out, "Architecture: {}", host.architecture)?;
    writeln!(out, "Hostname: {}", host.hostname)?;
    writeln!(out, "Boot Time: {}", format_datetime(host.boot_time))?;
    writeln!(out, "System Uptime: {}", host.uptime_display)?;
    writeln!(out)
}

fn render_resources<W: Write>(
    snapshot: &Snapshot,
    interfaces: &[InterfaceAddress],
    out: &mut W,
) -> std::io::Result<()> {
    let cpu = &snapshot.cpu;
    section(out, "RESOURCE USAGE")?;
    writeln!(
        out,
        "CPU: {:.1}% | Frequency: {} MHz | Temperature: {}",
        cpu.percent,
        format_optional(cpu.frequency_mhz),
        format_temperature(cpu.temperature_celsius)
    )?;
    writeln!(
        out,
        "Cores: {} physical, {} logical",
        format_optional(cpu.physical_cores),
        cpu.logical_cores
    )?;
    writeln!(out, "Per-core Usage:")?;
    for (i, core) in cpu.per_core.iter().enumerate() {
        writeln!(out, "  Core {}: {:.1}%", i, core)?;
    }

    let mem = &snapshot.memory;
    writeln!(out)?;
    writeln!(out, "Total Memory: {}", format_bytes(mem.total))?;
    writeln!(out, "Used Memory: {} ({:.1}%)", format_bytes(mem.used), mem.percent)?;
    writeln!(out, "Available Memory: {}", format_bytes(mem.available))?;
    writeln!(out)?;
    writeln!(
        out,
        "Swap Memory: {} / {} ({:.1}%)",
        format_bytes(snapshot.swap.used),
        format_bytes(snapshot.swap.total),
        snapshot.swap.percent
    )?;

    writeln!(out)?;
    writeln!(out, "Disks:")?;
    for (i, disk) in snapshot.disks.iter().enumerate() {
        writeln!(out, "  Disk {}: {} ({})", i + 1, disk.device, disk.filesystem)?;
        writeln!(out, "    Mount point: {}", disk.mountpoint)?;
        writeln!(out, "    Total space: {}", format_bytes(disk.total))?;
        writeln!(out, "    Used: {} ({:.1}%)", format_bytes(disk.used), disk.percent)?;
        writeln!(out, "    Free: {}", format_bytes(disk.free))?;
    }

    writeln!(out)?;
    match &snapshot.disk_io {
        Some(io) => {
            writeln!(out, "Disk I/O - Total Read: {}", format_bytes(io.read_bytes))?;
            writeln!(out, "Disk I/O - Total Written: {}", format_bytes(io.write_bytes))?;
            writeln!(out, "Disk I/O - Read Operations: {}", io.read_count)?;
            writeln!(out, "Disk I/O - Write Operations: {}", io.write_count)?;
        }
        None => writeln!(out, "Disk I/O: {}", NOT_AVAILABLE)?,
    }

    writeln!(out)?;
    match &snapshot.network {
        Some(net) => {
            writeln!(out, "Network - Total Sent: {}", format_bytes(net.bytes_sent))?;
            writeln!(out, "Network - Total Received: {}", format_bytes(net.bytes_received))?;
            writeln!(out, "Network - Packets Sent: {}", net.packets_sent)?;
            writeln!(out, "Network - Packets Received: {}", net.packets_received)?;
            writeln!(out, "Network - Inbound Errors: {}", net.errors_in)?;
            writeln!(out, "Network - Outbound Errors: {}", net.errors_out)?;
        }
        None => writeln!(out, "Network: {}", NOT_AVAILABLE)?,
    }

    writeln!(out)?;
    writeln!(out, "Network Interfaces:")?;
    for iface in interfaces {
        writeln!(out, "  Interface: {}", iface.interface)?;
        writeln!(out, "    IP: {}", iface.ip)?;
        writeln!(out, "    Netmask: {}", format_optional(iface.netmask))?;
    }

    if let Some(battery) = &snapshot.battery {
        let status = if battery.is_plugged() {
            "Plugged In"
        } else {
            "Discharging"
        };
        writeln!(out)?;
        writeln!(out, "Battery: {:.0}% - {}", battery.percent, status)?;
        if let Some(secs) = battery.seconds_left {
            writeln!(
                out,
                "Estimated time remaining: {}",
                format_running_time(Duration::from_secs(secs))
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Active Processes: {}", snapshot.process_count)?;
    writeln!(out)
}

fn render_issues<W: Write>(issues: &[Issue], out: &mut W) -> std::io::Result<()> {
    section(out, "SYSTEM ISSUES")?;
    if issues.is_empty() {
        writeln!(out, "No system issues detected.")?;
    }
    for issue in issues {
        writeln!(out, "{}", issue)?;
    }
    writeln!(out)
}

fn render_processes<W: Write>(
    title: &str,
    processes: &[ProcessInfo],
    out: &mut W,
) -> std::io::Result<()> {
    section(out, title)?;
    writeln!(
        out,
        "{:<7} {:<20} {:<15} {:<10} {:<8} {:<10} {:<16} {:<40}",
        "PID", "Name", "User", "Status", "CPU %", "Memory %", "Created", "Command"
    )?;
    for p in processes {
        writeln!(
            out,
            "{:<7} {:<20} {:<15} {:<10} {:<8.1} {:<10.1} {:<16} {:<40}",
            p.pid,
            clip(&p.name, 20),
            clip(&p.user, 15),
            clip(&p.status, 10),
            p.cpu_percent,
            p.memory_percent,
            format_created(p.created_at),
            clip(&p.command_line, 40)
        )?;
    }
    writeln!(out)
}

fn render_connections<W: Write>(
    connections: Option<&[Connection]>,
    out: &mut W,
) -> std::io::Result<()> {
    section(out, "NETWORK CONNECTIONS")?;
    match connections {
        Some(connections) if !connections.is_empty() => {
            writeln!(
                out,
                "{:<8} {:<25} {:<25} {:<15} {:<7} {:<20}",
                "Protocol", "Local Address", "Remote Address", "Status", "PID", "Process"
            )?;
            for conn in connections.iter().take(MAX_REPORT_CONNECTIONS) {
                writeln!(
                    out,
                    "{:<8} {:<25} {:<25} {:<15} {:<7} {:<20}",
                    conn.protocol.to_string(),
                    clip(&conn.local_addr, 25),
                    clip(conn.remote_addr.as_deref().unwrap_or(NOT_AVAILABLE), 25),
                    clip(&conn.status, 15),
                    format_optional(conn.pid),
                    clip(conn.process_name.as_deref().unwrap_or(NOT_AVAILABLE), 20)
                )?;
            }
        }
        _ => writeln!(out, "No network connections information available.")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::disk::DiskInfo;
    use crate::models::network::Protocol;
    use chrono::TimeZone;

    fn sample() -> ReportData {
        let generated = Local.with_ymd_and_hms(2024, 5, 17, 14, 3, 9).unwrap();
        let mut snapshot = Snapshot {
            timestamp: generated,
            ..Default::default()
        };
        snapshot.cpu.percent = 95.0;
        snapshot.cpu.per_core = vec![90.0, 100.0];
        snapshot.disks = vec![DiskInfo {
            device: "/dev/sda1".into(),
            mountpoint: "/".into(),
            percent: 92.0,
            ..Default::default()
        }];
        let issues = crate::issues::evaluate(&snapshot);

        let connection = Connection {
            protocol: Protocol::Tcp,
            local_addr: "127.0.0.1:631".into(),
            remote_addr: None,
            status: "LISTEN".into(),
            inode: 1,
            pid: Some(812),
            process_name: Some("cupsd".into()),
        };

        ReportData {
            generated,
            host: HostInfo {
                system: "Linux".into(),
                hostname: "box".into(),
                ..Default::default()
            },
            snapshot,
            interfaces: Vec::new(),
            issues,
            top_cpu: vec![ProcessInfo {
                pid: 42,
                name: "a-very-long-process-name-indeed".into(),
                user: "root".into(),
                cpu_percent: 12.34,
                ..Default::default()
            }],
            top_memory: Vec::new(),
            connections: Some(vec![connection; 40]),
        }
    }

    #[test]
    fn test_report_filename() {
        let time = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(report_filename(&time), "system_report_20240102_030405.txt");
    }

    #[test]
    fn test_render_sections() {
        let mut out = Vec::new();
        render_report(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with(&"=".repeat(80)));
        assert!(text.contains("Generated: 2024-05-17 14:03:09"));
        assert!(text.contains("Hostname: box"));
        assert!(text.contains("  Core 1: 100.0%"));
        assert!(text.contains("[HIGH] CPU: CPU usage is critically high at 95.0%."));
        assert!(text.contains("[HIGH] Disk: Critically low disk space on /"));
        assert!(text.contains("Disk I/O: N/A"));
        assert!(text.contains("42      a-very-long-process- root"));
        assert!(text.contains("12.3 "));
        assert_eq!(text.matches("cupsd").count(), MAX_REPORT_CONNECTIONS);
    }

    #[test]
    fn test_render_without_connections() {
        let mut data = sample();
        data.connections = None;
        data.issues.clear();

        let mut out = Vec::new();
        render_report(&data, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("No system issues detected."));
        assert!(text.contains("No network connections information available."));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let data = sample();

        let path = write_report(dir.path(), &data).unwrap();

        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("system_report_20240517_140309.txt")
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("SYSTEM STATUS REPORT"));
        assert!(content.contains("TOP PROCESSES BY MEMORY USAGE"));
    }

    #[test]
    fn test_write_report_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(write_report(&missing, &sample()).is_err());
    }
}
