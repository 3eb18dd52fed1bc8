use colored::Colorize;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};
use std::time::Duration;

use crate::collectors::system::format_running_time;
use crate::history::MetricsHistory;
use crate::issues::recommendations;
use crate::models::disk::{DeviceIoStats, Partition};
use crate::models::issue::{Issue, Severity};
use crate::models::network::Connection;
use crate::models::system::{HostInfo, ProcessDetails, ProcessInfo, SortBy};
use crate::models::Snapshot;
use crate::rates::{per_second, Rates};
use crate::ui::format::{
    format_bytes, format_bytes_opt, format_created, format_datetime, format_optional, format_rate,
    format_temperature, NOT_AVAILABLE,
};
use crate::ui::graph::render_ascii_graph;
use crate::ui::table::Table;

const BANNER_WIDTH: usize = 100;
const GRAPH_HEIGHT: usize = 10;
const PROCESS_GRAPH_HEIGHT: usize = 25;

const BANNER: &str = r"
    ███████╗██╗   ██╗███████╗███╗   ███╗ ██████╗ ███╗   ██╗
    ██╔════╝╚██╗ ██╔╝██╔════╝████╗ ████║██╔═══██╗████╗  ██║
    ███████╗ ╚████╔╝ ███████╗██╔████╔██║██║   ██║██╔██╗ ██║
    ╚════██║  ╚██╔╝  ╚════██║██║╚██╔╝██║██║   ██║██║╚██╗██║
    ███████║   ██║   ███████║██║ ╚═╝ ██║╚██████╔╝██║ ╚████║
    ╚══════╝   ╚═╝   ╚══════╝╚═╝     ╚═╝ ╚═════╝ ╚═╝  ╚═══╝
";

/// Wipes the terminal and homes the cursor. Failures (no tty) are ignored.
pub fn clear_screen() {
    let _ = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0));
}

pub fn show_banner() {
    println!("{}", BANNER.cyan());
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!(
        "{}",
        format!("{:^width$}", "System Monitoring Tool", width = BANNER_WIDTH).bold()
    );
    println!("{}\n", "=".repeat(BANNER_WIDTH));
}

fn title(text: &str) {
    println!("\n{}", format!("--- {} ---", text).bold().cyan());
}

pub fn show_system_info(host: &HostInfo) {
    title("SYSTEM INFORMATION");
    println!("Operating System: {} {}", host.system, host.version);
    println!("Kernel: {}", host.kernel);
    println!("Processor: {}", host.processor);
    println!("Architecture: {}", host.architecture);
    println!("Hostname: {}", host.hostname);
    println!("Boot Time: {}", format_datetime(host.boot_time));
    println!("System Uptime: {}", host.uptime_display);
}

/// Resource summary. With `rates`, throughput replaces the cumulative totals.
pub fn write_resource_usage<W: Write>(
    out: &mut W,
    snapshot: &Snapshot,
    rates: Option<&Rates>,
) -> io::Result<()> {
    let cpu = &snapshot.cpu;
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
    let cores: Vec<String> = cpu
        .per_core
        .iter()
        .enumerate()
        .map(|(i, p)| format!("Core {}: {:.1}%", i, p))
        .collect();
    writeln!(out, "Per-core Usage: {}", cores.join(" "))?;

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
    match (rates, &snapshot.disk_io) {
        (Some(rates), Some(_)) => {
            writeln!(out, "Disk I/O - Read Rate: {}", format_rate(rates.disk_read))?;
            writeln!(out, "Disk I/O - Write Rate: {}", format_rate(rates.disk_write))?;
        }
        _ => {
            let io = snapshot.disk_io;
            writeln!(
                out,
                "Disk I/O - Total Read: {}",
                format_bytes_opt(io.map(|io| io.read_bytes))
            )?;
            writeln!(
                out,
                "Disk I/O - Total Written: {}",
                format_bytes_opt(io.map(|io| io.write_bytes))
            )?;
        }
    }

    writeln!(out)?;
    match (rates, &snapshot.network) {
        (Some(rates), Some(_)) => {
            writeln!(out, "Network - Upload Rate: {}", format_rate(rates.net_sent))?;
            writeln!(out, "Network - Download Rate: {}", format_rate(rates.net_received))?;
        }
        _ => {
            let net = snapshot.network;
            writeln!(
                out,
                "Network - Total Sent: {}",
                format_bytes_opt(net.map(|n| n.bytes_sent))
            )?;
            writeln!(
                out,
                "Network - Total Received: {}",
                format_bytes_opt(net.map(|n| n.bytes_received))
            )?;
        }
    }

    if let Some(battery) = &snapshot.battery {
        let status = if battery.is_plugged() {
            "Plugged In"
        } else {
            "Discharging"
        };
        writeln!(out)?;
        writeln!(out, "Battery: {:.0}% - {}", battery.percent, status)?;
        if let Some(secs) = battery.seconds_left.filter(|_| !battery.is_plugged()) {
            writeln!(
                out,
                "Estimated time remaining: {}",
                format_running_time(Duration::from_secs(secs))
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Active Processes: {}", snapshot.process_count)
}

pub fn show_issues(issues: &[Issue]) {
    title("SYSTEM HEALTH CHECK");
    if issues.is_empty() {
        println!(
            "\n{}",
            "No system issues detected. Your system appears to be healthy!".green()
        );
        return;
    }

    println!("\nDetected system issues:");
    let mut table = Table::new(&["Severity", "Component", "Issue"]);
    for issue in issues {
        table.add_row(vec![
            issue.severity.to_string(),
            issue.component.to_string(),
            issue.message.clone(),
        ]);
    }
    println!("{}", table);

    let high = issues.iter().filter(|i| i.severity == Severity::High).count();
    if high > 0 {
        println!("{}", format!("{} critical issue(s) found.", high).red().bold());
    }

    println!("\n{}", "Recommendations:".bold());
    for line in recommendations(issues) {
        println!("- {}", line);
    }
}

pub fn process_table(processes: &[ProcessInfo]) -> Table {
    let mut table = Table::new(&[
        "PID", "Name", "User", "Status", "CPU %", "Memory %", "Created", "Command",
    ]);
    for p in processes {
        table.add_row(vec![
            p.pid.to_string(),
            p.name.clone(),
            p.user.clone(),
            p.status.clone(),
            format!("{:.1}", p.cpu_percent),
            format!("{:.1}", p.memory_percent),
            format_created(p.created_at),
            p.command_line.clone(),
        ]);
    }
    table
}

pub fn show_processes(processes: &[ProcessInfo], sort_by: SortBy) {
    title(&format!("TOP PROCESSES (Sorted by {})", sort_by.label()));
    println!("{}", process_table(processes));
}

pub fn show_connections(connections: Option<&[Connection]>) {
    title("NETWORK CONNECTIONS");
    let Some(connections) = connections.filter(|c| !c.is_empty()) else {
        println!("No network connections information available.");
        return;
    };

    let mut table = Table::new(&[
        "Protocol",
        "Local Address",
        "Remote Address",
        "Status",
        "PID",
        "Process",
    ]);
    for conn in connections {
        table.add_row(vec![
            conn.protocol.to_string(),
            conn.local_addr.clone(),
            conn.remote_addr.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            conn.status.clone(),
            format_optional(conn.pid),
            conn.process_name
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ]);
    }
    println!("{}", table);
    println!("\nTotal connections: {}", connections.len());
}

pub fn show_disk_io(devices: Option<&[DeviceIoStats]>, partitions: &[Partition]) {
    title("DISK I/O STATISTICS");
    let Some(devices) = devices.filter(|d| !d.is_empty()) else {
        println!("No disk I/O information available.");
        return;
    };

    let mut table = Table::new(&[
        "Device",
        "Read Count",
        "Read Bytes",
        "Read Time",
        "Write Count",
        "Write Bytes",
        "Write Time",
    ]);
    for dev in devices {
        table.add_row(vec![
            dev.device.clone(),
            dev.read_count.to_string(),
            format_bytes(dev.read_bytes),
            format!("{}ms", dev.read_time_ms),
            dev.write_count.to_string(),
            format_bytes(dev.write_bytes),
            format!("{}ms", dev.write_time_ms),
        ]);
    }
    println!("{}", table);

    title("DISK PARTITIONS");
    let mut table = Table::new(&["Device", "Mountpoint", "Filesystem", "Removable"]);
    for part in partitions {
        table.add_row(vec![
            part.device.clone(),
            part.mountpoint.clone(),
            part.filesystem.clone(),
            if part.removable { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{}", table);
}

fn kb_per_second(rates: Vec<f64>) -> Vec<f64> {
    rates.into_iter().map(|r| r / 1024.0).collect()
}

pub fn show_graphs(history: &MetricsHistory) {
    title("RESOURCE USAGE GRAPHS");
    if history.is_empty() {
        println!("No history yet. Run the real-time monitor (option 2) to collect samples.");
        return;
    }

    let as_f64 = |values: Vec<f32>| -> Vec<f64> { values.into_iter().map(f64::from).collect() };
    let sections = [
        ("CPU Usage (%)", as_f64(history.cpu.values()), "%"),
        ("Memory Usage (%)", as_f64(history.memory.values()), "%"),
        (
            "Network Upload (KB/s)",
            kb_per_second(per_second(&history.net_sent.values())),
            "K",
        ),
        (
            "Network Download (KB/s)",
            kb_per_second(per_second(&history.net_recv.values())),
            "K",
        ),
        (
            "Disk Read (KB/s)",
            kb_per_second(per_second(&history.disk_read.values())),
            "K",
        ),
        (
            "Disk Write (KB/s)",
            kb_per_second(per_second(&history.disk_write.values())),
            "K",
        ),
    ];
    for (label, data, unit) in sections {
        println!("\n{}", label.bold());
        println!("{}", render_ascii_graph(&data, GRAPH_HEIGHT, unit));
    }
}

pub fn show_process_details(details: &ProcessDetails, cpu: &[f64], memory: &[f64]) {
    println!(
        "{}",
        format!(
            "--- MONITORING PROCESS: {} (PID: {}) ---",
            details.name, details.pid
        )
        .bold()
        .cyan()
    );
    println!(
        "Press Ctrl+C to stop | Last update: {}",
        chrono::Local::now().format("%H:%M:%S")
    );
    println!("\nStatus: {}", details.status);
    println!("CPU Usage: {:.1}%", details.cpu_percent);
    println!(
        "Memory Usage: {:.2}% ({})",
        details.memory_percent,
        format_bytes(details.memory_rss)
    );
    println!("Created: {}", format_datetime(details.created_at));
    println!(
        "Running Time: {}",
        format_running_time(Duration::from_secs(details.running_secs))
    );
    println!("Threads: {}", format_optional(details.threads));
    println!("I/O - Read: {}", format_bytes(details.io_read_bytes));
    println!("I/O - Written: {}", format_bytes(details.io_written_bytes));
    println!("\nCommand Line: {}", details.command_line);

    println!("\nCPU Usage History (last {} samples):", cpu.len());
    println!("{}", render_ascii_graph(cpu, PROCESS_GRAPH_HEIGHT, "%"));
    println!("\nMemory Usage History (last {} samples):", memory.len());
    println!("{}", render_ascii_graph(memory, PROCESS_GRAPH_HEIGHT, "%"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::disk::DiskIoCounters;
    use crate::models::network::NetworkCounters;

    fn render(snapshot: &Snapshot, rates: Option<&Rates>) -> String {
        let mut out = Vec::new();
        write_resource_usage(&mut out, snapshot, rates).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_totals_without_previous_sample() {
        let snapshot = Snapshot {
            network: Some(NetworkCounters {
                bytes_sent: 2048,
                ..Default::default()
            }),
            process_count: 321,
            ..Default::default()
        };

        let text = render(&snapshot, None);

        assert!(text.contains("Network - Total Sent: 2"));
        assert!(text.contains("Disk I/O - Total Read: N/A"));
        assert!(text.contains("Temperature: N/A"));
        assert!(text.contains("Active Processes: 321"));
        assert!(!text.contains("Battery"));
    }

    #[test]
    fn test_rates_with_previous_sample() {
        let snapshot = Snapshot {
            disk_io: Some(DiskIoCounters::default()),
            network: Some(NetworkCounters::default()),
            ..Default::default()
        };
        let rates = Rates {
            disk_read: Some(0.0),
            disk_write: None,
            net_sent: Some(0.0),
            net_received: Some(0.0),
        };

        let text = render(&snapshot, Some(&rates));

        assert!(text.contains("Disk I/O - Read Rate: 0 B/s"));
        assert!(text.contains("Disk I/O - Write Rate: N/A"));
        assert!(text.contains("Network - Upload Rate: 0 B/s"));
        assert!(!text.contains("Total Sent"));
    }

    #[test]
    fn test_process_table_columns() {
        let table = process_table(&[ProcessInfo {
            pid: 7,
            name: "init".into(),
            cpu_percent: 1.25,
            ..Default::default()
        }]);
        let text = table.to_string();

        assert_eq!(table.len(), 1);
        assert!(text.contains("Memory %"));
        assert!(text.contains(" init "));
        assert!(text.contains(" N/A "));
    }
}
