//! Threshold checks over a single snapshot.
//!
//! Thresholds are fixed. Every comparison is strict, so a reading sitting exactly
//! on a threshold does not trigger it.

use crate::models::issue::{Component, Issue, Severity};
use crate::models::{format_bytes, Snapshot};

const CPU_HIGH: f32 = 85.0;
const CPU_MEDIUM: f32 = 70.0;
const FREE_MEMORY_HIGH: f32 = 10.0;
const FREE_MEMORY_MEDIUM: f32 = 20.0;
const SWAP_MEDIUM: f32 = 80.0;
const DISK_HIGH: f32 = 90.0;
const DISK_MEDIUM: f32 = 80.0;
const BATTERY_HIGH: f32 = 15.0;
const BATTERY_MEDIUM: f32 = 30.0;
const TEMPERATURE_HIGH: f32 = 85.0;
const TEMPERATURE_MEDIUM: f32 = 75.0;

fn issue(severity: Severity, component: Component, message: String) -> Issue {
    Issue {
        severity,
        component,
        message,
    }
}

/// Issues found in `snapshot`, in component order. Pure and deterministic.
///
/// Metrics the host does not report are skipped.
pub fn evaluate(snapshot: &Snapshot) -> Vec<Issue> {
    let mut issues = Vec::new();

    let cpu = snapshot.cpu.percent;
    if cpu > CPU_HIGH {
        issues.push(issue(
            Severity::High,
            Component::Cpu,
            format!("CPU usage is critically high at {:.1}%.", cpu),
        ));
    } else if cpu > CPU_MEDIUM {
        issues.push(issue(
            Severity::Medium,
            Component::Cpu,
            format!("CPU usage is elevated at {:.1}%.", cpu),
        ));
    }

    let free_memory = 100.0 - snapshot.memory.percent;
    if free_memory < FREE_MEMORY_HIGH {
        issues.push(issue(
            Severity::High,
            Component::Memory,
            format!("Available memory is critically low at {:.1}% free.", free_memory),
        ));
    } else if free_memory < FREE_MEMORY_MEDIUM {
        issues.push(issue(
            Severity::Medium,
            Component::Memory,
            format!("Available memory is running low at {:.1}% free.", free_memory),
        ));
    }

    if snapshot.swap.percent > SWAP_MEDIUM {
        issues.push(issue(
            Severity::Medium,
            Component::Swap,
            format!(
                "Swap memory usage is high at {:.1}%, which may impact system performance.",
                snapshot.swap.percent
            ),
        ));
    }

    for disk in &snapshot.disks {
        if disk.percent > DISK_HIGH {
            issues.push(issue(
                Severity::High,
                Component::Disk,
                format!(
                    "Critically low disk space on {} ({:.1}% used, only {} free).",
                    disk.mountpoint,
                    disk.percent,
                    format_bytes(disk.free)
                ),
            ));
        } else if disk.percent > DISK_MEDIUM {
            issues.push(issue(
                Severity::Medium,
                Component::Disk,
                format!(
                    "Low disk space on {} ({:.1}% used, {} free).",
                    disk.mountpoint,
                    disk.percent,
                    format_bytes(disk.free)
                ),
            ));
        }
    }

    if let Some(battery) = snapshot.battery.as_ref().filter(|b| !b.is_plugged()) {
        if battery.percent < BATTERY_HIGH {
            issues.push(issue(
                Severity::High,
                Component::Battery,
                format!(
                    "Battery level is critically low at {:.0}%. Connect to a power source soon.",
                    battery.percent
                ),
            ));
        } else if battery.percent < BATTERY_MEDIUM {
            issues.push(issue(
                Severity::Medium,
                Component::Battery,
                format!("Battery level is low at {:.0}%.", battery.percent),
            ));
        }
    }

    if let Some(temp) = snapshot.cpu.temperature_celsius {
        if temp > TEMPERATURE_HIGH {
            issues.push(issue(
                Severity::High,
                Component::Temperature,
                format!("CPU temperature is critically high at {:.1}°C.", temp),
            ));
        } else if temp > TEMPERATURE_MEDIUM {
            issues.push(issue(
                Severity::Medium,
                Component::Temperature,
                format!("CPU temperature is elevated at {:.1}°C.", temp),
            ));
        }
    }

    issues
}

fn advice(issue: &Issue) -> &'static [&'static str] {
    match (issue.component, issue.severity) {
        (Component::Cpu, Severity::High) => &[
            "Consider closing resource-intensive applications",
            "Check for runaway processes and terminate them if necessary",
        ],
        (Component::Memory, _) => &[
            "Close unnecessary applications to free up memory",
            "Consider upgrading RAM if this is a recurring issue",
        ],
        (Component::Disk, _) => &[
            "Clean up unnecessary files",
            "Run disk cleanup utilities",
            "Consider moving files to external storage",
        ],
        (Component::Temperature, _) => &[
            "Ensure proper ventilation for your device",
            "Clean cooling fans and vents",
            "Avoid using the device on soft surfaces that block airflow",
        ],
        (Component::Battery, _) => &[
            "Connect to a power source soon",
            "Enable power saving mode",
        ],
        _ => &[],
    }
}

/// Suggested actions for `issues`, each listed once in first-seen order.
pub fn recommendations(issues: &[Issue]) -> Vec<&'static str> {
    let mut result: Vec<&'static str> = Vec::new();
    for line in issues.iter().flat_map(|issue| advice(issue).iter().copied()) {
        if !result.contains(&line) {
            result.push(line);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::battery::BatteryInfo;
    use crate::models::disk::DiskInfo;

    fn snapshot(cpu: f32, memory: f32) -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.cpu.percent = cpu;
        snapshot.memory.percent = memory;
        snapshot
    }

    fn disk(mountpoint: &str, percent: f32) -> DiskInfo {
        DiskInfo {
            mountpoint: mountpoint.to_string(),
            percent,
            free: 1024 * 1024,
            ..Default::default()
        }
    }

    fn kinds(issues: &[Issue]) -> Vec<(Severity, Component)> {
        issues.iter().map(|i| (i.severity, i.component)).collect()
    }

    #[test]
    fn test_quiet_system() {
        assert!(evaluate(&snapshot(10.0, 30.0)).is_empty());
    }

    #[test]
    fn test_cpu_boundaries() {
        assert_eq!(
            kinds(&evaluate(&snapshot(85.0, 0.0))),
            vec![(Severity::Medium, Component::Cpu)]
        );
        assert_eq!(
            kinds(&evaluate(&snapshot(85.01, 0.0))),
            vec![(Severity::High, Component::Cpu)]
        );
        assert!(evaluate(&snapshot(70.0, 0.0)).is_empty());
    }

    #[test]
    fn test_memory_boundaries() {
        assert_eq!(
            kinds(&evaluate(&snapshot(0.0, 90.0))),
            vec![(Severity::Medium, Component::Memory)]
        );
        assert_eq!(
            kinds(&evaluate(&snapshot(0.0, 90.1))),
            vec![(Severity::High, Component::Memory)]
        );
        assert!(evaluate(&snapshot(0.0, 80.0)).is_empty());
    }

    #[test]
    fn test_swap() {
        let mut s = snapshot(0.0, 0.0);
        s.swap.percent = 80.5;
        let issues = evaluate(&s);
        assert_eq!(kinds(&issues), vec![(Severity::Medium, Component::Swap)]);
        assert!(issues[0].message.contains("80.5%"));
    }

    #[test]
    fn test_swap_boundary() {
        let mut s = snapshot(0.0, 0.0);
        s.swap.percent = 80.0;
        assert!(evaluate(&s).is_empty());
    }

    #[test]
    fn test_disk_boundaries() {
        let mut s = snapshot(0.0, 0.0);
        s.disks = vec![disk("/", 90.0)];
        assert_eq!(kinds(&evaluate(&s)), vec![(Severity::Medium, Component::Disk)]);

        s.disks = vec![disk("/", 80.0)];
        assert!(evaluate(&s).is_empty());

        s.disks = vec![disk("/", 90.5)];
        let issues = evaluate(&s);
        assert_eq!(kinds(&issues), vec![(Severity::High, Component::Disk)]);
        assert!(issues[0].message.contains("only 1 MB free"));
    }

    #[test]
    fn test_battery_boundaries() {
        let mut s = snapshot(0.0, 0.0);
        let battery = |percent| BatteryInfo {
            percent,
            plugged: Some(false),
            seconds_left: None,
        };

        s.battery = Some(battery(15.0));
        assert_eq!(
            kinds(&evaluate(&s)),
            vec![(Severity::Medium, Component::Battery)]
        );

        s.battery = Some(battery(30.0));
        assert!(evaluate(&s).is_empty());
    }

    #[test]
    fn test_each_disk_reported() {
        let mut s = snapshot(0.0, 0.0);
        s.disks = vec![disk("/", 95.0), disk("/home", 85.0), disk("/boot", 20.0)];

        let issues = evaluate(&s);

        assert_eq!(
            kinds(&issues),
            vec![
                (Severity::High, Component::Disk),
                (Severity::Medium, Component::Disk)
            ]
        );
        assert!(issues[0].message.contains("on / "));
        assert!(issues[1].message.contains("on /home "));
    }

    #[test]
    fn test_battery_only_when_discharging() {
        let mut s = snapshot(0.0, 0.0);
        s.battery = Some(BatteryInfo {
            percent: 10.0,
            plugged: Some(true),
            seconds_left: None,
        });
        assert!(evaluate(&s).is_empty());

        s.battery = Some(BatteryInfo {
            percent: 10.0,
            plugged: None,
            seconds_left: None,
        });
        assert_eq!(
            kinds(&evaluate(&s)),
            vec![(Severity::High, Component::Battery)]
        );

        s.battery = Some(BatteryInfo {
            percent: 25.0,
            plugged: Some(false),
            seconds_left: Some(3600),
        });
        assert_eq!(
            kinds(&evaluate(&s)),
            vec![(Severity::Medium, Component::Battery)]
        );
    }

    #[test]
    fn test_temperature() {
        let mut s = snapshot(0.0, 0.0);
        s.cpu.temperature_celsius = Some(80.0);
        assert_eq!(
            kinds(&evaluate(&s)),
            vec![(Severity::Medium, Component::Temperature)]
        );
        s.cpu.temperature_celsius = Some(90.0);
        assert_eq!(
            kinds(&evaluate(&s)),
            vec![(Severity::High, Component::Temperature)]
        );
        s.cpu.temperature_celsius = Some(85.0);
        assert_eq!(
            kinds(&evaluate(&s)),
            vec![(Severity::Medium, Component::Temperature)]
        );
    }

    #[test]
    fn test_overloaded_host() {
        let mut s = snapshot(95.0, 95.0);
        s.disks = vec![disk("/data", 92.0)];

        let issues = evaluate(&s);

        assert_eq!(
            kinds(&issues),
            vec![
                (Severity::High, Component::Cpu),
                (Severity::High, Component::Memory),
                (Severity::High, Component::Disk)
            ]
        );
        assert!(issues[2].message.contains("/data"));
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let mut s = snapshot(75.0, 85.0);
        s.swap.percent = 99.0;
        s.disks = vec![disk("/", 81.0), disk("/var", 99.0)];
        s.cpu.temperature_celsius = Some(76.0);

        assert_eq!(evaluate(&s), evaluate(&s.clone()));
    }

    #[test]
    fn test_recommendations_are_deduplicated() {
        let mut s = snapshot(95.0, 0.0);
        s.disks = vec![disk("/", 95.0), disk("/home", 85.0)];
        s.swap.percent = 90.0;

        let lines = recommendations(&evaluate(&s));

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Consider closing resource-intensive applications");
        assert_eq!(lines[2], "Clean up unnecessary files");
    }

    #[test]
    fn test_medium_cpu_has_no_advice() {
        assert!(recommendations(&evaluate(&snapshot(75.0, 0.0))).is_empty());
    }
}
