use chrono::Local;
use colored::Colorize;
use log::{debug, info};
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::collectors::collector::SnapshotCollector;
use crate::collectors::process::ProcessSampler;
use crate::error::{MonitorError, ProcessError, Result};
use crate::history::{HistoryRing, MetricsHistory};
use crate::interrupt::Interrupt;
use crate::models::Snapshot;
use crate::rates::Rates;
use crate::ui::display::{clear_screen, show_process_details, write_resource_usage};

const SLEEP_SLICE: Duration = Duration::from_millis(100);
const START_DELAY: Duration = Duration::from_secs(1);
const PROCESS_CPU_WINDOW: Duration = Duration::from_millis(100);

/// Sleeps for `duration` in short slices, returning early on Ctrl+C.
///
/// Returns `false` if the sleep was cut short.
pub async fn sleep_unless_interrupted(interrupt: &Interrupt, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if interrupt.is_requested() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        tokio::time::sleep(SLEEP_SLICE.min(deadline - now)).await;
    }
}

/// One frame of the live view. Rates need the `previous` snapshot.
fn render_live<W: Write>(
    out: &mut W,
    snapshot: &Snapshot,
    previous: Option<&Snapshot>,
) -> Result<()> {
    writeln!(out, "{}", "--- LIVE SYSTEM MONITORING ---".bold().cyan())?;
    writeln!(
        out,
        "Press Ctrl+C to stop | Last update: {}",
        Local::now().format("%H:%M:%S")
    )?;
    writeln!(out, "\n{}", "--- RESOURCE USAGE ---".bold().cyan())?;
    let rates = previous.map(|prev| Rates::between(snapshot, prev));
    write_resource_usage(out, snapshot, rates.as_ref())?;
    out.flush()?;
    Ok(())
}

/// Capture, render and sleep until Ctrl+C.
///
/// Every capture is recorded into `history`. Rates are shown from the second
/// iteration on.
pub async fn monitor_live(
    collector: &mut SnapshotCollector,
    history: &mut MetricsHistory,
    interrupt: &Interrupt,
    interval: Duration,
) -> Result<()> {
    let _guard = interrupt.guard();
    info!("Live monitoring started, interval {:?}", interval);
    println!("\nPress Ctrl+C to stop monitoring...");

    let mut previous: Option<Snapshot> = None;
    if sleep_unless_interrupted(interrupt, START_DELAY).await {
        while !interrupt.is_requested() {
            let snapshot = collector.capture().await?;
            history.record(&snapshot);
            if interrupt.is_requested() {
                break;
            }

            clear_screen();
            render_live(&mut io::stdout().lock(), &snapshot, previous.as_ref())?;
            previous = Some(snapshot);

            sleep_unless_interrupted(interrupt, interval).await;
        }
    }

    interrupt.clear();
    debug!("Live monitoring stopped after {} samples", history.cpu.len());
    println!("\nMonitoring stopped.");
    Ok(())
}

/// Follows one process until it exits or Ctrl+C, graphing its CPU and memory.
pub async fn monitor_process(
    sampler: &mut ProcessSampler,
    pid: u32,
    interrupt: &Interrupt,
    interval: Duration,
) -> Result<()> {
    let first = sampler
        .details(pid, PROCESS_CPU_WINDOW)
        .await
        .map_err(|_| MonitorError::ProcessNotFound(pid))?;

    let _guard = interrupt.guard();
    println!("\nMonitoring process: {} (PID: {})", first.name, pid);
    println!("Press Ctrl+C to stop monitoring...");

    let mut cpu = HistoryRing::new();
    let mut memory = HistoryRing::new();
    if sleep_unless_interrupted(interrupt, START_DELAY).await {
        while !interrupt.is_requested() {
            let details = match sampler.details(pid, PROCESS_CPU_WINDOW).await {
                Ok(details) => details,
                Err(ProcessError::Vanished(_)) => {
                    println!("\nProcess with PID {} terminated.", pid);
                    interrupt.clear();
                    return Ok(());
                }
                Err(ProcessError::AccessDenied(_)) => {
                    println!("\nAccess denied to process with PID {}.", pid);
                    interrupt.clear();
                    return Ok(());
                }
            };
            cpu.push(f64::from(details.cpu_percent));
            memory.push(f64::from(details.memory_percent));

            clear_screen();
            show_process_details(&details, &cpu.values(), &memory.values());

            sleep_unless_interrupted(interrupt, interval).await;
        }
    }

    interrupt.clear();
    println!("\nMonitoring stopped.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::collector::SamplingWindows;
    use crate::models::AllowedResources;

    fn request_after(interrupt: &Interrupt, delay: Duration) {
        let interrupt = interrupt.clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            interrupt.request();
        });
    }

    #[tokio::test]
    async fn test_sleep_returns_early() {
        let interrupt = Interrupt::new();
        let _guard = interrupt.guard();
        request_after(&interrupt, Duration::from_millis(150));

        let start = Instant::now();
        let completed = sleep_unless_interrupted(&interrupt, Duration::from_secs(30)).await;

        assert!(!completed);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_sleep_completes() {
        let interrupt = Interrupt::new();
        assert!(sleep_unless_interrupted(&interrupt, Duration::from_millis(120)).await);
    }

    #[tokio::test]
    async fn test_live_loop_stops_on_interrupt() {
        let windows = SamplingWindows {
            aggregate: Duration::from_millis(100),
            per_core: Duration::from_millis(50),
        };
        let mut collector = SnapshotCollector::new(AllowedResources::default(), windows);
        let mut history = MetricsHistory::new();
        let interrupt = Interrupt::new();
        request_after(&interrupt, Duration::from_millis(1800));

        let start = Instant::now();
        monitor_live(
            &mut collector,
            &mut history,
            &interrupt,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        assert!(start.elapsed() < Duration::from_secs(30));
        assert!(!history.is_empty());
        assert!(!interrupt.is_requested());
        assert!(!interrupt.is_guarded());
    }

    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_live_shows_rates() {
        let previous = Snapshot::default();
        let mut snapshot = previous.clone();
        snapshot.timestamp = previous.timestamp + chrono::Duration::seconds(2);

        let mut out = Vec::new();
        render_live(&mut out, &snapshot, Some(&previous)).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("LIVE SYSTEM MONITORING"));
        assert!(text.contains("RESOURCE USAGE"));
    }

    #[test]
    fn test_render_live_reports_closed_output() {
        let result = render_live(&mut ClosedOutput, &Snapshot::default(), None);
        assert!(matches!(result, Err(MonitorError::Io(_))));
    }

    #[tokio::test]
    async fn test_monitor_missing_process() {
        let mut sampler = ProcessSampler::new(30);
        let interrupt = Interrupt::new();

        let result = monitor_process(
            &mut sampler,
            u32::MAX - 1,
            &interrupt,
            Duration::from_secs(1),
        )
        .await;

        assert!(matches!(result, Err(MonitorError::ProcessNotFound(_))));
    }
}
