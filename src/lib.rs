pub mod collectors;
pub mod config;
pub mod error;
pub mod history;
pub mod interrupt;
pub mod issues;
pub mod models;
pub mod monitor;
pub mod rates;
pub mod report;
pub mod ui;
mod utils;

use anyhow::Context;
use chrono::Local;
use colored::Colorize;
use log::{debug, error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::collectors::collector::{SamplingWindows, SnapshotCollector};
use crate::collectors::connections;
use crate::collectors::process::ProcessSampler;
use crate::config::AppConfig;
use crate::error::MonitorError;
use crate::history::MetricsHistory;
use crate::interrupt::Interrupt;
use crate::models::issue::Issue;
use crate::models::system::SortBy;
use crate::models::Snapshot;
use crate::report::ReportData;
use crate::ui::display;
use crate::ui::menu::{self, MenuChoice};

/// What to do at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Menu,
    Monitor,
    Report,
    Info,
    Json,
}

/// What the menu does after an entry has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Continue,
    Failed,
    Exit,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    snapshot: &'a Snapshot,
    issues: &'a [Issue],
}

/// Owns the sampling pipeline for the lifetime of the program.
pub struct App {
    config: AppConfig,
    collector: SnapshotCollector,
    sampler: ProcessSampler,
    history: MetricsHistory,
    interrupt: Interrupt,
}

impl App {
    pub fn new(config: AppConfig, interrupt: Interrupt) -> Self {
        let windows = SamplingWindows {
            aggregate: config.monitor.cpu_window(),
            per_core: config.monitor.per_core_window(),
        };
        Self {
            collector: SnapshotCollector::new(config.allowed_resources(), windows),
            sampler: ProcessSampler::new(config.processes.command_width),
            history: MetricsHistory::new(),
            interrupt,
            config,
        }
    }

    pub fn history(&self) -> &MetricsHistory {
        &self.history
    }

    /// Captures a snapshot and records it into the history.
    pub async fn capture(&mut self) -> error::Result<Snapshot> {
        let snapshot = self.collector.capture().await?;
        self.history.record(&snapshot);
        Ok(snapshot)
    }

    pub async fn report_data(&mut self) -> anyhow::Result<ReportData> {
        let host = self.collector.host_info().await;
        let snapshot = self.capture().await.context("Failed to sample resources")?;
        let interfaces = self.collector.interfaces().await;
        let count = self.config.processes.count;
        let top_cpu = self.sampler.top(count, SortBy::Cpu).await;
        let top_memory = self.sampler.top(count, SortBy::Memory).await;
        let sampler = &self.sampler;
        let connections = connections::collect(|pid| sampler.name_of(pid)).await;

        Ok(ReportData {
            generated: Local::now(),
            issues: issues::evaluate(&snapshot),
            host,
            snapshot,
            interfaces,
            top_cpu,
            top_memory,
            connections,
        })
    }

    /// Collects everything and writes the report file.
    ///
    /// Ctrl+C during generation is deferred until the file is closed.
    pub async fn generate_report(&mut self) -> anyhow::Result<PathBuf> {
        let _guard = self.interrupt.guard();
        let filename = report::report_filename(&Local::now());
        println!("\nGenerating complete report: {}", filename);
        println!("Please wait...");

        let data = self.report_data().await?;
        let path = report::write_report(&self.config.report.directory, &data)?;
        println!("Report generated and saved as: {}", path.display());
        Ok(path)
    }

    pub async fn json(&mut self) -> anyhow::Result<String> {
        let snapshot = self.capture().await.context("Failed to sample resources")?;
        let issues = issues::evaluate(&snapshot);
        serde_json::to_string_pretty(&JsonOutput {
            snapshot: &snapshot,
            issues: &issues,
        })
        .context("Failed to serialise snapshot")
    }

    async fn show_info(&mut self) {
        let host = self.collector.host_info().await;
        display::show_system_info(&host);
    }

    async fn live(&mut self) -> anyhow::Result<()> {
        monitor::monitor_live(
            &mut self.collector,
            &mut self.history,
            &self.interrupt,
            self.config.monitor.refresh_interval(),
        )
        .await
        .context("Live monitoring failed")
    }

    async fn check_issues(&mut self) -> anyhow::Result<()> {
        let snapshot = self.capture().await.context("Failed to sample resources")?;
        display::show_issues(&issues::evaluate(&snapshot));
        Ok(())
    }

    async fn top_processes(&mut self) -> anyhow::Result<()> {
        let Some(answer) = menu::prompt("\nSort by (1) CPU or (2) Memory? [1/2]: ")? else {
            return Ok(());
        };
        let sort_by = menu::parse_sort(&answer);
        let processes = self.sampler.top(self.config.processes.count, sort_by).await;
        display::show_processes(&processes, sort_by);
        Ok(())
    }

    async fn follow_process(&mut self) -> anyhow::Result<()> {
        let Some(answer) = menu::prompt("\nEnter the Process ID (PID) to monitor: ")? else {
            return Ok(());
        };
        let pid = match menu::parse_pid(&answer) {
            Ok(pid) => pid,
            Err(e) => {
                debug!("{}", e);
                println!("\nInvalid PID.");
                return Ok(());
            }
        };
        match monitor::monitor_process(
            &mut self.sampler,
            pid,
            &self.interrupt,
            self.config.monitor.process_refresh_interval(),
        )
        .await
        {
            Err(MonitorError::ProcessNotFound(pid)) => {
                println!("\nProcess with PID {} not found.", pid);
                Ok(())
            }
            result => result.context("Process monitoring failed"),
        }
    }

    async fn show_connections(&mut self) {
        self.sampler.refresh().await;
        let sampler = &self.sampler;
        let connections = connections::collect(|pid| sampler.name_of(pid)).await;
        display::show_connections(connections.as_deref());
    }

    async fn show_disk_io(&mut self) {
        let devices = self.collector.device_stats().await;
        let partitions = self.collector.partitions();
        display::show_disk_io(devices.as_deref(), &partitions);
    }

    /// Runs one menu entry. Returns `false` when the program should exit.
    pub async fn handle(&mut self, choice: MenuChoice) -> anyhow::Result<bool> {
        debug!("Menu choice {:?}", choice);
        match choice {
            MenuChoice::Exit => {
                println!("\nExiting...");
                return Ok(false);
            }
            MenuChoice::SystemInfo => self.show_info().await,
            MenuChoice::LiveMonitor => {
                self.live().await?;
                return Ok(true);
            }
            MenuChoice::Issues => self.check_issues().await?,
            MenuChoice::TopProcesses => self.top_processes().await?,
            MenuChoice::Report => {
                let path = self.generate_report().await?;
                if self.interrupt.is_requested() {
                    println!("\nExiting...");
                    return Ok(false);
                }
                menu::pause(&format!(
                    "\nReport saved to {}. Press Enter to continue...",
                    path.display()
                ))?;
                return Ok(true);
            }
            MenuChoice::Graphs => display::show_graphs(&self.history),
            MenuChoice::MonitorProcess => {
                self.follow_process().await?;
                return Ok(true);
            }
            MenuChoice::Connections => self.show_connections().await,
            MenuChoice::DiskIo => self.show_disk_io().await,
        }
        menu::pause("\nPress Enter to continue...")?;
        Ok(true)
    }

    /// Runs one menu entry without letting a failure end the session.
    async fn run_choice(&mut self, choice: MenuChoice) -> Outcome {
        match self.handle(choice).await {
            Ok(true) => Outcome::Continue,
            Ok(false) => Outcome::Exit,
            Err(e) => {
                error!("{e:#}");
                println!("{}", format!("\nOperation failed: {e:#}").red());
                Outcome::Failed
            }
        }
    }

    pub async fn menu_loop(&mut self) -> anyhow::Result<()> {
        loop {
            display::clear_screen();
            display::show_banner();
            menu::show_menu();

            let Some(answer) = menu::prompt("\nSelect an option (0-9): ")? else {
                println!("\nExiting...");
                return Ok(());
            };
            match MenuChoice::parse(&answer) {
                Some(choice) => match self.run_choice(choice).await {
                    Outcome::Continue => {}
                    Outcome::Failed => menu::pause("\nPress Enter to continue...")?,
                    Outcome::Exit => return Ok(()),
                },
                None => {
                    println!("{}", "\nInvalid choice. Please try again.".yellow());
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

async fn dispatch(mode: Mode, config: AppConfig) -> anyhow::Result<()> {
    let interrupt = Interrupt::new();
    interrupt.install()?;
    let mut app = App::new(config, interrupt);

    match mode {
        Mode::Menu => app.menu_loop().await,
        Mode::Monitor => app.live().await,
        Mode::Report => app.generate_report().await.map(|_| ()),
        Mode::Info => {
            app.show_info().await;
            menu::pause("\nPress Enter to exit...")?;
            Ok(())
        }
        Mode::Json => {
            println!("{}", app.json().await?);
            Ok(())
        }
    }
}

pub async fn run(mode: Mode, config: AppConfig) -> anyhow::Result<()> {
    info!("Starting sysmon in {:?} mode", mode);

    match dispatch(mode, config).await {
        Ok(_) => info!("Application completed successfully"),
        Err(e) => {
            error!("Application error: {e:#}");
            // Print chain of error causes
            let mut source = e.source();
            while let Some(e) = source {
                error!("Caused by: {e}");
                source = e.source();
            }
            return Err(e).context("Application failed to run");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.monitor.cpu_sample_ms = 100;
        config.monitor.per_core_sample_ms = 50;
        config.processes.count = 5;
        config.report.directory = dir.to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_capture_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(quick_config(dir.path()), Interrupt::new());

        app.capture().await.unwrap();
        app.capture().await.unwrap();

        assert_eq!(app.history().cpu.len(), 2);
        assert_eq!(app.history().memory.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let interrupt = Interrupt::new();
        let mut app = App::new(quick_config(dir.path()), interrupt.clone());

        let path = app.generate_report().await.unwrap();

        assert!(path.starts_with(dir.path()));
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.starts_with("system_report_"));
        assert!(name.ends_with(".txt"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("TOP PROCESSES BY CPU USAGE"));
        assert!(!interrupt.is_guarded());
    }

    #[tokio::test]
    async fn test_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(quick_config(dir.path()), Interrupt::new());

        let json = app.json().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["snapshot"]["cpu"]["percent"].is_number());
        assert!(value["issues"].is_array());
    }

    #[tokio::test]
    async fn test_exit_choice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(quick_config(dir.path()), Interrupt::new());
        assert!(!app.handle(MenuChoice::Exit).await.unwrap());
        assert_eq!(app.run_choice(MenuChoice::Exit).await, Outcome::Exit);
    }

    #[tokio::test]
    async fn test_failed_report_keeps_menu_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quick_config(dir.path());
        config.report.directory = dir.path().join("missing").join("reports");
        let interrupt = Interrupt::new();
        let mut app = App::new(config, interrupt.clone());

        assert!(app.handle(MenuChoice::Report).await.is_err());
        assert_eq!(app.run_choice(MenuChoice::Report).await, Outcome::Failed);
        assert!(!interrupt.is_guarded());
        assert!(!interrupt.is_requested());
    }
}
