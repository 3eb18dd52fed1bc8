use chrono::{DateTime, Local, TimeZone};
use log::debug;
use std::cmp::Ordering;
use std::ffi::OsString;
use std::time::Instant;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, Users};

use crate::error::ProcessError;
use crate::models::percent_of;
use crate::models::system::{ProcessDetails, ProcessInfo, SortBy};

pub const DEFAULT_TOP_COUNT: usize = 15;

/// Anything that can enumerate the process table.
///
/// Entries that disappeared or could not be read come back as errors so the
/// caller decides what to do with them.
pub trait ProcessSource {
    fn processes(&self) -> Vec<Result<ProcessInfo, ProcessError>>;
}

/// Keeps the `n` busiest processes, descending by `sort_by`.
///
/// Failed entries are skipped. The sort is stable, so ties stay in enumeration order.
pub fn rank<I>(entries: I, n: usize, sort_by: SortBy) -> Vec<ProcessInfo>
where
    I: IntoIterator<Item = Result<ProcessInfo, ProcessError>>,
{
    let mut processes: Vec<ProcessInfo> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(process) => Some(process),
            Err(e) => {
                debug!("Skipping process: {}", e);
                None
            }
        })
        .collect();

    processes.sort_by(|a, b| {
        b.metric(sort_by)
            .partial_cmp(&a.metric(sort_by))
            .unwrap_or(Ordering::Equal)
    });
    processes.truncate(n);
    processes
}

/// Shortens a command line to `width` characters, marking the cut with "...".
pub fn truncate_command(command: &str, width: usize) -> String {
    if command.chars().count() > width {
        let cut: String = command.chars().take(width).collect();
        format!("{}...", cut)
    } else {
        command.to_string()
    }
}

fn join_command(cmd: &[OsString]) -> String {
    cmd.iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn local_time(secs: u64) -> Option<DateTime<Local>> {
    if secs == 0 {
        return None;
    }
    Local.timestamp_opt(secs as i64, 0).single()
}

/// Process table sampler backed by sysinfo.
///
/// CPU shares need two refreshes; [`ProcessSampler::refresh`] performs both with
/// the minimum update interval in between.
pub struct ProcessSampler {
    sys: System,
    users: Users,
    command_width: usize,
}

impl ProcessSampler {
    pub fn new(command_width: usize) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            sys,
            users: Users::new_with_refreshed_list(),
            command_width,
        }
    }

    pub async fn refresh(&mut self) {
        let start = Instant::now();
        self.refresh_all_processes();
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        self.refresh_all_processes();
        self.sys.refresh_memory();
        self.users = Users::new_with_refreshed_list();
        debug!(
            "process refresh took: {} ms",
            start.elapsed().as_millis()
        );
    }

    fn refresh_all_processes(&mut self) {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
    }

    /// The `n` top processes by CPU or memory share.
    pub async fn top(&mut self, n: usize, sort_by: SortBy) -> Vec<ProcessInfo> {
        self.refresh().await;
        rank(self.processes(), n, sort_by)
    }

    /// Number of processes seen by the last refresh.
    pub fn count(&self) -> usize {
        self.sys.processes().len()
    }

    pub fn name_of(&self, pid: u32) -> Option<String> {
        self.sys
            .process(Pid::from_u32(pid))
            .map(|process| process.name().to_string_lossy().to_string())
    }

    fn user_of(&self, process: &Process) -> String {
        process
            .user_id()
            .and_then(|uid| self.users.get_user_by_id(uid))
            .map(|user| user.name().to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    fn to_info(&self, pid: Pid, process: &Process) -> Result<ProcessInfo, ProcessError> {
        let pid = pid.as_u32();
        if matches!(process.status(), ProcessStatus::Dead) {
            return Err(ProcessError::Vanished(pid));
        }
        let name = process.name().to_string_lossy().to_string();
        if name.is_empty() {
            return Err(ProcessError::AccessDenied(pid));
        }
        Ok(ProcessInfo {
            pid,
            name,
            user: self.user_of(process),
            status: process.status().to_string(),
            cpu_percent: process.cpu_usage(),
            memory_percent: percent_of(process.memory(), self.sys.total_memory()),
            created_at: local_time(process.start_time()),
            command_line: truncate_command(&join_command(process.cmd()), self.command_width),
        })
    }

    /// Fresh readings for a single PID, measured over `window`.
    pub async fn details(
        &mut self,
        pid: u32,
        window: std::time::Duration,
    ) -> Result<ProcessDetails, ProcessError> {
        let sys_pid = Pid::from_u32(pid);
        let targets = [sys_pid];
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&targets),
            true,
            ProcessRefreshKind::everything(),
        );
        tokio::time::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)).await;
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&targets),
            true,
            ProcessRefreshKind::everything(),
        );

        let process = self
            .sys
            .process(sys_pid)
            .ok_or(ProcessError::Vanished(pid))?;
        if matches!(process.status(), ProcessStatus::Dead | ProcessStatus::Zombie) {
            return Err(ProcessError::Vanished(pid));
        }
        let io = process.disk_usage();
        Ok(ProcessDetails {
            pid,
            name: process.name().to_string_lossy().to_string(),
            status: process.status().to_string(),
            cpu_percent: process.cpu_usage(),
            memory_percent: percent_of(process.memory(), self.sys.total_memory()),
            memory_rss: process.memory(),
            created_at: local_time(process.start_time()),
            running_secs: process.run_time(),
            threads: process.tasks().map(|tasks| tasks.len()),
            io_read_bytes: io.total_read_bytes,
            io_written_bytes: io.total_written_bytes,
            command_line: join_command(process.cmd()),
        })
    }
}

impl ProcessSource for ProcessSampler {
    fn processes(&self) -> Vec<Result<ProcessInfo, ProcessError>> {
        // HashMap order is arbitrary; walk by PID so ties rank deterministically
        let mut pids: Vec<(&Pid, &Process)> = self.sys.processes().iter().collect();
        pids.sort_by_key(|(pid, _)| pid.as_u32());
        pids.into_iter()
            .map(|(pid, process)| self.to_info(*pid, process))
            .collect()
    }
}
