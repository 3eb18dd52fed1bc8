use std::io;
use thiserror::Error;

/// Errors surfaced by the monitor to its callers.
///
/// Individual metrics that cannot be read are not errors; they show up as `None`
/// in the snapshot. Only the cases below reach the caller.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("OS metrics provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid PID: {0}")]
    InvalidPid(String),

    #[error("Process with PID {0} not found")]
    ProcessNotFound(u32),
}

/// Per-process failures hit while walking the process table. These are skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("process {0} vanished during sampling")]
    Vanished(u32),

    #[error("access denied to process {0}")]
    AccessDenied(u32),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    pub fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        MonitorError::ProviderUnavailable(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    pub fn invalid_pid<S: Into<String>>(msg: S) -> Self {
        MonitorError::InvalidPid(msg.into())
    }
}
