use anyhow::{Context, Result};
use config::{Config, File};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::MonitorError;
use crate::models::AllowedResources;

pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

fn default_interval() -> u64 {
    2
}

fn default_cpu_sample_ms() -> u64 {
    1000
}

fn default_per_core_sample_ms() -> u64 {
    100
}

fn default_process_interval() -> u64 {
    1
}

fn default_process_count() -> usize {
    15
}

fn default_command_width() -> usize {
    30
}

fn default_report_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// INI has no arrays, so allow-lists are written as `a, b, c`.
fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value
        .split(',')
        .map(|item| item.trim().trim_matches('"'))
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect())
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    /// Seconds between live-monitor refreshes.
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_cpu_sample_ms")]
    pub cpu_sample_ms: u64,
    #[serde(default = "default_per_core_sample_ms")]
    pub per_core_sample_ms: u64,
    /// Seconds between single-process monitor refreshes.
    #[serde(default = "default_process_interval")]
    pub process_interval: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProcessesConfig {
    #[serde(default = "default_process_count")]
    pub count: usize,
    #[serde(default = "default_command_width")]
    pub command_width: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_report_directory")]
    pub directory: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ResourcesConfig {
    #[serde(default, deserialize_with = "deserialize_list")]
    pub disks: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub networks: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub mount_points: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(alias = "MONITOR", default)]
    pub monitor: MonitorConfig,
    #[serde(alias = "PROCESSES", default)]
    pub processes: ProcessesConfig,
    #[serde(alias = "REPORT", default)]
    pub report: ReportConfig,
    #[serde(alias = "RESOURCES", default)]
    pub resources: ResourcesConfig,
    #[serde(alias = "LOGGING", default)]
    pub logging: LoggingConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            cpu_sample_ms: default_cpu_sample_ms(),
            per_core_sample_ms: default_per_core_sample_ms(),
            process_interval: default_process_interval(),
        }
    }
}

impl Default for ProcessesConfig {
    fn default() -> Self {
        Self {
            count: default_process_count(),
            command_width: default_command_width(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            directory: default_report_directory(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            processes: ProcessesConfig::default(),
            report: ReportConfig::default(),
            resources: ResourcesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }

    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }

    pub fn per_core_window(&self) -> Duration {
        Duration::from_millis(self.per_core_sample_ms)
    }

    pub fn process_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.process_interval.max(1))
    }
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_FILE)
    }

    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        if !config_path.exists() {
            debug!(
                "No configuration at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::from_file(config_path)
    }

    pub fn get_log_level(&self) -> LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }

    pub fn allowed_resources(&self) -> AllowedResources {
        AllowedResources {
            disks: self.resources.disks.clone(),
            networks: self.resources.networks.clone(),
            mount_points: self.resources.mount_points.clone(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        debug!("Loading configuration from {}", config_path.display());

        let config = Config::builder()
            .add_source(File::from(config_path).format(config::FileFormat::Ini))
            .build()
            .context(format!("Failed to load config from {}", config_path.display()))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize config")?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Rejects settings that would leave a screen empty.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.processes.count == 0 {
            return Err(MonitorError::config("[PROCESSES] count must be at least 1"));
        }
        if self.processes.command_width == 0 {
            return Err(MonitorError::config(
                "[PROCESSES] command_width must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_path = path.as_ref();

        let mut config_str = String::new();

        config_str.push_str(&format!(
            "[MONITOR]\ninterval = {}\ncpu_sample_ms = {}\nper_core_sample_ms = {}\nprocess_interval = {}\n\n",
            self.monitor.interval,
            self.monitor.cpu_sample_ms,
            self.monitor.per_core_sample_ms,
            self.monitor.process_interval
        ));

        config_str.push_str(&format!(
            "[PROCESSES]\ncount = {}\ncommand_width = {}\n\n",
            self.processes.count, self.processes.command_width
        ));

        config_str.push_str(&format!(
            "[REPORT]\ndirectory = {}\n\n",
            self.report.directory.display()
        ));

        config_str.push_str(&format!("[LOGGING]\nlevel = {}\n\n", self.logging.level));

        // Empty lists are left out so they read back as "everything"
        config_str.push_str("[RESOURCES]\n");
        let lists = [
            ("disks", &self.resources.disks),
            ("networks", &self.resources.networks),
            ("mount_points", &self.resources.mount_points),
        ];
        for (key, values) in lists {
            if !values.is_empty() {
                config_str.push_str(&format!("{} = \"{}\"\n", key, values.join(", ")));
            }
        }

        fs::write(config_path, config_str)
            .context(format!("Failed to save config to {}", config_path.display()))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ini_file(content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.monitor.interval, 2);
        assert_eq!(config.monitor.cpu_sample_ms, 1000);
        assert_eq!(config.monitor.per_core_sample_ms, 100);
        assert_eq!(config.processes.count, 15);
        assert_eq!(config.processes.command_width, 30);
        assert_eq!(config.report.directory, PathBuf::from("."));
        assert_eq!(config.get_log_level(), LevelFilter::Warn);
        assert!(config.resources.disks.is_empty());
    }

    #[test]
    fn test_from_file() {
        let temp_file = ini_file(
            "[MONITOR]\ninterval = 5\ncpu_sample_ms = 500\nper_core_sample_ms = 50\n\n[PROCESSES]\ncount = 10\ncommand_width = 40\n\n[LOGGING]\nlevel = debug\n",
        );

        let config = AppConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(config.monitor.interval, 5);
        assert_eq!(config.monitor.cpu_sample_ms, 500);
        assert_eq!(config.monitor.per_core_sample_ms, 50);
        assert_eq!(config.monitor.process_interval, 1);
        assert_eq!(config.processes.count, 10);
        assert_eq!(config.processes.command_width, 40);
        assert_eq!(config.get_log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_resource_lists() {
        let temp_file = ini_file(
            "[RESOURCES]\ndisks = \"sda, nvme0n1\"\nnetworks = eth0\nmount_points = \"/, /home\"\n",
        );

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        let allowed = config.allowed_resources();

        assert_eq!(allowed.disks, vec!["sda", "nvme0n1"]);
        assert_eq!(allowed.networks, vec!["eth0"]);
        assert_eq!(allowed.mount_points, vec!["/", "/home"]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.ini")).unwrap();
        assert_eq!(config.monitor.interval, 2);
        assert_eq!(config.processes.count, 15);
    }

    #[test]
    fn test_save_config() {
        let mut config = AppConfig::default();
        config.monitor.interval = 7;
        config.monitor.cpu_sample_ms = 250;
        config.processes.count = 20;
        config.report.directory = PathBuf::from("/tmp/reports");
        config.logging.level = "error".to_string();
        config.resources.disks = vec!["sda".to_string(), "sdb".to_string()];

        let temp_file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let config_path = temp_file.path();

        config.save(config_path).unwrap();

        let loaded_config = AppConfig::from_file(config_path).unwrap();

        assert_eq!(loaded_config.monitor.interval, 7);
        assert_eq!(loaded_config.monitor.cpu_sample_ms, 250);
        assert_eq!(loaded_config.processes.count, 20);
        assert_eq!(loaded_config.report.directory, PathBuf::from("/tmp/reports"));
        assert_eq!(loaded_config.get_log_level(), LevelFilter::Error);
        assert_eq!(loaded_config.resources.disks, vec!["sda", "sdb"]);
        assert!(loaded_config.resources.networks.is_empty());
    }

    #[test]
    fn test_zero_process_count_is_rejected() {
        let temp_file = ini_file("[PROCESSES]\ncount = 0\n");
        let err = AppConfig::from_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("count must be at least 1"));
    }

    #[test]
    fn test_invalid_log_level_falls_back_to_info() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert_eq!(config.get_log_level(), LevelFilter::Info);
    }
}
