use clap::Parser;
use env_logger::{Builder, WriteStyle};
use log::error;
use std::path::PathBuf;
use sysmon::config::{AppConfig, DEFAULT_CONFIG_FILE};
use sysmon::Mode;

#[derive(Parser)]
#[command(name = "sysmon", version, about = "Advanced System Monitor")]
struct Args {
    /// Start live monitoring immediately
    #[arg(short, long)]
    monitor: bool,
    /// Generate a report immediately
    #[arg(short, long)]
    report: bool,
    /// Show system information and exit
    #[arg(short, long)]
    info: bool,
    /// Print one snapshot and its issues as JSON
    #[arg(long)]
    json: bool,
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn mode(&self) -> Mode {
        if self.monitor {
            Mode::Monitor
        } else if self.report {
            Mode::Report
        } else if self.info {
            Mode::Info
        } else if self.json {
            Mode::Json
        } else {
            Mode::Menu
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration first (without logging)
    let config = AppConfig::load(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {:#}", e);
        // Fall back to default configuration
        AppConfig::default()
    });

    // Initialise logger with a configured log level
    Builder::new()
        .filter_level(config.get_log_level())
        .write_style(WriteStyle::Auto)
        .format_timestamp_secs()
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = sysmon::run(args.mode(), config).await {
        error!("Application error: {}", e);
        return Err(e);
    }
    Ok(())
}
