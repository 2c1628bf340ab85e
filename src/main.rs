//! Sensor Snapshots CLI
//!
//! Reconstruct fleet-wide air quality snapshots from the command line.
//!
//! Usage:
//!     sensor-snapshots snapshots --until 2024-01-01T00:00:00Z --segments 12
//!     sensor-snapshots devices --url http://localhost:8080
//!     sensor-snapshots guiding

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use sensor_snapshots::adapters::{FileRegistry, FileStore, HttpRegistry, HttpStore};
use sensor_snapshots::config::{expand_path, Settings, SourceSettings};
use sensor_snapshots::core::{parse_instant, FallbackPolicy, Reading};
use sensor_snapshots::ports::{DeviceRegistry, MeasurementStore};
use sensor_snapshots::service::{ServiceError, SnapshotRequest, SnapshotService};

/// Sensor Snapshots - synchronized readings for a sensor fleet
#[derive(Parser)]
#[command(name = "sensor-snapshots")]
#[command(version)]
#[command(about = "Reconstruct evenly spaced fleet snapshots from raw sensor readings", long_about = None)]
struct Cli {
    /// Settings file (defaults to <config dir>/sensor-snapshots/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Device list JSON file (overrides the configured source)
    #[arg(long, global = true, requires = "records")]
    devices: Option<String>,

    /// Record JSON file (overrides the configured source)
    #[arg(long, global = true, requires = "devices")]
    records: Option<String>,

    /// Registry/store API root (overrides the configured source)
    #[arg(long, global = true, conflicts_with_all = ["devices", "records"])]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct snapshots for a window ending now
    Snapshots {
        /// Earliest instant of the window (ISO-8601)
        #[arg(long)]
        until: Option<String>,

        /// Number of snapshots to produce
        #[arg(long, allow_hyphen_values = true)]
        segments: Option<String>,

        /// Pin the window end instead of using the current time (ISO-8601)
        #[arg(long)]
        now: Option<String>,

        /// Behavior for devices without records: omit | zero_baseline
        #[arg(long)]
        fallback: Option<FallbackPolicy>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List every registered device
    Devices,

    /// Show the recommended guiding values
    Guiding,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_source(cli: &Cli, settings: &Settings) -> SourceSettings {
    if let Some(url) = &cli.url {
        let (page_size, timeout_secs) = match &settings.source {
            SourceSettings::Http {
                page_size,
                timeout_secs,
                ..
            } => (*page_size, *timeout_secs),
            SourceSettings::File { .. } => (50, 30),
        };
        return SourceSettings::Http {
            base_url: url.clone(),
            page_size,
            timeout_secs,
        };
    }
    if let (Some(devices), Some(records)) = (&cli.devices, &cli.records) {
        return SourceSettings::File {
            devices: devices.clone(),
            records: records.clone(),
        };
    }
    settings.source.clone()
}

fn open_sources(
    source: &SourceSettings,
) -> Result<(Box<dyn DeviceRegistry>, Box<dyn MeasurementStore>), ServiceError> {
    match source {
        SourceSettings::File { devices, records } => Ok((
            Box::new(FileRegistry::new(expand_path(devices))),
            Box::new(FileStore::new(expand_path(records))),
        )),
        SourceSettings::Http {
            base_url,
            page_size,
            timeout_secs,
        } => {
            let timeout = Duration::from_secs(*timeout_secs);
            let registry = HttpRegistry::new(base_url, timeout)?.page_size(*page_size);
            let store = HttpStore::new(base_url, timeout)?;
            Ok((Box::new(registry), Box::new(store)))
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> ExitCode {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match text {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &ServiceError) -> ExitCode {
    error!(status = err.status_code(), "{}", err);
    match serde_json::to_string(&err.body()) {
        Ok(body) => eprintln!("{}", body),
        Err(_) => eprintln!("Error: {}", err),
    }
    if err.is_client_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_snapshots(
    service: &SnapshotService<Box<dyn DeviceRegistry>, Box<dyn MeasurementStore>>,
    until: Option<&str>,
    segments: Option<&str>,
    now: Option<&str>,
    pretty: bool,
) -> ExitCode {
    let result = SnapshotRequest::parse(until, segments)
        .map_err(ServiceError::from)
        .and_then(|request| match now {
            Some(now) => {
                let now = parse_instant(now)?;
                service.reconstruct_at(&request, now)
            }
            None => service.reconstruct(&request),
        });

    match result {
        Ok(snapshots) => print_json(&snapshots, pretty),
        Err(e) => report(&e),
    }
}

fn cmd_devices(service: &SnapshotService<Box<dyn DeviceRegistry>, Box<dyn MeasurementStore>>) -> ExitCode {
    match service.devices() {
        Ok(devices) => print_json(&devices, true),
        Err(e) => report(&e),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load_or_default(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            init_logging("info");
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.logging.level);

    if let Commands::Guiding = cli.command {
        return print_json(&Reading::guiding(), true);
    }

    let mut align = settings.alignment.to_align_config();
    if let Commands::Snapshots {
        fallback: Some(fallback),
        ..
    } = &cli.command
    {
        align = align.with_fallback(*fallback);
    }

    let (registry, store) = match open_sources(&resolve_source(&cli, &settings)) {
        Ok(sources) => sources,
        Err(e) => return report(&e),
    };
    let service = SnapshotService::new(registry, store, align);

    match &cli.command {
        Commands::Snapshots {
            until,
            segments,
            now,
            pretty,
            ..
        } => cmd_snapshots(
            &service,
            until.as_deref(),
            segments.as_deref(),
            now.as_deref(),
            *pretty,
        ),
        Commands::Devices => cmd_devices(&service),
        Commands::Guiding => print_json(&Reading::guiding(), true),
    }
}
