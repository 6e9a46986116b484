//! switchapid - switchapi port control plane daemon.
//!
//! Brings up the port table against the configured hardware adapter,
//! applies the initial port configurations and serves the C ABI until
//! interrupted.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use switchapi::config::DEFAULT_CONFIG_PATH;
use switchapi::port::ffi::{register_port_manager, unregister_port_manager};
use switchapi::{HardwareMode, PortManager, SwitchApiConfig};
use switchapi_pd::{MeterTable, NoopPd, SimulatedPd, SwitchPd};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    Text,
    Json,
}

/// switchapi port control plane daemon
#[derive(Parser, Debug)]
#[command(name = "switchapid")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Number of ports (overrides the config file)
    #[arg(long)]
    max_ports: Option<u32>,

    /// CPU port index (overrides the config file)
    #[arg(long)]
    cpu_port: Option<u32>,

    /// Hardware adapter (overrides the config file)
    #[arg(long, value_enum)]
    hardware: Option<HardwareMode>,

    /// Dump the port table after bring-up
    #[arg(long, value_enum)]
    dump: Option<DumpFormat>,

    /// Exit after bring-up instead of waiting for a signal
    #[arg(long)]
    oneshot: bool,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<SwitchApiConfig> {
    let mut config = SwitchApiConfig::load_or_default(&args.config)?;
    if let Some(max_ports) = args.max_ports {
        config.ports.max_ports = max_ports;
    }
    if let Some(cpu_port) = args.cpu_port {
        config.ports.cpu_port = cpu_port;
    }
    if let Some(mode) = args.hardware {
        config.hardware.mode = mode;
    }
    config.validate()?;
    Ok(config)
}

fn hardware_adapter(mode: HardwareMode) -> Arc<dyn SwitchPd> {
    match mode {
        HardwareMode::None => Arc::new(NoopPd::new()),
        HardwareMode::Simulated => Arc::new(SimulatedPd::new()),
    }
}

fn dump(manager: &PortManager, format: DumpFormat) -> anyhow::Result<()> {
    match format {
        DumpFormat::Text => manager.print_all()?,
        DumpFormat::Json => {
            let json = serde_json::to_string_pretty(&manager.snapshots())
                .context("failed to serialize port table")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn bring_up(config: &SwitchApiConfig, args: &Args) -> anyhow::Result<Arc<PortManager>> {
    let device = config.device.device_id;
    let manager = PortManager::new(
        config.port_manager_config(),
        hardware_adapter(config.hardware.mode),
        Arc::new(MeterTable::new()),
    )?;

    let report = manager.init(device)?;
    if report.hw_failures > 0 {
        warn!(
            failures = report.hw_failures,
            "port bring-up completed with hardware failures"
        );
    }

    for info in config.api_port_infos()? {
        manager
            .set(device, &info)
            .with_context(|| format!("failed to apply config for port {}", info.port_number))?;
    }
    info!(ports = config.port_entries.len(), "initial port configuration applied");

    if let Some(format) = args.dump {
        dump(&manager, format)?;
    }
    Ok(Arc::new(manager))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("--- Starting switchapid ---");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        device = config.device.device_id,
        max_ports = config.ports.max_ports,
        cpu_port = config.ports.cpu_port,
        hardware = ?config.hardware.mode,
        "configuration loaded"
    );

    let manager = match bring_up(&config, &args) {
        Ok(manager) => manager,
        Err(e) => {
            error!("Port bring-up failed: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    register_port_manager(Arc::clone(&manager));

    if !args.oneshot {
        info!("switchapid running, waiting for shutdown signal");
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Received shutdown signal");
    }

    unregister_port_manager();
    let status = manager.shutdown(config.device.device_id);
    info!(stats = ?manager.stats(), "switchapid stopped");

    match status {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Shutdown incomplete: {}", e);
            ExitCode::FAILURE
        }
    }
}
