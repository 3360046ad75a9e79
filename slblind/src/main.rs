//! # SLBlind startup validator
//!
//! Loads the controller settings, validates them against the target board's
//! pin map and reports what the network stack, MQTT client and motor driver
//! would be handed. Any configuration error is fatal (exit code 1): the
//! controller must not come up with a partial configuration.
//!
//! # Usage
//!
//! ```bash
//! # Validate a settings file
//! slblind --config config/slblind.toml
//!
//! # Validate a firmware header instead
//! slblind --defines Config.h --platform d1_mini
//!
//! # Print the validated configuration as JSON
//! slblind --config config/slblind.toml --dump
//! ```

#![deny(warnings)]

use clap::Parser;
use serde::Serialize;
use slblind_common::config::read_source;
use slblind_common::consts::DEFAULT_CONFIG_PATH;
use slblind_common::prelude::*;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// SLBlind - startup configuration validator
#[derive(Parser, Debug)]
#[command(name = "slblind")]
#[command(version)]
#[command(about = "Validates SLBlind cover controller settings")]
#[command(long_about = None)]
struct Args {
    /// Path to the TOML settings file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Read `#define` settings from a firmware header instead of --config.
    #[arg(long, value_name = "FILE", conflicts_with = "defaults")]
    defines: Option<PathBuf>,

    /// Use the compiled-in defaults instead of --config.
    #[arg(long)]
    defaults: bool,

    /// Target board, overriding the settings (nodemcu, d1_mini).
    #[arg(short, long)]
    platform: Option<Platform>,

    /// Print the validated configuration as JSON (credentials redacted).
    #[arg(long)]
    dump: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

/// Validated view serialized by `--dump`.
#[derive(Serialize)]
struct Dump<'a> {
    platform: Platform,
    network: &'a NetworkConfig,
    broker: &'a BrokerConfig,
    blinds: &'a [BlindDeviceConfig],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("SLBlind startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let raw = read_settings(&args);
    setup_tracing(&args, raw.as_ref().ok().map(|r| r.log.level));
    let raw = raw?;

    info!("SLBlind v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut registry = match args.platform {
        Some(platform) => {
            info!("Platform overridden from CLI: {}", platform);
            ConfigRegistry::for_platform(raw, platform)
        }
        None => ConfigRegistry::new(raw),
    };
    registry.load()?;

    let network = registry.network_config()?;
    let broker = registry.broker_config()?;
    let blinds = registry.blind_devices()?;

    match network.static_ip() {
        Some(ip) => info!(
            "Wi-Fi '{}': static {} gw {} mask {}",
            network.ssid, ip.address, ip.gateway, ip.subnet
        ),
        None => info!("Wi-Fi '{}': DHCP", network.ssid),
    }
    info!(
        "MQTT broker {}:{} as '{}'{}",
        broker.host,
        broker.port,
        broker.client_id,
        if broker.has_credentials() { " (authenticated)" } else { "" }
    );
    for blind in blinds {
        info!("Blind '{}': motor pin {} ({})", blind.alias, blind.pin_alias, blind.gpio());
        for (kind, topic) in blind.topics.iter() {
            info!("  {:<13} {}", kind.suffix(), topic);
        }
    }

    if args.dump {
        let dump = Dump {
            platform: registry.platform(),
            network,
            broker,
            blinds,
        };
        println!("{}", serde_json::to_string_pretty(&dump)?);
    }

    info!("Configuration valid");
    Ok(())
}

/// Read raw settings from the source selected on the command line.
fn read_settings(args: &Args) -> Result<RawSettings, ConfigError> {
    if args.defaults {
        return Ok(RawSettings::default());
    }
    if let Some(header) = &args.defines {
        return RawSettings::from_defines(&read_source(header)?);
    }
    RawSettings::load(&args.config)
}

/// Setup tracing subscriber based on CLI arguments and the settings' log level.
fn setup_tracing(args: &Args, configured: Option<LogLevel>) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match configured.unwrap_or_default() {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}
