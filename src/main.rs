//! GridNav - grid navigation controller
//!
//! Usage:
//!
//! ```text
//! gridnav [config.toml] [--port <serial device>] [--telemetry <host:port>]
//! ```
//!
//! Without a config path, `gridnav.toml` in the working directory is used if
//! present, otherwise the built-in defaults.

use std::path::Path;

use gridnav::actuator::{ActuatorSink, SerialActuator};
use gridnav::telemetry::TcpMapFetcher;
use gridnav::{NavConfig, NavError, Result, Session};
use tracing::{error, info, warn};

/// Value following `flag` on the command line.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn load_config(args: &[String]) -> Result<NavConfig> {
    let mut config = if args.len() > 1 && !args[1].starts_with("--") {
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        NavConfig::load(config_path)?
    } else if Path::new("gridnav.toml").exists() {
        info!("Loading configuration from gridnav.toml");
        NavConfig::load(Path::new("gridnav.toml"))?
    } else {
        info!("Using default configuration");
        NavConfig::default()
    };

    if let Some(port) = flag_value(args, "--port") {
        info!("Using actuator port: {}", port);
        config.actuator.port = port;
    }
    if let Some(address) = flag_value(args, "--telemetry") {
        info!("Using map server: {}", address);
        config.telemetry.address = address;
    }

    config.validate()?;
    Ok(config)
}

fn open_actuator(config: &NavConfig) -> SerialActuator {
    match SerialActuator::open(
        &config.actuator.port,
        config.actuator.baud_rate,
        config.write_timeout(),
    ) {
        Ok(actuator) => actuator,
        Err(e) => {
            error!(
                "Failed to open actuator port {}: {}",
                config.actuator.port, e
            );
            SerialActuator::offline(&config.actuator.port)
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gridnav=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    let config = load_config(&args)?;

    info!("GridNav v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Actuator {} @ {} baud, map server {}{}",
        config.actuator.port,
        config.actuator.baud_rate,
        config.telemetry.address,
        config.telemetry.prefix
    );

    let actuator = open_actuator(&config);
    if !actuator.is_ready() {
        warn!("Running without actuator; commands will be reported as not sent");
    }
    let fetcher = TcpMapFetcher::new(
        &config.telemetry.address,
        &config.telemetry.prefix,
        config.fetch_timeout(),
    )?;

    let mut session = Session::start(&config, Box::new(fetcher), Box::new(actuator))?;

    let state = std::sync::Arc::clone(session.state());
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        state.signal_shutdown();
    })
    .map_err(|e| NavError::Config(format!("Error setting Ctrl-C handler: {}", e)))?;

    // Main thread: status reporting until shutdown
    let status_interval = config.status_interval();
    while !session.state().wait_timeout(status_interval) {
        if !session.is_running() {
            warn!("A worker thread exited unexpectedly");
            break;
        }

        let snapshot = session.map().snapshot();
        let stats = session.state().stats();
        info!(
            "Status: at {} facing {}, next {}, arrived={}, moves={}, reports={}, misses={}, sent={}, failed={}, no-route={}",
            snapshot.current,
            snapshot.facing,
            snapshot.next,
            session.state().has_arrived(),
            stats.moves,
            stats.reports_applied,
            stats.fetch_misses,
            stats.commands_sent,
            stats.send_failures,
            stats.no_route_cycles
        );
    }

    session.shutdown();
    info!("GridNav finished");
    Ok(())
}
