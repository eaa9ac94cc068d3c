//! usbsht
//!
//! Command-line tool for the USB-SHT temperature/humidity sensor. Runs one
//! operation against the attached device and prints a single line.

use anyhow::{Context, Result, bail};
use clap::Parser;
use common::setup_logging;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};
use usbsht::config::{self, SensorConfig};
use usbsht::{Command, DeviceSession, RusbProvider};

#[derive(Parser, Debug)]
#[command(name = "usbsht")]
#[command(
    author,
    version,
    about = "USB-SHT - Read temperature and humidity from a USB SHT1x sensor"
)]
#[command(long_about = "
Host tool for the USB-SHT sensor: an SHT1x temperature/humidity sensor behind
a V-USB firmware answering vendor control requests.

EXAMPLES:
    # Read the temperature
    usbsht temp

    # Relative humidity and dew point
    usbsht hum
    usbsht dew

    # Switch the LED and read it back
    usbsht on
    usbsht status

    # Reproducible communication test
    usbsht echo --echo-count 500 --seed 42

CONFIGURATION:
    The tool looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usbsht/config.toml
    3. /etc/usbsht/config.toml
    4. Built-in defaults
")]
struct Args {
    /// Operation to run
    #[arg(value_enum, required_unless_present = "save_config")]
    command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// USB vendor ID (e.g. 0x16C0)
    #[arg(long, value_name = "HEX")]
    vendor_id: Option<String>,

    /// USB product ID (e.g. 0x05DC)
    #[arg(long, value_name = "HEX")]
    product_id: Option<String>,

    /// Number of echo transfers for the echo test
    #[arg(long, value_name = "N")]
    echo_count: Option<u32>,

    /// Seed for the echo test payloads
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = SensorConfig::default();
        let path = SensorConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = match args.config.as_deref() {
        Some(path) => config::load_config(path),
        None => SensorConfig::load_or_default(),
    }
    .context("Failed to load configuration")?;

    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    setup_logging(log_level).context("Failed to setup logging")?;

    debug!("usbsht v{}", env!("CARGO_PKG_VERSION"));
    let config_path = match args.config.as_deref() {
        Some(path) => Some(config::expand_path(path)),
        None => SensorConfig::find_path(),
    };
    match config_path {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => debug!("No configuration file found, using defaults"),
    }

    let Some(command) = args.command else {
        bail!("Missing command");
    };

    let vendor_id = match args.vendor_id.as_deref() {
        Some(id) => config::parse_hex_id(id, "VID")?,
        None => config.vendor_id()?,
    };
    let product_id = match args.product_id.as_deref() {
        Some(id) => config::parse_hex_id(id, "PID")?,
        None => config.product_id()?,
    };
    let echo_count = args.echo_count.unwrap_or(config.echo.iterations);

    let mut rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    };

    let provider = RusbProvider::new(config.timeout(), config.device.configuration)
        .context("Failed to initialize USB")?;
    let mut session = DeviceSession::open(&provider, vendor_id, product_id)
        .context("Failed to open USB-SHT device")?;

    info!("Running {:?}", command);
    let line = command
        .run(&mut session, echo_count, rng.as_mut())
        .with_context(|| format!("{:?} failed", command))?;
    println!("{}", line);

    session.close();
    Ok(())
}
