/*!
# Angle Sweeper Application

Streams the cosine and sine of every integer degree of a rotation, one
tab-separated line per degree, forever:

```text
1.000000	0.000000	1
0.999848	0.017452	1
...
```

## Features

- Standard output or serial port channel (9600 baud by default)
- Fixed, locale-independent float formatting
- Optional sweep limit and baud-rate pacing for non-serial channels
- Graceful shutdown on Ctrl+C

## Usage

### Stream to stdout using `anglesweeper.toml` (or defaults)
```bash
anglesweeper
```

### Stream to a serial device
```bash
anglesweeper run --port /dev/ttyUSB0 --baud 9600
```

### Capture two sweeps
```bash
anglesweeper run --sweeps 2 > sweep.tsv
```
*/

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use clap::{Parser, Subcommand};
use tracing::{error, info};

mod channel;
mod config;
mod sweeper;

use channel::Channel;
use config::AppConfig;
use sweeper::AngleSweeper;

#[derive(Parser)]
#[command(name = "anglesweeper")]
#[command(about = "Stream cos/sin of every degree of a rotation as tab-separated lines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "anglesweeper.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start sweeping, overriding values from the configuration file
    Run {
        /// Serial device to write to (stdout when omitted)
        #[arg(short, long)]
        port: Option<String>,

        /// Serial baud rate
        #[arg(short, long)]
        baud: Option<u32>,

        /// Stop after this many complete sweeps
        #[arg(short, long)]
        sweeps: Option<u64>,

        /// Fractional digits for cos/sin
        #[arg(long)]
        precision: Option<usize>,

        /// Throttle a non-serial channel to the baud rate
        #[arg(long)]
        pace: bool,
    },

    /// Generate configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "anglesweeper.toml")]
        output: PathBuf,
    },

    /// List serial ports available on this host
    ListPorts,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr to keep stdout clean for sample lines
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Run { port, baud, sweeps, precision, pace }) => {
            let mut config = AppConfig::load_or_default(&cli.config)?;
            if port.is_some() {
                config.channel.serial_port = port;
            }
            if let Some(baud) = baud {
                config.channel.baud_rate = baud;
            }
            if sweeps.is_some() {
                config.sweeper.sweep_limit = sweeps;
            }
            if let Some(precision) = precision {
                config.sweeper.precision = precision;
            }
            config.sweeper.pace_to_baud |= pace;
            config.validate()?;

            run_sweeper(config)
        }

        Some(Commands::Config { output }) => generate_config_file(output),

        Some(Commands::ListPorts) => list_serial_ports(),

        None => {
            let config = AppConfig::load_or_default(&cli.config)?;
            run_sweeper(config)
        }
    }
}

/// Open the channel once, then sweep until stopped
fn run_sweeper(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let format = config.sweeper.sample_format()?;

    let channel = match Channel::open(&config.channel) {
        Ok(channel) => channel,
        Err(e) => {
            error!("❌ Failed to acquire output channel: {}", e);
            return Err(e.into());
        }
    };
    info!("🚀 Sweeping to {} (shared v{})", channel.describe(), shared::VERSION);

    let pace = config.sweeper.pace_to_baud && !channel.is_serial();
    let mut sweeper = AngleSweeper::new(channel, format)
        .with_sweep_limit(config.sweeper.sweep_limit)
        .with_stats_interval(config.sweeper.stats_interval_sweeps);
    if pace {
        info!("⏱️ Pacing output to {} baud", config.channel.baud_rate);
        sweeper = sweeper.with_pacing(config.channel.baud_rate);
    }

    // Set up Ctrl+C handler
    let running = sweeper.get_running_flag();
    ctrlc::set_handler(move || {
        eprintln!("\n🛑 Received Ctrl+C, shutting down gracefully...");
        running.store(false, Ordering::SeqCst);
    })?;

    match sweeper.run() {
        Ok(reason) => {
            info!("✅ Sweeper stopped: {:?}", reason);
            Ok(())
        }
        Err(e) => {
            error!("Sweep failed: {}", e);
            Err(format!("Sweep failed: {}", e).into())
        }
    }
}

/// Generate a default configuration file
fn generate_config_file(output_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::new();
    config.save_to_file(&output_path)?;

    println!("✅ Generated configuration file: {}", output_path.display());
    println!("📝 Edit the file to customize settings, then run:");
    println!("   anglesweeper --config {}", output_path.display());

    Ok(())
}

/// Print the serial ports that can be passed to `run --port`
fn list_serial_ports() -> Result<(), Box<dyn std::error::Error>> {
    let ports = channel::list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}", port);
    }
    Ok(())
}
