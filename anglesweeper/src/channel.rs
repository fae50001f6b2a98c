/*!
Output channel acquisition.

The channel is opened once at startup. Failing to open it is fatal: there is
no retry, the caller reports the error and exits.
*/

use std::io::{self, Write};
use std::time::Duration;

use serialport::SerialPort;
use shared::{Result, SharedError};
use tracing::info;

use crate::config::ChannelConfig;

/// Byte sink the sweeper writes to
pub enum Channel {
    Stdout(io::Stdout),
    Serial(Box<dyn SerialPort>),
}

impl Channel {
    /// Open the channel described by `config`
    pub fn open(config: &ChannelConfig) -> Result<Self> {
        match &config.serial_port {
            Some(path) => Self::open_serial(path, config.baud_rate, config.timeout_ms),
            None => {
                info!("📺 Writing samples to standard output");
                Ok(Self::Stdout(io::stdout()))
            }
        }
    }

    fn open_serial(path: &str, baud_rate: u32, timeout_ms: u64) -> Result<Self> {
        info!("🔌 Opening serial port {} at {} baud", path, baud_rate);

        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_millis(timeout_ms))
            .open()
            .map_err(|e| SharedError::channel(format!("failed to open serial port {}: {}", path, e)))?;

        info!("✅ Serial port opened");
        Ok(Self::Serial(port))
    }

    /// Serial channels are paced by the line rate itself
    pub fn is_serial(&self) -> bool {
        matches!(self, Self::Serial(_))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Stdout(_) => "stdout".to_string(),
            Self::Serial(port) => port.name().unwrap_or_else(|| "serial".to_string()),
        }
    }
}

impl Write for Channel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::Serial(port) => port.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::Serial(port) => port.flush(),
        }
    }
}

/// Names of the serial ports present on this host
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports()
        .map_err(|e| SharedError::channel(format!("failed to enumerate serial ports: {}", e)))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
