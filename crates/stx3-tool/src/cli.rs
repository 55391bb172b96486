//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use stx3_driver::{CancelToken, Deadline, DriverConfig, Result};

use crate::payload::parse_u8;

/// Drive an STX3 satellite transmitter over a serial port.
#[derive(Debug, Parser)]
#[command(name = "stx3", version, about)]
pub struct Cli {
    /// YAML driver configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Serial device, overriding the configuration file.
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Baud rate, overriding the configuration file.
    #[arg(long, global = true)]
    pub baud: Option<u32>,

    /// Serial read timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Give up on the operation after this many milliseconds.
    #[arg(long, global = true)]
    pub deadline_ms: Option<u64>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a burst cycle with a payload of hex bytes.
    Burst {
        /// Payload bytes (`0a 1b ..`) or one hex string (`0a1b..`).
        #[arg(required = true, num_args = 1..)]
        bytes: Vec<String>,
    },

    /// Read the electronic serial number.
    Esn,

    /// Abort the burst cycle in progress.
    Abort,

    /// Power-cycle the module.
    Reset,

    /// Write a new configuration to the module.
    Configure {
        /// RF channel (0 = A, 1 = B, 2 = C, 3 = D).
        #[arg(value_parser = parse_u8)]
        channel: u8,
        /// Transmissions per burst cycle.
        #[arg(value_parser = parse_u8)]
        burst_attempts: u8,
        /// Minimum interval in 5 second units.
        #[arg(value_parser = parse_u8)]
        min_interval: u8,
        /// Maximum interval in 5 second units.
        #[arg(value_parser = parse_u8)]
        max_interval: u8,
    },

    /// Query the burst state.
    State,

    /// Read back the stored configuration.
    Status,

    /// Power on, configure and verify the module.
    Init,
}

impl Cli {
    /// Driver configuration from the file (or defaults) with flag overrides.
    pub fn driver_config(&self) -> Result<DriverConfig> {
        let mut config = match &self.config {
            Some(path) => DriverConfig::load(path)?,
            None => DriverConfig::default(),
        };
        if let Some(device) = &self.device {
            config.serial.device = device.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.serial.timeout_ms = timeout_ms;
        }
        config.validate()?;
        Ok(config)
    }

    /// Deadline for the operation, tied to `cancel`.
    pub fn deadline(&self, cancel: CancelToken) -> Deadline {
        let deadline = match self.deadline_ms {
            Some(ms) => Deadline::after(Duration::from_millis(ms)),
            None => Deadline::none(),
        };
        deadline.with_cancel(cancel)
    }
}
