//! Error types for the driver crate.

use std::io;

use stx3_protocol::{ErrorKind, ModuleConfig, ProtocolError};
use thiserror::Error;

/// Errors that can occur while driving the transmitter.
#[derive(Debug, Error)]
pub enum Stx3Error {
    /// Transport or power-control I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The serial device could not be opened or configured.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// A frame failed validation or decoding.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Configuration read back from the module differs from what was written.
    #[error("configuration mismatch: wrote {expected}, module reports {actual}")]
    ConfigMismatch {
        /// Configuration that was written.
        expected: ModuleConfig,
        /// Configuration the module reported.
        actual: ModuleConfig,
    },

    /// The caller's deadline passed before the operation completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Driver configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Driver configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Stx3Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Stx3Error::Io(_) | Stx3Error::Serial(_) => ErrorKind::Io,
            Stx3Error::Protocol(e) => e.kind(),
            Stx3Error::ConfigMismatch { .. } => ErrorKind::ConfigMismatch,
            Stx3Error::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            Stx3Error::Cancelled => ErrorKind::Cancelled,
            Stx3Error::Config(_) | Stx3Error::Yaml(_) => ErrorKind::Configuration,
        }
    }

    /// True for deadline expiry and cancellation, which end retrying at once.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Stx3Error::DeadlineExceeded | Stx3Error::Cancelled)
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, Stx3Error>;
