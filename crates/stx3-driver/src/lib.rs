//! Driver for the STX3 satellite transmitter module.
//!
//! The crate layers a retrying exchange policy and a stateful burst lifecycle
//! on top of the frame codec in [`stx3_protocol`]:
//!
//! - [`Transport`], [`PowerControl`] and [`Delay`] are the hardware
//!   boundaries, with [`SerialTransport`], [`SysfsGpio`] and [`ThreadDelay`]
//!   as the real implementations;
//! - [`ExchangeOrchestrator`] runs one request/response round trip with
//!   bounded retries, a power-cycle reset and one final attempt;
//! - [`BurstLifecycle`] is the public API: initialize, configure, start and
//!   abort bursts, query the burst state and read the serial number.
//!
//! # Example
//!
//! ```rust
//! use stx3_driver::testing::{RecordingDelay, RecordingPower, ScriptedTransport};
//! use stx3_driver::{BurstLifecycle, DriverConfig};
//!
//! let mut transport = ScriptedTransport::new();
//! transport.respond([0xAA, 0x09, 0x01, 0x12, 0x34, 0x56, 0x78, 0x7E, 0xC9]);
//!
//! let mut lifecycle = BurstLifecycle::from_config(
//!     transport,
//!     RecordingPower::default(),
//!     RecordingDelay::default(),
//!     &DriverConfig::default(),
//! );
//! assert_eq!(lifecycle.get_electronic_serial_number(), 0x1234_5678);
//! ```

mod config;
mod error;
mod exchange;
mod lifecycle;
mod power;
mod state;
mod timing;
mod transport;

pub mod testing;

pub use config::*;
pub use error::*;
pub use exchange::*;
pub use lifecycle::*;
pub use power::*;
pub use state::*;
pub use timing::*;
pub use transport::*;

pub use stx3_protocol::{Esn, ModuleConfig, ESN_UNAVAILABLE};
