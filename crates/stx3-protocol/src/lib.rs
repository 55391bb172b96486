//! STX3 Simplex Transmitter UART Protocol
//!
//! This crate provides types and utilities for talking to an STX3 satellite
//! uplink transmitter over its UART. Every exchange is a single command frame
//! from the host followed by a single response frame of known length from the
//! module.
//!
//! # Frame Layout
//!
//! Commands and responses share one layout:
//!
//! ```text
//! +------+--------+--------+-------------------+--------+--------+
//! | 0xAA | length | opcode | payload[0..n]     | crc_lo | crc_hi |
//! +------+--------+--------+-------------------+--------+--------+
//! ```
//!
//! - `length` is the total frame size including preamble and CRC
//! - the CRC is CRC-16 (reflected CCITT, poly `0x8408`, init `0xFFFF`,
//!   final complement) over every byte before it, stored little-endian
//! - a response echoes the request opcode
//!
//! # Example
//!
//! ```rust
//! use stx3_protocol::{Command, FrameCodec, Response, ResponseFrame};
//!
//! let frame = Command::QueryEsn.encode().unwrap();
//! assert_eq!(frame.as_bytes(), &[0xAA, 0x05, 0x01, 0x50, 0xD5]);
//!
//! let raw = vec![0xAA, 0x09, 0x01, 0x12, 0x34, 0x56, 0x78, 0x7E, 0xC9];
//! let response = ResponseFrame::parse(raw, frame.opcode()).unwrap();
//! match Response::decode(&response).unwrap() {
//!     Response::Esn(esn) => assert_eq!(esn.value(), 0x1234_5678),
//!     other => panic!("unexpected response {other:?}"),
//! }
//! # assert!(FrameCodec::checksum(&[]) == 0);
//! ```

mod commands;
mod constants;
mod error;
mod frame;
mod responses;
mod types;

pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use responses::*;
pub use types::*;
