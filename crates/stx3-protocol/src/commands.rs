//! Commands that can be sent to the transmitter.

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::{CommandFrame, FrameCodec};
use crate::types::ModuleConfig;

/// Commands that can be sent to the transmitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read back the stored configuration.
    QuerySetup,

    /// Write a new configuration.
    Setup(ModuleConfig),

    /// Start a burst cycle carrying `payload`.
    SendData {
        /// User data, normally [`DEFAULT_PAYLOAD_SIZE`] bytes.
        payload: Vec<u8>,
    },

    /// Read the number of bursts still scheduled.
    QueryBurstsRemaining,

    /// Abort the burst cycle in progress.
    AbortTransmission,

    /// Read the electronic serial number.
    QueryEsn,
}

impl Command {
    /// Build a send-data command, rejecting a missing or wrongly sized payload.
    pub fn send_data(payload: Option<&[u8]>, payload_len: usize) -> ProtocolResult<Self> {
        match payload {
            Some(data) if data.len() == payload_len => Ok(Command::SendData {
                payload: data.to_vec(),
            }),
            other => Err(ProtocolError::PayloadInvalid {
                expected: payload_len,
                actual: other.map(<[u8]>::len),
            }),
        }
    }

    /// Get the opcode for this command.
    pub fn opcode(&self) -> u8 {
        match self {
            Command::QuerySetup => OP_QUERY_SETUP,
            Command::Setup(_) => OP_SETUP,
            Command::SendData { .. } => OP_SEND_DATA,
            Command::QueryBurstsRemaining => OP_QUERY_BURSTS_REMAINING,
            Command::AbortTransmission => OP_ABORT_TRANSMISSION,
            Command::QueryEsn => OP_QUERY_ESN,
        }
    }

    /// Size of the response frame the module sends back.
    pub fn response_len(&self) -> usize {
        match self {
            Command::QuerySetup => RESP_SIZE_QUERY_SETUP,
            Command::Setup(_) => RESP_SIZE_SETUP,
            Command::SendData { .. } => RESP_SIZE_SEND_DATA,
            Command::QueryBurstsRemaining => RESP_SIZE_BURSTS_REMAINING,
            Command::AbortTransmission => RESP_SIZE_ABORT,
            Command::QueryEsn => RESP_SIZE_ESN,
        }
    }

    /// Short name used in logs and diagnostics.
    pub fn name(&self) -> &'static str {
        opcode_name(self.opcode())
    }

    /// Encode the command into a complete frame.
    pub fn encode(&self) -> ProtocolResult<CommandFrame> {
        match self {
            Command::Setup(config) => FrameCodec::build_command(OP_SETUP, &config.to_setup_payload()),
            Command::SendData { payload } => FrameCodec::build_command(OP_SEND_DATA, payload),
            other => FrameCodec::build_command(other.opcode(), &[]),
        }
    }
}

/// Short name of an opcode, `"unknown"` for opcodes this crate does not send.
pub fn opcode_name(opcode: u8) -> &'static str {
    match opcode {
        OP_QUERY_SETUP => "query_setup",
        OP_SETUP => "setup",
        OP_SEND_DATA => "send_data",
        OP_QUERY_BURSTS_REMAINING => "query_bursts_remaining",
        OP_ABORT_TRANSMISSION => "abort_transmission",
        OP_QUERY_ESN => "query_esn",
        _ => "unknown",
    }
}
