//! Responses from the transmitter.

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::ResponseFrame;
use crate::types::{Esn, ModuleConfig};

/// Decoded response received from the transmitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Stored configuration (response to a setup query).
    Configuration(ModuleConfig),

    /// Setup accepted.
    SetupAck,

    /// Payload accepted and a burst cycle started.
    SendDataAck,

    /// Bursts still scheduled in the current cycle.
    BurstsRemaining(u8),

    /// Burst cycle aborted.
    AbortAck,

    /// Electronic serial number.
    Esn(Esn),
}

impl Response {
    /// Opcode this response answers.
    pub fn opcode(&self) -> u8 {
        match self {
            Response::Configuration(_) => OP_QUERY_SETUP,
            Response::SetupAck => OP_SETUP,
            Response::SendDataAck => OP_SEND_DATA,
            Response::BurstsRemaining(_) => OP_QUERY_BURSTS_REMAINING,
            Response::AbortAck => OP_ABORT_TRANSMISSION,
            Response::Esn(_) => OP_QUERY_ESN,
        }
    }

    /// Decode a validated response frame by its echoed opcode.
    pub fn decode(frame: &ResponseFrame) -> ProtocolResult<Self> {
        let bytes = frame.as_bytes();

        match frame.opcode() {
            OP_QUERY_SETUP => {
                require_len(bytes, RESP_SIZE_QUERY_SETUP)?;
                Ok(Response::Configuration(ModuleConfig::from_frame(bytes)?))
            }

            OP_SETUP => Ok(Response::SetupAck),

            OP_SEND_DATA => Ok(Response::SendDataAck),

            OP_QUERY_BURSTS_REMAINING => {
                require_len(bytes, RESP_SIZE_BURSTS_REMAINING)?;
                Ok(Response::BurstsRemaining(bytes[BURSTS_REMAINING_OFFSET]))
            }

            OP_ABORT_TRANSMISSION => Ok(Response::AbortAck),

            OP_QUERY_ESN => {
                require_len(bytes, RESP_SIZE_ESN)?;
                let esn = Esn::from_be_slice(&bytes[ESN_OFFSET..]).ok_or(
                    ProtocolError::FrameTooShort {
                        expected: RESP_SIZE_ESN,
                        actual: bytes.len(),
                    },
                )?;
                Ok(Response::Esn(esn))
            }

            code => Err(ProtocolError::UnexpectedResponse(code)),
        }
    }
}

fn require_len(bytes: &[u8], expected: usize) -> ProtocolResult<()> {
    if bytes.len() < expected {
        return Err(ProtocolError::FrameTooShort {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}
