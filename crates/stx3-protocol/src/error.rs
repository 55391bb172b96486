//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when building or checking STX3 frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is too short to be valid.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Frame would not fit in the one-byte length field.
    #[error("frame too long: maximum {max} bytes, got {actual}")]
    FrameTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Length that was requested.
        actual: usize,
    },

    /// First byte is not the preamble.
    #[error("bad preamble: 0x{0:02X}")]
    BadPreamble(u8),

    /// The length byte disagrees with the number of bytes read.
    #[error("length mismatch: frame declares {declared} bytes, got {actual}")]
    LengthMismatch {
        /// Value of the length byte.
        declared: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// The response does not echo the request opcode.
    #[error("opcode mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    OpcodeMismatch {
        /// Opcode of the request.
        expected: u8,
        /// Opcode found in the response.
        actual: u8,
    },

    /// Trailing CRC does not match the frame contents.
    #[error("CRC mismatch: computed 0x{computed:04X}, frame carries 0x{received:04X}")]
    CrcMismatch {
        /// CRC computed over the frame body.
        computed: u16,
        /// CRC stored in the frame.
        received: u16,
    },

    /// Caller supplied a missing or wrongly sized payload.
    #[error("invalid payload: expected {expected} bytes, got {}", describe_payload_len(.actual))]
    PayloadInvalid {
        /// Required payload size.
        expected: usize,
        /// Size supplied, `None` for a missing payload.
        actual: Option<usize>,
    },

    /// Response opcode has no known decoding.
    #[error("unexpected response opcode: 0x{0:02X}")]
    UnexpectedResponse(u8),
}

fn describe_payload_len(actual: &Option<usize>) -> String {
    match actual {
        Some(len) => format!("{len} bytes"),
        None => "no payload".to_string(),
    }
}

impl ProtocolError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::CrcMismatch { .. } => ErrorKind::CrcMismatch,
            ProtocolError::PayloadInvalid { .. } | ProtocolError::FrameTooLong { .. } => {
                ErrorKind::PayloadInvalid
            }
            ProtocolError::FrameTooShort { .. }
            | ProtocolError::BadPreamble(_)
            | ProtocolError::LengthMismatch { .. }
            | ProtocolError::OpcodeMismatch { .. }
            | ProtocolError::UnexpectedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}

/// Coarse failure classes shared by the protocol and driver layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport open, write or read failed.
    Io,
    /// Checksum did not match.
    CrcMismatch,
    /// Wrong preamble, length or echoed opcode.
    MalformedResponse,
    /// Caller supplied a bad payload.
    PayloadInvalid,
    /// Configuration read back differs from what was written.
    ConfigMismatch,
    /// The caller's deadline expired.
    DeadlineExceeded,
    /// The caller cancelled the operation.
    Cancelled,
    /// Driver configuration is invalid.
    Configuration,
}

impl ErrorKind {
    /// Short lowercase label, used for metric labels and diagnostics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Io => "io",
            ErrorKind::CrcMismatch => "crc_mismatch",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::PayloadInvalid => "payload_invalid",
            ErrorKind::ConfigMismatch => "config_mismatch",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
