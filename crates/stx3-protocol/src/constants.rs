//! Protocol constants
//!
//! Opcodes, frame sizes and field offsets used by the STX3 UART protocol.

// ============================================================================
// Framing
// ============================================================================

/// First byte of every frame in both directions.
pub const PREAMBLE: u8 = 0xAA;
/// Preamble + length + opcode.
pub const HEADER_SIZE: usize = 3;
/// Trailing CRC-16, little-endian.
pub const CRC_SIZE: usize = 2;
/// Smallest possible frame: header and CRC with no payload.
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CRC_SIZE;
/// The length field is a single byte.
pub const MAX_FRAME_SIZE: usize = u8::MAX as usize;

/// Offset of the length byte.
pub const LENGTH_OFFSET: usize = 1;
/// Offset of the opcode byte.
pub const OPCODE_OFFSET: usize = 2;
/// Offset of the first payload byte.
pub const PAYLOAD_OFFSET: usize = HEADER_SIZE;

/// Reflected CCITT polynomial used by the module firmware.
pub const CRC_POLY: u16 = 0x8408;
/// CRC accumulator seed.
pub const CRC_INIT: u16 = 0xFFFF;

// ============================================================================
// Opcodes (host → module, echoed by the module)
// ============================================================================

/// Transmit a user payload as a new burst.
pub const OP_SEND_DATA: u8 = 0x00;
/// Read the electronic serial number.
pub const OP_QUERY_ESN: u8 = 0x01;
/// Abort the burst cycle in progress.
pub const OP_ABORT_TRANSMISSION: u8 = 0x03;
/// Read the number of bursts still scheduled.
pub const OP_QUERY_BURSTS_REMAINING: u8 = 0x04;
/// Write the module configuration.
pub const OP_SETUP: u8 = 0x06;
/// Read back the stored module configuration.
pub const OP_QUERY_SETUP: u8 = 0x07;

// ============================================================================
// Response sizes (whole frame, bytes)
// ============================================================================

/// Response to [`OP_QUERY_SETUP`].
pub const RESP_SIZE_QUERY_SETUP: usize = 14;
/// Response to [`OP_SETUP`].
pub const RESP_SIZE_SETUP: usize = 5;
/// Response to [`OP_SEND_DATA`].
pub const RESP_SIZE_SEND_DATA: usize = 5;
/// Response to [`OP_QUERY_BURSTS_REMAINING`].
pub const RESP_SIZE_BURSTS_REMAINING: usize = 6;
/// Response to [`OP_ABORT_TRANSMISSION`].
pub const RESP_SIZE_ABORT: usize = 5;
/// Response to [`OP_QUERY_ESN`].
pub const RESP_SIZE_ESN: usize = 9;

// ============================================================================
// Field offsets (absolute frame offsets)
// ============================================================================

/// Reserved bytes preceding the configuration fields in setup frames.
pub const SETUP_RESERVED_SIZE: usize = 4;
/// RF channel (0 = A .. 3 = D).
pub const SETUP_CHANNEL_OFFSET: usize = 7;
/// Number of transmissions per burst cycle.
pub const SETUP_BURST_ATTEMPTS_OFFSET: usize = 8;
/// Minimum interval between bursts, in 5 second units.
pub const SETUP_MIN_INTERVAL_OFFSET: usize = 9;
/// Maximum interval between bursts, in 5 second units.
pub const SETUP_MAX_INTERVAL_OFFSET: usize = 10;
/// Setup payload size: reserved bytes, four fields, one trailing zero.
pub const SETUP_PAYLOAD_SIZE: usize = SETUP_RESERVED_SIZE + 4 + 1;

/// Remaining burst count in a bursts-remaining response.
pub const BURSTS_REMAINING_OFFSET: usize = 3;
/// Start of the big-endian ESN in an ESN response.
pub const ESN_OFFSET: usize = 3;
/// ESN width.
pub const ESN_SIZE: usize = 4;

// ============================================================================
// Defaults
// ============================================================================

/// User payload carried by a send-data frame.
pub const DEFAULT_PAYLOAD_SIZE: usize = 9;
/// Returned in place of an ESN when the module cannot be read.
pub const ESN_UNAVAILABLE: u32 = u32::MAX;

/// Channel A.
pub const CHANNEL_A: u8 = 0x00;
/// Channel B.
pub const CHANNEL_B: u8 = 0x01;
/// Channel C.
pub const CHANNEL_C: u8 = 0x02;
/// Channel D.
pub const CHANNEL_D: u8 = 0x03;

/// Default RF channel.
pub const DEFAULT_CHANNEL: u8 = CHANNEL_C;
/// Default transmissions per burst cycle.
pub const DEFAULT_BURST_ATTEMPTS: u8 = 0x03;
/// 60 x 5 = 300 seconds.
pub const DEFAULT_MIN_INTERVAL: u8 = 0x3C;
/// 120 x 5 = 600 seconds.
pub const DEFAULT_MAX_INTERVAL: u8 = 0x78;
/// Seconds per interval unit.
pub const INTERVAL_UNIT_SECS: u32 = 5;
