//! Frame encoding/decoding utilities.
//!
//! Both directions use the same fixed layout:
//!
//! ```text
//! +------+--------+--------+-------------------+--------+--------+
//! | 0xAA | length | opcode | payload[0..n]     | crc_lo | crc_hi |
//! +------+--------+--------+-------------------+--------+--------+
//! ```
//!
//! `length` counts every byte of the frame. The CRC covers every byte except
//! the two CRC bytes themselves.

use bytes::BufMut;

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};

/// Stateless helpers for building and checking frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec;

impl FrameCodec {
    /// CRC-16 as computed by the module firmware.
    ///
    /// Bytes are processed least-significant bit first against the reflected
    /// CCITT polynomial `0x8408`, seeded with `0xFFFF`, and the accumulator is
    /// complemented at the end. An empty input yields 0.
    pub fn checksum(bytes: &[u8]) -> u16 {
        if bytes.is_empty() {
            return 0;
        }

        let mut crc = CRC_INIT;
        for &byte in bytes {
            crc ^= u16::from(byte);
            for _ in 0..8 {
                if crc & 0x0001 != 0 {
                    crc = (crc >> 1) ^ CRC_POLY;
                } else {
                    crc >>= 1;
                }
            }
        }
        !crc
    }

    /// Assemble preamble, length, opcode and payload, then append the CRC of
    /// everything before it, low byte first.
    pub fn build_command(opcode: u8, payload: &[u8]) -> ProtocolResult<CommandFrame> {
        let len = MIN_FRAME_SIZE + payload.len();
        if len > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLong {
                max: MAX_FRAME_SIZE,
                actual: len,
            });
        }

        let mut buf = Vec::with_capacity(len);
        buf.push(PREAMBLE);
        buf.push(len as u8);
        buf.push(opcode);
        buf.extend_from_slice(payload);
        let crc = Self::checksum(&buf);
        buf.put_u16_le(crc);

        Ok(CommandFrame { bytes: buf })
    }

    /// Check a received frame against the request that produced it.
    ///
    /// The CRC is checked first so that line corruption is reported as such,
    /// then the preamble, the declared length and the echoed opcode.
    pub fn validate(frame: &[u8], expected_opcode: u8) -> ProtocolResult<()> {
        if frame.len() < MIN_FRAME_SIZE {
            return Err(ProtocolError::FrameTooShort {
                expected: MIN_FRAME_SIZE,
                actual: frame.len(),
            });
        }

        let body_len = frame.len() - CRC_SIZE;
        let computed = Self::checksum(&frame[..body_len]);
        let received = u16::from_le_bytes([frame[body_len], frame[body_len + 1]]);
        if computed != received {
            return Err(ProtocolError::CrcMismatch { computed, received });
        }

        if frame[0] != PREAMBLE {
            return Err(ProtocolError::BadPreamble(frame[0]));
        }

        let declared = usize::from(frame[LENGTH_OFFSET]);
        if declared != frame.len() {
            return Err(ProtocolError::LengthMismatch {
                declared,
                actual: frame.len(),
            });
        }

        let opcode = frame[OPCODE_OFFSET];
        if opcode != expected_opcode {
            return Err(ProtocolError::OpcodeMismatch {
                expected: expected_opcode,
                actual: opcode,
            });
        }

        Ok(())
    }

    /// Boolean form of [`FrameCodec::validate`].
    pub fn is_valid(frame: &[u8], expected_opcode: u8) -> bool {
        Self::validate(frame, expected_opcode).is_ok()
    }
}

/// A complete host → module frame, CRC included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: Vec<u8>,
}

impl CommandFrame {
    /// Opcode carried at byte 2.
    pub fn opcode(&self) -> u8 {
        self.bytes[OPCODE_OFFSET]
    }

    /// Bytes between the opcode and the CRC.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[PAYLOAD_OFFSET..self.bytes.len() - CRC_SIZE]
    }

    /// The trailing CRC.
    pub fn crc(&self) -> u16 {
        let n = self.bytes.len();
        u16::from_le_bytes([self.bytes[n - 2], self.bytes[n - 1]])
    }

    /// Wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total frame length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; a frame carries at least a header and CRC.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// A module → host frame that passed [`FrameCodec::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    bytes: Vec<u8>,
}

impl ResponseFrame {
    /// Validate raw bytes as the response to a request with `expected_opcode`.
    pub fn parse(bytes: Vec<u8>, expected_opcode: u8) -> ProtocolResult<Self> {
        if let Err(e) = FrameCodec::validate(&bytes, expected_opcode) {
            log::trace!("rejected response {:02X?}: {}", bytes, e);
            return Err(e);
        }
        Ok(ResponseFrame { bytes })
    }

    /// Echoed opcode.
    pub fn opcode(&self) -> u8 {
        self.bytes[OPCODE_OFFSET]
    }

    /// Bytes between the opcode and the CRC.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[PAYLOAD_OFFSET..self.bytes.len() - CRC_SIZE]
    }

    /// Wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total frame length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; a validated frame carries at least a header and CRC.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the frame, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_empty_is_zero() {
        assert_eq!(FrameCodec::checksum(&[]), 0);
    }

    #[test]
    fn test_checksum_check_value() {
        // Standard check input for this CRC variant (X.25 parameters).
        assert_eq!(FrameCodec::checksum(b"123456789"), 0x906E);
    }

    #[test]
    fn test_checksum_matches_firmware_frames() {
        assert_eq!(FrameCodec::checksum(&[0xAA, 0x05, 0x07]), 0xB066);
        assert_eq!(FrameCodec::checksum(&[0xAA, 0x05, 0x04]), 0x82FD);
        assert_eq!(FrameCodec::checksum(&[0xAA, 0x05, 0x03]), 0xF642);
        assert_eq!(FrameCodec::checksum(&[0xAA, 0x05, 0x01]), 0xD550);
    }

    #[test]
    fn test_build_command_layout() {
        let frame = FrameCodec::build_command(0x07, &[]).unwrap();
        assert_eq!(frame.as_bytes(), &[0xAA, 0x05, 0x07, 0x66, 0xB0]);
        assert_eq!(frame.opcode(), 0x07);
        assert!(frame.payload().is_empty());
        assert_eq!(frame.crc(), 0xB066);

        let payload = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let frame = FrameCodec::build_command(0x00, &payload).unwrap();
        assert_eq!(
            frame.as_bytes(),
            &[0xAA, 0x0E, 0x00, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0xBE, 0xE8]
        );
        assert_eq!(frame.payload(), &payload);
    }

    #[test]
    fn test_build_command_too_long() {
        let payload = vec![0u8; MAX_FRAME_SIZE];
        let err = FrameCodec::build_command(0x00, &payload).unwrap_err();
        assert!(matches!(err, ProtocolError::FrameTooLong { .. }));
    }

    #[test]
    fn test_validate_built_frames() {
        for opcode in [0x00, 0x01, 0x03, 0x04, 0x06, 0x07] {
            for len in [0usize, 1, 4, 9, 32] {
                let payload: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(37)).collect();
                let frame = FrameCodec::build_command(opcode, &payload).unwrap();
                assert!(FrameCodec::is_valid(frame.as_bytes(), opcode));
            }
        }
    }

    #[test]
    fn test_validate_detects_every_single_bit_flip() {
        let frame = FrameCodec::build_command(0x00, &[0xDE, 0xAD, 0xBE, 0xEF, 0, 1, 2, 3, 4])
            .unwrap();
        let original = frame.as_bytes().to_vec();

        for byte in 0..original.len() {
            for bit in 0..8 {
                let mut corrupted = original.clone();
                corrupted[byte] ^= 1 << bit;
                assert!(
                    !FrameCodec::is_valid(&corrupted, 0x00),
                    "flip of bit {} in byte {} went undetected",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_validate_reports_crc_mismatch() {
        let mut bytes = vec![0xAA, 0x05, 0x03, 0x42, 0xF6];
        bytes[4] = 0xF7;
        assert_eq!(
            FrameCodec::validate(&bytes, 0x03),
            Err(ProtocolError::CrcMismatch {
                computed: 0xF642,
                received: 0xF742,
            })
        );
    }

    #[test]
    fn test_validate_reports_opcode_mismatch() {
        let bytes = [0xAA, 0x05, 0x03, 0x42, 0xF6];
        assert_eq!(
            FrameCodec::validate(&bytes, 0x04),
            Err(ProtocolError::OpcodeMismatch {
                expected: 0x04,
                actual: 0x03,
            })
        );
    }

    #[test]
    fn test_validate_reports_length_mismatch() {
        // Well-formed CRC over a frame whose length byte lies.
        let mut bytes = vec![0xAA, 0x07, 0x04, 0x00];
        let crc = FrameCodec::checksum(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        assert_eq!(
            FrameCodec::validate(&bytes, 0x04),
            Err(ProtocolError::LengthMismatch {
                declared: 7,
                actual: 6,
            })
        );
    }

    #[test]
    fn test_validate_reports_bad_preamble() {
        let mut bytes = vec![0x55, 0x05, 0x01];
        let crc = FrameCodec::checksum(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        assert_eq!(
            FrameCodec::validate(&bytes, 0x01),
            Err(ProtocolError::BadPreamble(0x55))
        );
    }

    #[test]
    fn test_validate_short_frame() {
        assert_eq!(
            FrameCodec::validate(&[0xAA, 0x05], 0x01),
            Err(ProtocolError::FrameTooShort {
                expected: MIN_FRAME_SIZE,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_response_frame_accessors() {
        let raw = vec![0xAA, 0x06, 0x04, 0x05, 0x59, 0x64];
        let frame = ResponseFrame::parse(raw.clone(), 0x04).unwrap();
        assert_eq!(frame.opcode(), 0x04);
        assert_eq!(frame.payload(), &[0x05]);
        assert_eq!(frame.len(), 6);
        assert_eq!(frame.into_bytes(), raw);
    }
}
