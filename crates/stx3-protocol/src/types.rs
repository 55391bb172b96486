//! Common types used in the protocol.

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};

/// Transmitter configuration written by a setup command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModuleConfig {
    /// RF channel (0 = A, 1 = B, 2 = C, 3 = D).
    pub channel: u8,
    /// Number of transmissions in each burst cycle.
    pub burst_attempts: u8,
    /// Minimum interval between transmissions, in 5 second units.
    pub min_interval: u8,
    /// Maximum interval between transmissions, in 5 second units.
    pub max_interval: u8,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        ModuleConfig {
            channel: DEFAULT_CHANNEL,
            burst_attempts: DEFAULT_BURST_ATTEMPTS,
            min_interval: DEFAULT_MIN_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }
}

impl ModuleConfig {
    /// Create a configuration from its four raw fields.
    pub fn new(channel: u8, burst_attempts: u8, min_interval: u8, max_interval: u8) -> Self {
        ModuleConfig {
            channel,
            burst_attempts,
            min_interval,
            max_interval,
        }
    }

    /// Read the four fields from their setup-frame offsets.
    pub fn from_frame(frame: &[u8]) -> ProtocolResult<Self> {
        if frame.len() <= SETUP_MAX_INTERVAL_OFFSET {
            return Err(ProtocolError::FrameTooShort {
                expected: SETUP_MAX_INTERVAL_OFFSET + 1,
                actual: frame.len(),
            });
        }
        Ok(ModuleConfig {
            channel: frame[SETUP_CHANNEL_OFFSET],
            burst_attempts: frame[SETUP_BURST_ATTEMPTS_OFFSET],
            min_interval: frame[SETUP_MIN_INTERVAL_OFFSET],
            max_interval: frame[SETUP_MAX_INTERVAL_OFFSET],
        })
    }

    /// Setup payload: four reserved zero bytes, the fields, one zero byte.
    pub fn to_setup_payload(&self) -> [u8; SETUP_PAYLOAD_SIZE] {
        let mut payload = [0u8; SETUP_PAYLOAD_SIZE];
        payload[SETUP_CHANNEL_OFFSET - PAYLOAD_OFFSET] = self.channel;
        payload[SETUP_BURST_ATTEMPTS_OFFSET - PAYLOAD_OFFSET] = self.burst_attempts;
        payload[SETUP_MIN_INTERVAL_OFFSET - PAYLOAD_OFFSET] = self.min_interval;
        payload[SETUP_MAX_INTERVAL_OFFSET - PAYLOAD_OFFSET] = self.max_interval;
        payload
    }

    /// Channel letter, if the channel number is one the module knows.
    pub fn channel_name(&self) -> Option<char> {
        match self.channel {
            CHANNEL_A => Some('A'),
            CHANNEL_B => Some('B'),
            CHANNEL_C => Some('C'),
            CHANNEL_D => Some('D'),
            _ => None,
        }
    }

    /// Minimum interval in seconds.
    pub fn min_interval_secs(&self) -> u32 {
        u32::from(self.min_interval) * INTERVAL_UNIT_SECS
    }

    /// Maximum interval in seconds.
    pub fn max_interval_secs(&self) -> u32 {
        u32::from(self.max_interval) * INTERVAL_UNIT_SECS
    }
}

impl std::fmt::Display for ModuleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.channel_name() {
            Some(name) => write!(f, "channel={}", name)?,
            None => write!(f, "channel=0x{:02X}", self.channel)?,
        }
        write!(
            f,
            " attempts={} interval={}..{}s",
            self.burst_attempts,
            self.min_interval_secs(),
            self.max_interval_secs()
        )
    }
}

/// Electronic serial number of a transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Esn(pub u32);

impl Esn {
    /// Read a big-endian ESN from the first four bytes of `slice`.
    pub fn from_be_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; ESN_SIZE] = slice.get(..ESN_SIZE)?.try_into().ok()?;
        Some(Esn(u32::from_be_bytes(bytes)))
    }

    /// Raw value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<Esn> for u32 {
    fn from(esn: Esn) -> Self {
        esn.0
    }
}

impl std::fmt::Display for Esn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
