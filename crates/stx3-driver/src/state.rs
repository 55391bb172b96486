//! Burst state tracked across calls.

use serde::{Deserialize, Serialize};

/// Logical state of the transmitter's burst cycle.
///
/// The state is advisory: it is overwritten by the next successful exchange
/// that reports it, and `Error` is never terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurstState {
    /// No burst cycle in progress; a new burst may be started.
    #[default]
    Available,
    /// A burst cycle is in progress.
    Running,
    /// The last exchange failed.
    Error,
}

impl BurstState {
    /// Returns the state as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BurstState::Available => "available",
            BurstState::Running => "running",
            BurstState::Error => "error",
        }
    }

    /// State implied by a bursts-remaining count.
    pub fn from_remaining(remaining: u8) -> Self {
        if remaining > 0 {
            BurstState::Running
        } else {
            BurstState::Available
        }
    }
}

impl std::fmt::Display for BurstState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_remaining() {
        assert_eq!(BurstState::from_remaining(0), BurstState::Available);
        assert_eq!(BurstState::from_remaining(5), BurstState::Running);
        assert_eq!(BurstState::from_remaining(u8::MAX), BurstState::Running);
    }

    #[test]
    fn test_default_is_available() {
        assert_eq!(BurstState::default(), BurstState::Available);
        assert_eq!(BurstState::Error.to_string(), "error");
    }
}
