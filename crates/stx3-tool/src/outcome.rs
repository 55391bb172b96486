//! Results printed by the tool.

use serde::Serialize;
use stx3_driver::{BurstState, Esn, ModuleConfig};

use crate::ToolError;

/// Successful result of one subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Outcome {
    Burst { state: BurstState },
    Esn { esn: u32, hex: String },
    Abort { state: BurstState },
    Reset,
    Configure { config: ModuleConfig },
    State { state: BurstState, remaining: u8 },
    Status { config: ModuleConfig },
    Init { state: BurstState, config: ModuleConfig },
}

impl Outcome {
    pub fn esn(esn: Esn) -> Self {
        Outcome::Esn {
            esn: esn.value(),
            hex: esn.to_string(),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Burst { state } => write!(f, "burst started, module {}", state),
            Outcome::Esn { esn, hex } => write!(f, "ESN {} ({})", hex, esn),
            Outcome::Abort { state } => write!(f, "burst aborted, module {}", state),
            Outcome::Reset => f.write_str("module power-cycled"),
            Outcome::Configure { config } => write!(f, "configured {}", config),
            Outcome::State { state, remaining } => {
                write!(f, "{} ({} bursts remaining)", state, remaining)
            }
            Outcome::Status { config } => write!(f, "{}", config),
            Outcome::Init { state, config } => {
                write!(f, "initialized {}, module {}", config, state)
            }
        }
    }
}

/// Failure report for `--json` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub error: String,
    pub kind: &'static str,
}

impl Failure {
    pub fn new(err: &ToolError) -> Self {
        Failure {
            error: err.to_string(),
            kind: err.kind().map_or("usage", |kind| kind.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(Outcome::State {
            state: BurstState::Running,
            remaining: 2,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"command": "state", "state": "running", "remaining": 2})
        );

        let json = serde_json::to_value(Outcome::esn(Esn(0x0023_1860))).unwrap();
        assert_eq!(json["esn"], 0x0023_1860);
        assert_eq!(json["hex"], "0x00231860");
    }

    #[test]
    fn test_config_serializes_fields() {
        let json = serde_json::to_value(Outcome::Status {
            config: ModuleConfig::new(2, 3, 0x3C, 0x78),
        })
        .unwrap();
        assert_eq!(json["config"]["channel"], 2);
        assert_eq!(json["config"]["max_interval"], 0x78);
    }

    #[test]
    fn test_failure_report() {
        let failure = Failure::new(&ToolError::Driver(stx3_driver::Stx3Error::DeadlineExceeded));
        assert_eq!(failure.kind, "deadline_exceeded");
        assert_eq!(failure.error, "deadline exceeded");

        let failure = Failure::new(&ToolError::Usage(crate::PayloadParseError::Empty));
        assert_eq!(failure.kind, "usage");
    }
}
