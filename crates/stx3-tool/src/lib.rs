//! Command-line front end for the STX3 driver.
//!
//! Each subcommand maps to one [`BurstLifecycle`] operation; see [`execute`].

pub mod cli;
pub mod outcome;
pub mod payload;

use stx3_driver::{
    BurstLifecycle, BurstState, Deadline, Delay, ModuleConfig, PowerControl, Stx3Error, Transport,
};
use stx3_protocol::ErrorKind;
use thiserror::Error;

pub use cli::{Cli, Commands};
pub use outcome::{Failure, Outcome};
pub use payload::{parse_payload, parse_u8, PayloadParseError};

/// Errors reported by the tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A command-line argument could not be used.
    #[error("invalid argument: {0}")]
    Usage(#[from] PayloadParseError),

    /// The driver operation failed.
    #[error(transparent)]
    Driver(#[from] Stx3Error),
}

impl ToolError {
    /// Failure class, `None` for argument errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ToolError::Usage(_) => None,
            ToolError::Driver(e) => Some(e.kind()),
        }
    }

    /// Process exit status: 2 for argument errors, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Usage(_) => 2,
            ToolError::Driver(_) => 1,
        }
    }
}

/// Run one subcommand against `lifecycle`.
pub fn execute<T, P, D>(
    lifecycle: &mut BurstLifecycle<T, P, D>,
    command: &Commands,
    deadline: &Deadline,
) -> Result<Outcome, ToolError>
where
    T: Transport,
    P: PowerControl,
    D: Delay,
{
    match command {
        Commands::Burst { bytes } => {
            let payload = parse_payload(bytes)?;
            let state = lifecycle.try_new_burst(Some(&payload), deadline)?;
            Ok(Outcome::Burst { state })
        }
        Commands::Esn => Ok(Outcome::esn(lifecycle.read_esn(deadline)?)),
        Commands::Abort => {
            let state = lifecycle.try_abort_burst(deadline)?;
            Ok(Outcome::Abort { state })
        }
        Commands::Reset => {
            lifecycle.reset_with_deadline(deadline)?;
            Ok(Outcome::Reset)
        }
        Commands::Configure {
            channel,
            burst_attempts,
            min_interval,
            max_interval,
        } => {
            let config = ModuleConfig::new(*channel, *burst_attempts, *min_interval, *max_interval);
            lifecycle.configure_with_deadline(config, deadline)?;
            Ok(Outcome::Configure { config })
        }
        Commands::State => {
            let remaining = lifecycle.bursts_remaining(deadline)?;
            Ok(Outcome::State {
                state: BurstState::from_remaining(remaining),
                remaining,
            })
        }
        Commands::Status => Ok(Outcome::Status {
            config: lifecycle.read_configuration(deadline)?,
        }),
        Commands::Init => {
            lifecycle.initialize_with_deadline(deadline)?;
            Ok(Outcome::Init {
                state: lifecycle.state(),
                config: lifecycle.module_config(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stx3_driver::testing::{RecordingDelay, RecordingPower, ScriptedTransport};
    use stx3_driver::DriverConfig;
    use stx3_protocol::{OP_ABORT_TRANSMISSION, OP_QUERY_BURSTS_REMAINING, OP_SEND_DATA, OP_SETUP};

    type TestLifecycle = BurstLifecycle<ScriptedTransport, RecordingPower, RecordingDelay>;

    fn lifecycle(transport: ScriptedTransport) -> TestLifecycle {
        BurstLifecycle::from_config(
            transport,
            RecordingPower::default(),
            RecordingDelay::default(),
            &DriverConfig::default(),
        )
    }

    #[test]
    fn test_burst_command_writes_payload() {
        let mut transport = ScriptedTransport::new();
        transport.respond_frame(OP_SEND_DATA, &[]).unwrap();
        let mut lc = lifecycle(transport);

        let command = Commands::Burst {
            bytes: vec!["010203040506070809".to_string()],
        };
        let outcome = execute(&mut lc, &command, &Deadline::none()).unwrap();

        assert_eq!(outcome, Outcome::Burst { state: BurstState::Running });
        assert_eq!(
            lc.orchestrator().transport().writes()[0],
            vec![0xAA, 0x0E, 0x00, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0xBE, 0xE8]
        );
    }

    #[test]
    fn test_burst_command_rejects_short_payload() {
        let mut lc = lifecycle(ScriptedTransport::new());
        let command = Commands::Burst {
            bytes: vec!["01".to_string(), "02".to_string()],
        };
        let err = execute(&mut lc, &command, &Deadline::none()).unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::PayloadInvalid));
        assert_eq!(err.exit_code(), 1);
        assert!(lc.orchestrator().transport().writes().is_empty());
    }

    #[test]
    fn test_burst_command_bad_hex_is_usage_error() {
        let mut lc = lifecycle(ScriptedTransport::new());
        let command = Commands::Burst {
            bytes: vec!["01".to_string(), "zz".to_string()],
        };
        let err = execute(&mut lc, &command, &Deadline::none()).unwrap_err();

        assert!(matches!(err, ToolError::Usage(PayloadParseError::BadByte(_))));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn test_esn_command() {
        let mut transport = ScriptedTransport::new();
        transport.respond([0xAAu8, 0x09, 0x01, 0x12, 0x34, 0x56, 0x78, 0x7E, 0xC9]);
        let mut lc = lifecycle(transport);

        let outcome = execute(&mut lc, &Commands::Esn, &Deadline::none()).unwrap();
        assert_eq!(outcome.to_string(), "ESN 0x12345678 (305419896)");
    }

    #[test]
    fn test_state_and_abort_commands() {
        let mut transport = ScriptedTransport::new();
        transport.respond_frame(OP_QUERY_BURSTS_REMAINING, &[3]).unwrap();
        transport.respond_frame(OP_ABORT_TRANSMISSION, &[]).unwrap();
        let mut lc = lifecycle(transport);

        assert_eq!(
            execute(&mut lc, &Commands::State, &Deadline::none()).unwrap(),
            Outcome::State {
                state: BurstState::Running,
                remaining: 3,
            }
        );
        assert_eq!(
            execute(&mut lc, &Commands::Abort, &Deadline::none()).unwrap(),
            Outcome::Abort {
                state: BurstState::Available,
            }
        );
    }

    #[test]
    fn test_configure_and_reset_commands() {
        let mut transport = ScriptedTransport::new();
        transport.respond_frame(OP_SETUP, &[]).unwrap();
        let mut lc = lifecycle(transport);

        let command = Commands::Configure {
            channel: 1,
            burst_attempts: 2,
            min_interval: 10,
            max_interval: 20,
        };
        assert_eq!(
            execute(&mut lc, &command, &Deadline::none()).unwrap(),
            Outcome::Configure {
                config: ModuleConfig::new(1, 2, 10, 20),
            }
        );
        assert_eq!(
            execute(&mut lc, &Commands::Reset, &Deadline::none()).unwrap(),
            Outcome::Reset
        );
        assert_eq!(lc.orchestrator().power().power_cycles(), 2);
    }

    #[test]
    fn test_failed_command_is_an_error() {
        let mut lc = lifecycle(ScriptedTransport::new());
        let err = execute(&mut lc, &Commands::Status, &Deadline::none()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Io));
        assert_eq!(lc.state(), BurstState::Error);
    }
}
