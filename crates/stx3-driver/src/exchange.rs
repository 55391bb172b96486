//! Request/response exchange with bounded retry and reset escalation.
//!
//! Every lifecycle operation goes through [`ExchangeOrchestrator::exchange`]:
//!
//! 1. up to `attempts` write/read/validate attempts, each preceded by the
//!    settle delay while the module is not idle;
//! 2. one power-cycle reset recovery;
//! 3. one final attempt of the same command.
//!
//! The deadline is checked before every attempt and on both sides of the
//! reset, and bounds the settle and reset waits; expiry or cancellation ends
//! the exchange without further retries. A reset whose power control fails is
//! logged and counted, and the final attempt still runs.

use std::time::{Duration, Instant};

use stx3_metrics::metric_defs;
use stx3_protocol::{opcode_name, CommandFrame, ResponseFrame};

use crate::config::RetryPolicy;
use crate::error::Result;
use crate::power::PowerControl;
use crate::state::BurstState;
use crate::timing::{Deadline, Delay};
use crate::transport::Transport;

/// Which attempt of an exchange is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Bounded(u32),
    AfterReset,
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Attempt::Bounded(n) => write!(f, "{}", n),
            Attempt::AfterReset => f.write_str("post-reset"),
        }
    }
}

/// Runs exchanges against one transport and power line.
#[derive(Debug)]
pub struct ExchangeOrchestrator<T, P, D> {
    transport: T,
    power: P,
    delay: D,
    policy: RetryPolicy,
}

impl<T: Transport, P: PowerControl, D: Delay> ExchangeOrchestrator<T, P, D> {
    pub fn new(transport: T, power: P, delay: D, policy: RetryPolicy) -> Self {
        ExchangeOrchestrator {
            transport,
            power,
            delay,
            policy,
        }
    }

    /// Send `frame` and return the validated response of `expected_len` bytes.
    ///
    /// `state` is the caller's cached burst state; anything other than
    /// [`BurstState::Available`] adds the settle delay before each bounded
    /// attempt. The error of the final attempt is returned when everything
    /// fails.
    pub fn exchange(
        &mut self,
        frame: &CommandFrame,
        expected_len: usize,
        state: BurstState,
        deadline: &Deadline,
    ) -> Result<ResponseFrame> {
        let command = opcode_name(frame.opcode());
        metrics::counter!(metric_defs::EXCHANGES.name, "command" => command).increment(1);
        let started = Instant::now();

        let result = self.run(frame, expected_len, state, deadline);

        metrics::histogram!(metric_defs::EXCHANGE_DURATION.name, "command" => command)
            .record(started.elapsed().as_secs_f64() * 1000.0);
        match &result {
            Ok(_) => {
                tracing::debug!(command, elapsed = ?started.elapsed(), "exchange complete");
            }
            Err(e) if e.is_interrupt() => {
                tracing::warn!(command, error = %e, "exchange interrupted");
            }
            Err(e) => {
                metrics::counter!(metric_defs::EXCHANGES_EXHAUSTED.name, "command" => command)
                    .increment(1);
                tracing::error!(command, error = %e, "exchange failed after reset recovery");
            }
        }
        result
    }

    fn run(
        &mut self,
        frame: &CommandFrame,
        expected_len: usize,
        state: BurstState,
        deadline: &Deadline,
    ) -> Result<ResponseFrame> {
        for n in 1..=self.policy.attempts {
            deadline.check()?;
            if state != BurstState::Available {
                tracing::trace!(%state, "module busy, waiting to settle");
                deadline.wait(&mut self.delay, self.policy.settle_delay())?;
            }
            if let Ok(response) = self.attempt(frame, expected_len, Attempt::Bounded(n)) {
                return Ok(response);
            }
        }

        deadline.check()?;
        tracing::warn!(
            command = opcode_name(frame.opcode()),
            attempts = self.policy.attempts,
            "retries exhausted, power-cycling module"
        );
        match self.reset_recovery_with_deadline(deadline) {
            Ok(()) => {}
            Err(e) if e.is_interrupt() => return Err(e),
            Err(e) => {
                metrics::counter!(metric_defs::RESET_FAILURES.name, "kind" => e.kind().as_str())
                    .increment(1);
                tracing::warn!(error = %e, "reset recovery failed, making final attempt anyway");
            }
        }
        deadline.check()?;

        self.attempt(frame, expected_len, Attempt::AfterReset)
    }

    fn attempt(
        &mut self,
        frame: &CommandFrame,
        expected_len: usize,
        attempt: Attempt,
    ) -> Result<ResponseFrame> {
        let command = opcode_name(frame.opcode());
        metrics::counter!(metric_defs::EXCHANGE_ATTEMPTS.name, "command" => command).increment(1);

        let result = self.round_trip(frame, expected_len);
        if let Err(e) = &result {
            metrics::counter!(
                metric_defs::EXCHANGE_FAILURES.name,
                "command" => command,
                "kind" => e.kind().as_str()
            )
            .increment(1);
            tracing::debug!(command, %attempt, error = %e, "attempt failed");
        }
        result
    }

    fn round_trip(&mut self, frame: &CommandFrame, expected_len: usize) -> Result<ResponseFrame> {
        self.transport.discard_input()?;
        tracing::trace!(tx = %hex::encode(frame.as_bytes()), "sending frame");
        self.transport.write(frame.as_bytes())?;

        let raw = self.transport.read_exact(expected_len)?;
        tracing::trace!(rx = %hex::encode(&raw), "received frame");
        Ok(ResponseFrame::parse(raw, frame.opcode())?)
    }

    /// Power-cycle the module: off, wait, on, wait.
    pub fn reset_recovery(&mut self) -> Result<()> {
        self.reset_recovery_with_deadline(&Deadline::none())
    }

    /// [`reset_recovery`](Self::reset_recovery) with both waits bounded by
    /// `deadline`. The module is switched back on even when the off period
    /// is interrupted.
    pub fn reset_recovery_with_deadline(&mut self, deadline: &Deadline) -> Result<()> {
        metrics::counter!(metric_defs::RESET_RECOVERIES.name).increment(1);
        self.power.disable()?;
        let off = deadline.wait(&mut self.delay, self.policy.reset_off());
        self.power.enable()?;
        off?;
        deadline.wait(&mut self.delay, self.policy.reset_on())?;
        tracing::info!("module power-cycled");
        Ok(())
    }

    /// Switch the module on and wait `settle` for it to boot.
    pub fn power_on(&mut self, settle: Duration, deadline: &Deadline) -> Result<()> {
        self.power.enable()?;
        deadline.wait(&mut self.delay, settle)
    }

    /// Wait through the orchestrator's delay source, bounded by `deadline`.
    pub fn wait(&mut self, duration: Duration, deadline: &Deadline) -> Result<()> {
        deadline.wait(&mut self.delay, duration)
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn delay_source(&self) -> &D {
        &self.delay
    }

    /// Release the transport, power controller and delay source.
    pub fn into_parts(self) -> (T, P, D) {
        (self.transport, self.power, self.delay)
    }
}
