//! In-memory stand-ins for the serial port, power line and clock.
//!
//! Used by this crate's tests and available to applications that want to
//! exercise a [`BurstLifecycle`](crate::BurstLifecycle) without hardware.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use stx3_protocol::{FrameCodec, ProtocolResult};

use crate::power::PowerControl;
use crate::timing::Delay;
use crate::transport::Transport;

/// One scripted reaction of a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Return these bytes from the next read.
    Respond(Vec<u8>),
    /// Fail the next write.
    FailWrite,
    /// Fail the next read with a timeout.
    FailRead,
}

/// Transport that replays a script and records what was written.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<Step>,
    writes: Vec<Vec<u8>>,
    reads: usize,
    discards: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw response bytes.
    pub fn respond(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.script.push_back(Step::Respond(bytes.into()));
        self
    }

    /// Queue a well-formed response frame for `opcode`.
    ///
    /// Fails with `FrameTooLong` when `payload` does not fit one frame.
    pub fn respond_frame(&mut self, opcode: u8, payload: &[u8]) -> ProtocolResult<&mut Self> {
        let frame = FrameCodec::build_command(opcode, payload)?;
        Ok(self.respond(frame.as_bytes()))
    }

    pub fn fail_write(&mut self) -> &mut Self {
        self.script.push_back(Step::FailWrite);
        self
    }

    pub fn fail_read(&mut self) -> &mut Self {
        self.script.push_back(Step::FailRead);
        self
    }

    /// Frames written so far, in order.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn discards(&self) -> usize {
        self.discards
    }

    /// Steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Transport for ScriptedTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.script.front() == Some(&Step::FailWrite) {
            self.script.pop_front();
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "scripted write failure"));
        }
        self.writes.push(bytes.to_vec());
        Ok(())
    }

    fn read_exact(&mut self, len: usize) -> io::Result<Vec<u8>> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(Step::Respond(mut bytes)) => {
                if bytes.len() < len {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("short read: wanted {} bytes, got {}", len, bytes.len()),
                    ));
                }
                bytes.truncate(len);
                Ok(bytes)
            }
            Some(Step::FailWrite) | Some(Step::FailRead) | None => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "scripted read timeout",
            )),
        }
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.discards += 1;
        Ok(())
    }
}

/// A power transition seen by [`RecordingPower`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    Enable,
    Disable,
}

/// Power controller that records every transition.
#[derive(Debug, Default)]
pub struct RecordingPower {
    events: Vec<PowerEvent>,
}

impl RecordingPower {
    pub fn events(&self) -> &[PowerEvent] {
        &self.events
    }

    /// Number of disable/enable cycles recorded.
    pub fn power_cycles(&self) -> usize {
        self.events
            .windows(2)
            .filter(|w| *w == [PowerEvent::Disable, PowerEvent::Enable])
            .count()
    }
}

impl PowerControl for RecordingPower {
    fn enable(&mut self) -> io::Result<()> {
        self.events.push(PowerEvent::Enable);
        Ok(())
    }

    fn disable(&mut self) -> io::Result<()> {
        self.events.push(PowerEvent::Disable);
        Ok(())
    }
}

/// Delay that records requested waits instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    delays: Vec<Duration>,
}

impl RecordingDelay {
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn total(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl Delay for RecordingDelay {
    fn delay(&mut self, duration: Duration) {
        self.delays.push(duration);
    }
}
