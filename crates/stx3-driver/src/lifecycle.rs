//! Burst lifecycle of one transmitter.
//!
//! [`BurstLifecycle`] owns the orchestrator together with the cached
//! [`BurstState`] and the initialization flags. Every operation builds a
//! command, runs it through [`ExchangeOrchestrator::exchange`] and updates the
//! cache from the outcome. A failed exchange always leaves the cache at
//! [`BurstState::Error`]; a rejected payload never reaches the transport and
//! leaves the cache untouched.

use std::sync::Arc;

use parking_lot::Mutex;
use stx3_protocol::{Command, Esn, ModuleConfig, ProtocolError, Response, ESN_UNAVAILABLE};

use crate::config::{DriverConfig, LifecycleConfig};
use crate::error::{Result, Stx3Error};
use crate::exchange::ExchangeOrchestrator;
use crate::power::PowerControl;
use crate::state::BurstState;
use crate::timing::{Deadline, Delay, ThreadDelay};
use crate::transport::{SerialTransport, Transport};

/// Capacity of a [`DiagnosticBuffer`] created with `default()`.
pub const DEFAULT_DIAGNOSTIC_CAPACITY: usize = 128;

/// Lifecycle shared between threads behind one lock.
pub type SharedLifecycle<T, P, D> = Arc<Mutex<BurstLifecycle<T, P, D>>>;

/// Lifecycle over a real serial port.
pub type SerialLifecycle = BurstLifecycle<SerialTransport, Box<dyn PowerControl + Send>, ThreadDelay>;

/// Bounded text buffer receiving the reason a burst request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticBuffer {
    capacity: usize,
    text: String,
}

impl Default for DiagnosticBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DIAGNOSTIC_CAPACITY)
    }
}

impl DiagnosticBuffer {
    /// Buffer holding at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        DiagnosticBuffer {
            capacity,
            text: String::new(),
        }
    }

    /// Replace the contents with `message`, cut at a character boundary.
    pub fn set(&mut self, message: &str) {
        let mut end = message.len().min(self.capacity);
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        self.text.clear();
        self.text.push_str(&message[..end]);
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Display for DiagnosticBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Stateful driver for one transmitter module.
#[derive(Debug)]
pub struct BurstLifecycle<T, P, D> {
    orchestrator: ExchangeOrchestrator<T, P, D>,
    settings: LifecycleConfig,
    module: ModuleConfig,
    state: BurstState,
    initialized: bool,
    init_ok: bool,
}

impl SerialLifecycle {
    /// Open the configured serial device and power line.
    pub fn open(config: &DriverConfig) -> Result<Self> {
        config.validate()?;
        let transport = SerialTransport::open(&config.serial)?;
        Ok(Self::from_config(
            transport,
            config.power.build(),
            ThreadDelay,
            config,
        ))
    }
}

impl<T: Transport, P: PowerControl, D: Delay> BurstLifecycle<T, P, D> {
    pub fn new(
        orchestrator: ExchangeOrchestrator<T, P, D>,
        settings: LifecycleConfig,
        module: ModuleConfig,
    ) -> Self {
        BurstLifecycle {
            orchestrator,
            settings,
            module,
            state: BurstState::Available,
            initialized: false,
            init_ok: false,
        }
    }

    /// Assemble a lifecycle from its parts and a driver configuration.
    pub fn from_config(transport: T, power: P, delay: D, config: &DriverConfig) -> Self {
        let orchestrator = ExchangeOrchestrator::new(transport, power, delay, config.retry.clone());
        Self::new(orchestrator, config.lifecycle.clone(), config.module)
    }

    /// Power the module on, write the configured settings and verify them.
    pub fn initialize(&mut self) -> Result<()> {
        self.initialize_with_deadline(&Deadline::none())
    }

    /// [`initialize`](Self::initialize) bounded by `deadline`.
    ///
    /// The initialized flag is set whatever the outcome;
    /// [`initialization_ok`](Self::initialization_ok) records the outcome.
    pub fn initialize_with_deadline(&mut self, deadline: &Deadline) -> Result<()> {
        let result = self.run_initialization(deadline);
        self.initialized = true;
        self.init_ok = result.is_ok();
        match &result {
            Ok(()) => tracing::info!(config = %self.module, "module initialized"),
            Err(e) => tracing::error!(error = %e, "module initialization failed"),
        }
        result
    }

    fn run_initialization(&mut self, deadline: &Deadline) -> Result<()> {
        tracing::info!("powering on module");
        self.orchestrator
            .power_on(self.settings.power_on_settle(), deadline)?;

        match self.bursts_remaining(deadline) {
            Ok(remaining) => tracing::debug!(remaining, "initial burst state read"),
            Err(e) if e.is_interrupt() => return Err(e),
            Err(e) => tracing::warn!(error = %e, "could not read initial burst state"),
        }

        let wanted = self.module;
        let mut configured = Err(Stx3Error::Config(
            "lifecycle.init_attempts is 0".to_string(),
        ));
        for attempt in 1..=self.settings.init_attempts {
            configured = self.configure_with_deadline(wanted, deadline);
            match &configured {
                Ok(()) => break,
                Err(e) if e.is_interrupt() => break,
                Err(e) => tracing::warn!(attempt, error = %e, "configure failed"),
            }
        }
        configured?;

        let actual = self.read_configuration(deadline)?;
        if actual != wanted {
            return Err(Stx3Error::ConfigMismatch {
                expected: wanted,
                actual,
            });
        }
        Ok(())
    }

    /// Reset the module and write `config`.
    pub fn configure(&mut self, config: ModuleConfig) -> Result<()> {
        self.configure_with_deadline(config, &Deadline::none())
    }

    /// [`configure`](Self::configure) bounded by `deadline`.
    ///
    /// Any failure, an interrupt before the reset included, leaves the cached
    /// state at [`BurstState::Error`].
    pub fn configure_with_deadline(
        &mut self,
        config: ModuleConfig,
        deadline: &Deadline,
    ) -> Result<()> {
        if let Err(e) = self.reset_for_configure(deadline) {
            self.state = BurstState::Error;
            return Err(e);
        }

        match self.run(&Command::Setup(config), deadline)? {
            Response::SetupAck => {
                self.module = config;
                tracing::info!(%config, "module configured");
                Ok(())
            }
            other => Err(self.unexpected(other)),
        }
    }

    fn reset_for_configure(&mut self, deadline: &Deadline) -> Result<()> {
        deadline.check()?;
        self.orchestrator.reset_recovery_with_deadline(deadline)?;
        self.orchestrator
            .wait(self.settings.configure_settle(), deadline)
    }

    /// Read back the configuration stored in the module.
    pub fn read_configuration(&mut self, deadline: &Deadline) -> Result<ModuleConfig> {
        match self.run(&Command::QuerySetup, deadline)? {
            Response::Configuration(config) => Ok(config),
            other => Err(self.unexpected(other)),
        }
    }

    /// Start a burst cycle carrying `payload`.
    ///
    /// A missing or wrongly sized payload fails with
    /// [`ProtocolError::PayloadInvalid`] before anything is written.
    pub fn try_new_burst(
        &mut self,
        payload: Option<&[u8]>,
        deadline: &Deadline,
    ) -> Result<BurstState> {
        let command = Command::send_data(payload, self.settings.payload_len)?;
        match self.run(&command, deadline)? {
            Response::SendDataAck => {
                self.state = BurstState::Running;
                tracing::info!("burst cycle started");
                Ok(self.state)
            }
            other => Err(self.unexpected(other)),
        }
    }

    /// Start a burst cycle, reporting failure as [`BurstState::Error`] with the
    /// reason written to `diagnostics`.
    pub fn new_burst(
        &mut self,
        payload: Option<&[u8]>,
        diagnostics: &mut DiagnosticBuffer,
    ) -> BurstState {
        match self.try_new_burst(payload, &Deadline::none()) {
            Ok(state) => {
                diagnostics.clear();
                state
            }
            Err(e) => {
                diagnostics.set(&format!("new burst failed: {}", e));
                tracing::warn!(error = %e, "new burst failed");
                BurstState::Error
            }
        }
    }

    /// Bursts still scheduled; updates the cached state from the count.
    pub fn bursts_remaining(&mut self, deadline: &Deadline) -> Result<u8> {
        match self.run(&Command::QueryBurstsRemaining, deadline)? {
            Response::BurstsRemaining(remaining) => {
                self.state = BurstState::from_remaining(remaining);
                Ok(remaining)
            }
            other => Err(self.unexpected(other)),
        }
    }

    /// Query the module's burst state.
    pub fn get_burst_state(&mut self) -> BurstState {
        match self.bursts_remaining(&Deadline::none()) {
            Ok(_) => self.state,
            Err(e) => {
                tracing::warn!(error = %e, "burst state query failed");
                BurstState::Error
            }
        }
    }

    /// Abort the burst cycle in progress.
    pub fn try_abort_burst(&mut self, deadline: &Deadline) -> Result<BurstState> {
        match self.run(&Command::AbortTransmission, deadline)? {
            Response::AbortAck => {
                self.state = BurstState::Available;
                tracing::info!("burst cycle aborted");
                Ok(self.state)
            }
            other => Err(self.unexpected(other)),
        }
    }

    pub fn abort_burst(&mut self) -> BurstState {
        match self.try_abort_burst(&Deadline::none()) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "abort failed");
                BurstState::Error
            }
        }
    }

    /// Read the module's electronic serial number.
    pub fn read_esn(&mut self, deadline: &Deadline) -> Result<Esn> {
        match self.run(&Command::QueryEsn, deadline)? {
            Response::Esn(esn) => Ok(esn),
            other => Err(self.unexpected(other)),
        }
    }

    /// Serial number, or [`ESN_UNAVAILABLE`] when it cannot be read.
    pub fn get_electronic_serial_number(&mut self) -> u32 {
        match self.read_esn(&Deadline::none()) {
            Ok(esn) => esn.value(),
            Err(e) => {
                tracing::warn!(error = %e, "ESN query failed");
                ESN_UNAVAILABLE
            }
        }
    }

    /// Power-cycle the module.
    pub fn reset(&mut self) -> Result<()> {
        self.reset_with_deadline(&Deadline::none())
    }

    /// [`reset`](Self::reset) with the power-cycle waits bounded by `deadline`.
    pub fn reset_with_deadline(&mut self, deadline: &Deadline) -> Result<()> {
        self.orchestrator.reset_recovery_with_deadline(deadline)
    }

    /// Last known burst state.
    pub fn state(&self) -> BurstState {
        self.state
    }

    /// Whether initialization has run, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the last initialization succeeded.
    pub fn initialization_ok(&self) -> bool {
        self.init_ok
    }

    /// Configuration written by the last successful configure.
    pub fn module_config(&self) -> ModuleConfig {
        self.module
    }

    pub fn settings(&self) -> &LifecycleConfig {
        &self.settings
    }

    pub fn orchestrator(&self) -> &ExchangeOrchestrator<T, P, D> {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut ExchangeOrchestrator<T, P, D> {
        &mut self.orchestrator
    }

    /// Wrap in a lock for use from several threads.
    pub fn into_shared(self) -> SharedLifecycle<T, P, D> {
        Arc::new(Mutex::new(self))
    }

    /// Encode and exchange `command`. Any failure sets the cached state to
    /// [`BurstState::Error`].
    fn run(&mut self, command: &Command, deadline: &Deadline) -> Result<Response> {
        let frame = command.encode()?;
        let result = self
            .orchestrator
            .exchange(&frame, command.response_len(), self.state, deadline)
            .and_then(|response| Ok(Response::decode(&response)?));
        if result.is_err() {
            self.state = BurstState::Error;
        }
        result
    }

    fn unexpected(&mut self, response: Response) -> Stx3Error {
        self.state = BurstState::Error;
        Stx3Error::Protocol(ProtocolError::UnexpectedResponse(response.opcode()))
    }
}
