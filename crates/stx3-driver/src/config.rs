//! Driver configuration, loadable from YAML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stx3_protocol::{ModuleConfig, DEFAULT_PAYLOAD_SIZE, MAX_FRAME_SIZE, MIN_FRAME_SIZE};

use crate::error::{Result, Stx3Error};
use crate::power::{NoPowerControl, PowerControl, SysfsGpio};

/// Complete driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Serial link settings.
    pub serial: SerialConfig,
    /// Configuration written to the module during initialization.
    pub module: ModuleConfig,
    /// Exchange retry and reset policy.
    pub retry: RetryPolicy,
    /// Lifecycle timing and payload size.
    pub lifecycle: LifecycleConfig,
    /// Power control line.
    pub power: PowerConfig,
}

impl DriverConfig {
    /// Parse a configuration from YAML text and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: DriverConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded driver configuration");
        Self::from_yaml_str(&text)
    }

    /// Reject settings the driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.retry.attempts == 0 {
            return Err(Stx3Error::Config(
                "retry.attempts must be at least 1".to_string(),
            ));
        }
        if self.lifecycle.payload_len == 0 {
            return Err(Stx3Error::Config(
                "lifecycle.payload_len must be at least 1".to_string(),
            ));
        }
        if MIN_FRAME_SIZE + self.lifecycle.payload_len > MAX_FRAME_SIZE {
            return Err(Stx3Error::Config(format!(
                "lifecycle.payload_len {} exceeds the {} byte frame limit",
                self.lifecycle.payload_len, MAX_FRAME_SIZE
            )));
        }
        if self.module.min_interval > self.module.max_interval {
            return Err(Stx3Error::Config(format!(
                "module.min_interval {} is greater than module.max_interval {}",
                self.module.min_interval, self.module.max_interval
            )));
        }
        Ok(())
    }
}

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0`.
    pub device: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Read timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            timeout_ms: 1000,
        }
    }
}

impl SerialConfig {
    /// Read timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Retry and reset escalation policy of an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Bounded attempts before reset recovery.
    pub attempts: u32,
    /// Wait before each bounded attempt while the module is not idle.
    pub settle_delay_ms: u64,
    /// Time the module is held unpowered during reset recovery.
    pub reset_off_ms: u64,
    /// Wait after power is restored during reset recovery.
    pub reset_on_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            settle_delay_ms: 1425,
            reset_off_ms: 100,
            reset_on_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn reset_off(&self) -> Duration {
        Duration::from_millis(self.reset_off_ms)
    }

    pub fn reset_on(&self) -> Duration {
        Duration::from_millis(self.reset_on_ms)
    }
}

/// Lifecycle timing and payload size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Exact payload size accepted by a new burst.
    pub payload_len: usize,
    /// Configure attempts made by initialization.
    pub init_attempts: u32,
    /// Wait after powering the module on.
    pub power_on_settle_ms: u64,
    /// Wait between the reset and the setup command of a configure.
    pub configure_settle_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        LifecycleConfig {
            payload_len: DEFAULT_PAYLOAD_SIZE,
            init_attempts: 3,
            power_on_settle_ms: 1000,
            configure_settle_ms: 1425,
        }
    }
}

impl LifecycleConfig {
    pub fn power_on_settle(&self) -> Duration {
        Duration::from_millis(self.power_on_settle_ms)
    }

    pub fn configure_settle(&self) -> Duration {
        Duration::from_millis(self.configure_settle_ms)
    }
}

/// Power control line of the module.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Sysfs GPIO value file. Without one the module is assumed always powered.
    pub gpio_value_path: Option<PathBuf>,
    /// Write `0` to enable and `1` to disable.
    pub active_low: bool,
}

impl PowerConfig {
    /// Build the power controller this configuration describes.
    pub fn build(&self) -> Box<dyn PowerControl + Send> {
        match &self.gpio_value_path {
            Some(path) => Box::new(SysfsGpio::new(path.clone(), self.active_low)),
            None => Box::new(NoPowerControl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_module_constants() {
        let config = DriverConfig::default();
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.module, ModuleConfig::new(2, 3, 0x3C, 0x78));
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.settle_delay(), Duration::from_millis(1425));
        assert_eq!(config.retry.reset_off(), Duration::from_millis(100));
        assert_eq!(config.retry.reset_on(), Duration::from_secs(1));
        assert_eq!(config.lifecycle.payload_len, 9);
        assert_eq!(config.power.gpio_value_path, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "
serial:
  device: /dev/ttyS3
module:
  channel: 0
  min_interval: 10
  max_interval: 20
retry:
  attempts: 5
power:
  gpio_value_path: /sys/class/gpio/gpio17/value
  active_low: true
";
        let config = DriverConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.serial.device, "/dev/ttyS3");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.module, ModuleConfig::new(0, 3, 10, 20));
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.settle_delay_ms, 1425);
        assert_eq!(config.lifecycle, LifecycleConfig::default());
        assert_eq!(
            config.power.gpio_value_path,
            Some(PathBuf::from("/sys/class/gpio/gpio17/value"))
        );
        assert!(config.power.active_low);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = DriverConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, DriverConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DriverConfig::default();
        config.retry.attempts = 0;
        assert!(matches!(config.validate(), Err(Stx3Error::Config(_))));

        let mut config = DriverConfig::default();
        config.lifecycle.payload_len = 0;
        assert!(config.validate().is_err());

        let mut config = DriverConfig::default();
        config.lifecycle.payload_len = MAX_FRAME_SIZE - MIN_FRAME_SIZE + 1;
        assert!(config.validate().is_err());
        config.lifecycle.payload_len = MAX_FRAME_SIZE - MIN_FRAME_SIZE;
        assert!(config.validate().is_ok());

        let mut config = DriverConfig::default();
        config.module.min_interval = 0x80;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_yaml_is_reported() {
        let err = DriverConfig::from_yaml_str("retry: [1, 2").unwrap_err();
        assert!(matches!(err, Stx3Error::Yaml(_)));
    }
}
