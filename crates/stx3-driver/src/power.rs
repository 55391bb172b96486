//! Module power control.

use std::io;
use std::path::{Path, PathBuf};

/// Switches the module's supply.
pub trait PowerControl {
    fn enable(&mut self) -> io::Result<()>;
    fn disable(&mut self) -> io::Result<()>;
}

impl<T: PowerControl + ?Sized> PowerControl for &mut T {
    fn enable(&mut self) -> io::Result<()> {
        (**self).enable()
    }

    fn disable(&mut self) -> io::Result<()> {
        (**self).disable()
    }
}

impl<T: PowerControl + ?Sized> PowerControl for Box<T> {
    fn enable(&mut self) -> io::Result<()> {
        (**self).enable()
    }

    fn disable(&mut self) -> io::Result<()> {
        (**self).disable()
    }
}

/// For a permanently powered module. Reset recovery then only waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPowerControl;

impl PowerControl for NoPowerControl {
    fn enable(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn disable(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Drives an exported sysfs GPIO line through its `value` file.
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    value_path: PathBuf,
    active_low: bool,
}

impl SysfsGpio {
    pub fn new(value_path: impl Into<PathBuf>, active_low: bool) -> Self {
        SysfsGpio {
            value_path: value_path.into(),
            active_low,
        }
    }

    pub fn value_path(&self) -> &Path {
        &self.value_path
    }

    fn set(&mut self, on: bool) -> io::Result<()> {
        let level = if on != self.active_low { "1" } else { "0" };
        tracing::debug!(path = %self.value_path.display(), level, "setting module power");
        std::fs::write(&self.value_path, level)
    }
}

impl PowerControl for SysfsGpio {
    fn enable(&mut self) -> io::Result<()> {
        self.set(true)
    }

    fn disable(&mut self) -> io::Result<()> {
        self.set(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stx3-gpio-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_sysfs_gpio_levels() {
        let path = scratch_file("high");
        let mut gpio = SysfsGpio::new(&path, false);

        gpio.enable().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1");
        gpio.disable().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_sysfs_gpio_active_low() {
        let path = scratch_file("low");
        let mut gpio = SysfsGpio::new(&path, true);

        gpio.enable().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0");
        gpio.disable().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_sysfs_gpio_missing_directory() {
        let mut gpio = SysfsGpio::new("/nonexistent/stx3/gpio/value", false);
        assert!(gpio.enable().is_err());
    }
}
