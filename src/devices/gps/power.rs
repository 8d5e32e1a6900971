use log::{debug, info};
use std::fs;
use std::path::PathBuf;

use crate::utils::error::GnssError;

/// Enable line of the receiver. Toggled once when the driver starts and
/// once when it stops.
pub trait PowerControl {
    fn power_on(&mut self) -> Result<(), GnssError>;
    fn power_off(&mut self) -> Result<(), GnssError>;
}

/// Receiver is powered by other means.
#[derive(Debug, Default)]
pub struct NoPowerControl;

impl PowerControl for NoPowerControl {
    fn power_on(&mut self) -> Result<(), GnssError> {
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), GnssError> {
        Ok(())
    }
}

/// Output line driven through the Linux sysfs GPIO interface.
#[derive(Debug)]
pub struct SysfsGpio {
    line: u32,
    root: PathBuf,
    exported: bool,
}

impl SysfsGpio {
    pub fn new(line: u32) -> Self {
        Self::with_root(line, "/sys/class/gpio")
    }

    pub fn with_root(line: u32, root: impl Into<PathBuf>) -> Self {
        Self {
            line,
            root: root.into(),
            exported: false,
        }
    }

    fn line_dir(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.line))
    }

    fn write(&self, path: PathBuf, value: &str) -> Result<(), GnssError> {
        fs::write(&path, value).map_err(|e| {
            GnssError::PowerControlError(format!("Failed to write '{}' to {}: {}", value, path.display(), e))
        })
    }

    fn ensure_output(&mut self) -> Result<(), GnssError> {
        if self.exported {
            return Ok(());
        }
        if !self.line_dir().exists() {
            debug!("Exporting GPIO {}", self.line);
            self.write(self.root.join("export"), &self.line.to_string())?;
        }
        self.write(self.line_dir().join("direction"), "out")?;
        self.exported = true;
        Ok(())
    }

    fn set(&mut self, high: bool) -> Result<(), GnssError> {
        self.ensure_output()?;
        self.write(self.line_dir().join("value"), if high { "1" } else { "0" })
    }
}

impl PowerControl for SysfsGpio {
    fn power_on(&mut self) -> Result<(), GnssError> {
        info!("🔋 Powering GNSS receiver on (GPIO {})", self.line);
        self.set(true)
    }

    fn power_off(&mut self) -> Result<(), GnssError> {
        info!("🔋 Powering GNSS receiver off (GPIO {})", self.line);
        self.set(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("panthyr_gnss_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("gpio8")).unwrap();
        root
    }

    #[test]
    fn test_sysfs_gpio_toggles_value() {
        let root = scratch_root("toggle");
        let mut gpio = SysfsGpio::with_root(8, &root);

        gpio.power_on().unwrap();
        assert_eq!(fs::read_to_string(root.join("gpio8/direction")).unwrap(), "out");
        assert_eq!(fs::read_to_string(root.join("gpio8/value")).unwrap(), "1");

        gpio.power_off().unwrap();
        assert_eq!(fs::read_to_string(root.join("gpio8/value")).unwrap(), "0");

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_line_is_an_error() {
        let root = std::env::temp_dir().join(format!("panthyr_gnss_missing_{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        let mut gpio = SysfsGpio::with_root(3, &root);
        assert!(matches!(gpio.power_on(), Err(GnssError::PowerControlError(_))));
    }
}
