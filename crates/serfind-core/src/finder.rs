use crate::device::{DevDirectory, DeviceDirectory, DeviceEnumerator, DeviceNode, DEFAULT_DEVICE_DIR};
use crate::driver::{DriverEntry, DriverRegistry, DriverTable, ProcDriverTable, DEFAULT_DRIVER_TABLE};
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the finder looks for the driver table and the device nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderConfig {
    pub driver_table: PathBuf,
    pub device_dir: PathBuf,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            driver_table: PathBuf::from(DEFAULT_DRIVER_TABLE),
            device_dir: PathBuf::from(DEFAULT_DEVICE_DIR),
        }
    }
}

/// Lists serial device nodes by joining the driver table with the device
/// directory. Both are read lazily and cached for the finder's lifetime.
pub struct SerialPortFinder {
    registry: DriverRegistry,
    enumerator: DeviceEnumerator,
}

impl SerialPortFinder {
    pub fn new() -> Self {
        Self::with_config(FinderConfig::default())
    }

    pub fn with_config(cfg: FinderConfig) -> Self {
        Self::with_sources(
            ProcDriverTable::new(cfg.driver_table),
            DevDirectory::new(cfg.device_dir),
        )
    }

    pub fn with_sources(table: impl DriverTable + 'static, dir: impl DeviceDirectory + 'static) -> Self {
        Self {
            registry: DriverRegistry::new(table),
            enumerator: DeviceEnumerator::new(dir),
        }
    }

    pub fn drivers(&self) -> Result<Arc<[DriverEntry]>> {
        self.registry.drivers()
    }

    pub fn devices(&self, driver: &DriverEntry) -> Arc<[DeviceNode]> {
        self.enumerator.devices(driver)
    }

    fn collect<T>(&self, mut project: impl FnMut(&DriverEntry, &DeviceNode) -> T) -> Result<Vec<T>> {
        let mut out = Vec::new();
        for driver in self.registry.drivers()?.iter() {
            for node in self.enumerator.devices(driver).iter() {
                out.push(project(driver, node));
            }
        }
        Ok(out)
    }

    /// `"<device> (<driver>)"` for every device, driver by driver.
    pub fn try_all_devices(&self) -> Result<Vec<String>> {
        self.collect(|driver, node| format!("{} ({})", node.name(), driver.name()))
    }

    /// Absolute path of every device, in the same order as
    /// [`try_all_devices`](Self::try_all_devices).
    pub fn try_all_devices_path(&self) -> Result<Vec<PathBuf>> {
        self.collect(|_, node| node.path().to_path_buf())
    }

    /// Display names of all serial devices.
    ///
    /// An unreadable driver table is logged and reported as no devices, so
    /// this never fails. Use [`try_all_devices`](Self::try_all_devices) to
    /// tell the two apart.
    pub fn all_devices(&self) -> Vec<String> {
        self.try_all_devices().unwrap_or_else(|e| {
            log::error!("Error getting all devices: {e}");
            Vec::new()
        })
    }

    /// Paths of all serial devices; fails soft like [`all_devices`](Self::all_devices).
    pub fn all_devices_path(&self) -> Vec<PathBuf> {
        self.try_all_devices_path().unwrap_or_else(|e| {
            log::error!("Error getting device paths: {e}");
            Vec::new()
        })
    }
}

impl Default for SerialPortFinder {
    fn default() -> Self {
        Self::new()
    }
}
