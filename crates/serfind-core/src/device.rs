//! Device nodes belonging to a driver, found by prefix-matching the children
//! of the device directory.

use crate::cache::PopulateOnce;
use crate::driver::DriverEntry;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_DEVICE_DIR: &str = "/dev";

/// A direct child of the device directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceNode {
    path: PathBuf,
    name: String,
}

impl DeviceNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    /// Absolute path, e.g. `/dev/ttyUSB0`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, e.g. `ttyUSB0`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-sensitive string prefix test. `Path::starts_with` compares whole
    /// components and would not match `/dev/ttyUSB0` against `/dev/ttyUSB`.
    pub fn belongs_to(&self, driver: &DriverEntry) -> bool {
        self.path.to_string_lossy().starts_with(driver.device_root())
    }
}

/// Source of device directory listings.
pub trait DeviceDirectory: Send + Sync {
    fn location(&self) -> &Path;

    /// Absolute paths of the direct children, in listing order.
    fn list(&self) -> io::Result<Vec<PathBuf>>;
}

/// The device directory on the local filesystem. No recursion.
#[derive(Debug, Clone)]
pub struct DevDirectory {
    path: PathBuf,
}

impl DevDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for DevDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_DIR)
    }
}

impl DeviceDirectory for DevDirectory {
    fn location(&self) -> &Path {
        &self.path
    }

    fn list(&self) -> io::Result<Vec<PathBuf>> {
        let dir = if self.path.is_absolute() {
            self.path.clone()
        } else {
            std::env::current_dir()?.join(&self.path)
        };

        let entries = fs::read_dir(&dir)?
            .filter_map(|entry| match entry {
                Ok(entry) => Some(dir.join(entry.file_name())),
                Err(e) => {
                    log::trace!("skipping unreadable entry in {}: {e}", dir.display());
                    None
                }
            })
            .collect();
        Ok(entries)
    }
}

/// Per-driver device lists, each computed at most once.
pub struct DeviceEnumerator {
    dir: Box<dyn DeviceDirectory>,
    slots: Mutex<HashMap<DriverEntry, Arc<PopulateOnce<[DeviceNode]>>>>,
}

impl DeviceEnumerator {
    pub fn new(dir: impl DeviceDirectory + 'static) -> Self {
        Self {
            dir: Box::new(dir),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Device nodes whose path starts with the driver's device root, in
    /// listing order.
    ///
    /// The directory is listed on the first successful call for `driver`;
    /// later calls return the same cached slice. A failed listing caches
    /// nothing.
    pub fn try_devices(&self, driver: &DriverEntry) -> Result<Arc<[DeviceNode]>> {
        // The map lock only covers slot lookup so drivers populate independently.
        let slot = Arc::clone(self.slots.lock().entry(driver.clone()).or_default());

        slot.get_or_try_populate(|| {
            let paths = self.dir.list().map_err(|source| Error::DirectoryUnlistable {
                path: self.dir.location().to_path_buf(),
                source,
            })?;

            let devices: Vec<DeviceNode> = paths
                .into_iter()
                .map(DeviceNode::new)
                .filter(|node| node.belongs_to(driver))
                .inspect(|node| log::debug!("Found new device: {}", node.path.display()))
                .collect();
            Ok(Arc::from(devices))
        })
    }

    /// Like [`try_devices`](Self::try_devices), but an unlistable directory
    /// yields an empty list.
    pub fn devices(&self, driver: &DriverEntry) -> Arc<[DeviceNode]> {
        self.try_devices(driver).unwrap_or_else(|e| {
            log::warn!("no devices for driver {}: {e}", driver.name());
            Arc::from(Vec::new())
        })
    }

    pub fn location(&self) -> &Path {
        self.dir.location()
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new(DevDirectory::default())
    }
}
