//! Serial port discovery: reads the kernel tty driver table, keeps the
//! drivers tagged `serial`, and lists the device nodes under `/dev` that
//! start with each driver's device root.

pub mod device;
pub mod driver;
pub mod error;
pub mod finder;
pub mod info;

mod cache;
#[cfg(test)]
mod testing;

pub use device::{DevDirectory, DeviceDirectory, DeviceEnumerator, DeviceNode};
pub use driver::{DriverEntry, DriverRegistry, DriverTable, ProcDriverTable};
pub use error::{Error, Result};
pub use finder::{FinderConfig, SerialPortFinder};
pub use info::{device_info, is_device_present, DeviceInfo, NodeKind};
