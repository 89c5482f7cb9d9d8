//! Driver table parsing (`/proc/tty/drivers`) and the cached registry built
//! from it.

use crate::cache::PopulateOnce;
use crate::error::{Error, Result};
use encoding_rs::UTF_8;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_DRIVER_TABLE: &str = "/proc/tty/drivers";

/// Width of the driver name column. Names may contain spaces, so the name is
/// cut from this fixed-width field and never from the token list.
pub const NAME_FIELD_WIDTH: usize = 0x15;

/// Type tag in the last column marking a serial driver.
pub const SERIAL_TAG: &str = "serial";

const MIN_TOKENS: usize = 5;

/// Position of the device root column, counted from the end of the row.
const DEVICE_ROOT_FROM_END: usize = 4;

/// A serial driver row from the driver table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DriverEntry {
    name: String,
    device_root: String,
}

impl DriverEntry {
    pub fn new(name: impl Into<String>, device_root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_root: device_root.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path prefix shared by every device node of this driver, e.g. `/dev/ttyUSB`.
    pub fn device_root(&self) -> &str {
        &self.device_root
    }
}

/// Parses one driver table row, returning `None` for rows that are not
/// serial drivers.
pub fn parse_line(line: &str) -> Option<DriverEntry> {
    let tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.len() < MIN_TOKENS || tokens[tokens.len() - 1] != SERIAL_TAG {
        return None;
    }

    let name_end = line
        .char_indices()
        .nth(NAME_FIELD_WIDTH)
        .map_or(line.len(), |(i, _)| i);
    let name = line[..name_end].trim();

    Some(DriverEntry::new(name, tokens[tokens.len() - DEVICE_ROOT_FROM_END]))
}

/// Reads every row of `reader` and keeps the serial drivers, in table order.
pub fn parse_table<R: BufRead>(mut reader: R) -> io::Result<Vec<DriverEntry>> {
    let mut drivers = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let (line, _) = UTF_8.decode_without_bom_handling(&buf);
        let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
        if let Some(driver) = parse_line(line) {
            log::debug!("Found new driver {} on {}", driver.name, driver.device_root);
            drivers.push(driver);
        }
    }

    Ok(drivers)
}

/// Source of driver table rows.
pub trait DriverTable: Send + Sync {
    /// Where the table lives, used in error reports.
    fn location(&self) -> &Path;

    fn open(&self) -> io::Result<Box<dyn BufRead + '_>>;
}

/// The driver table on the local filesystem.
#[derive(Debug, Clone)]
pub struct ProcDriverTable {
    path: PathBuf,
}

impl ProcDriverTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcDriverTable {
    fn default() -> Self {
        Self::new(DEFAULT_DRIVER_TABLE)
    }
}

impl DriverTable for ProcDriverTable {
    fn location(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(File::open(&self.path)?)))
    }
}

/// Serial drivers listed in the driver table, read once and cached.
pub struct DriverRegistry {
    table: Box<dyn DriverTable>,
    drivers: PopulateOnce<[DriverEntry]>,
}

impl DriverRegistry {
    pub fn new(table: impl DriverTable + 'static) -> Self {
        Self {
            table: Box::new(table),
            drivers: PopulateOnce::new(),
        }
    }

    /// Serial drivers in table order.
    ///
    /// The table is read on the first successful call only; later calls
    /// return the same cached slice. A failed read caches nothing, so the
    /// next call reads the table again.
    pub fn drivers(&self) -> Result<Arc<[DriverEntry]>> {
        self.drivers.get_or_try_populate(|| {
            let unreadable = |source| Error::SourceUnreadable {
                path: self.table.location().to_path_buf(),
                source,
            };
            // The reader is dropped before returning on both paths.
            let reader = self.table.open().map_err(unreadable)?;
            let drivers = parse_table(reader).map_err(unreadable)?;
            Ok(Arc::from(drivers))
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.drivers.is_populated()
    }

    pub fn location(&self) -> &Path {
        self.table.location()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new(ProcDriverTable::default())
    }
}
