//! In-memory sources that count how often they are hit.

use crate::device::DeviceDirectory;
use crate::driver::DriverTable;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Formats a row the way the kernel lays out the driver table.
pub fn table_row(name: &str, root: &str, major: &str, minors: &str, kind: &str) -> String {
    format!("{name:<20} {root:<20} {major:>3} {minors:<7} {kind}")
}

pub struct MemoryTable {
    text: String,
    fail_at_end: bool,
    reads: Counter,
}

impl MemoryTable {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fail_at_end: false,
            reads: Counter::default(),
        }
    }

    /// Yields `text`, then fails the read that follows it.
    pub fn failing_after(text: impl Into<String>) -> Self {
        Self {
            fail_at_end: true,
            ..Self::new(text)
        }
    }

    pub fn reads(&self) -> Counter {
        self.reads.clone()
    }
}

struct FailAtEnd(Cursor<Vec<u8>>);

impl Read for FailAtEnd {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::Other, "device went away")),
            n => Ok(n),
        }
    }
}

impl DriverTable for MemoryTable {
    fn location(&self) -> &Path {
        Path::new("memory://drivers")
    }

    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        self.reads.bump();
        if self.fail_at_end {
            let reader = FailAtEnd(Cursor::new(self.text.clone().into_bytes()));
            Ok(Box::new(BufReader::new(reader)))
        } else {
            Ok(Box::new(self.text.as_bytes()))
        }
    }
}

pub struct MemoryDirectory {
    path: PathBuf,
    entries: Option<Vec<PathBuf>>,
    listings: Counter,
}

impl MemoryDirectory {
    /// A directory at `path` whose children are `names`, in that order.
    pub fn new(path: &str, names: &[&str]) -> Self {
        let path = PathBuf::from(path);
        let entries = names.iter().map(|name| path.join(name)).collect();
        Self {
            path,
            entries: Some(entries),
            listings: Counter::default(),
        }
    }

    /// A directory whose listing always fails.
    pub fn unlistable(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
            entries: None,
            listings: Counter::default(),
        }
    }

    pub fn listings(&self) -> Counter {
        self.listings.clone()
    }
}

impl DeviceDirectory for MemoryDirectory {
    fn location(&self) -> &Path {
        &self.path
    }

    fn list(&self) -> io::Result<Vec<PathBuf>> {
        self.listings.bump();
        self.entries
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "listing refused"))
    }
}
