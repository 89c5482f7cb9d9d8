use std::io;
use std::path::PathBuf;

/// Failures surfaced by the lower-level discovery operations.
///
/// The facade collapses both variants into an empty listing, see
/// [`SerialPortFinder::all_devices`](crate::SerialPortFinder::all_devices).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("driver table {} is unreadable: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("device directory {} cannot be listed: {source}", path.display())]
    DirectoryUnlistable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
