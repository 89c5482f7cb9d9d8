//! Metadata about a device path, for callers deciding which discovered node
//! to hand to the serial I/O layer. Nothing here opens the device.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    CharDevice,
    BlockDevice,
    Other,
}

impl NodeKind {
    fn of(file_type: fs::FileType) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if file_type.is_char_device() {
                return Self::CharDevice;
            }
            if file_type.is_block_device() {
                return Self::BlockDevice;
            }
        }

        if file_type.is_file() {
            Self::File
        } else if file_type.is_dir() {
            Self::Directory
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::CharDevice => "char-device",
            Self::BlockDevice => "block-device",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
    pub readable: bool,
    pub writable: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub kind: NodeKind,
}

/// Inspects `path` without opening it. Returns `None` if it does not exist
/// or its metadata cannot be read.
pub fn device_info(path: impl AsRef<Path>) -> Option<DeviceInfo> {
    let path = path.as_ref();
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            log::debug!("no metadata for {}: {e}", path.display());
            return None;
        }
    };

    Some(DeviceInfo {
        path: path.to_path_buf(),
        name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        readable: access::readable(path),
        writable: access::writable(path, &meta),
        size: meta.len(),
        modified: meta.modified().ok(),
        kind: NodeKind::of(meta.file_type()),
    })
}

/// Whether `path` currently exists. A present node may still be unusable.
pub fn is_device_present(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

#[cfg(unix)]
mod access {
    use std::ffi::CString;
    use std::fs::Metadata;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    fn check(path: &Path, mode: libc::c_int) -> bool {
        let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
            return false;
        };
        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
    }

    pub fn readable(path: &Path) -> bool {
        check(path, libc::R_OK)
    }

    pub fn writable(path: &Path, _meta: &Metadata) -> bool {
        check(path, libc::W_OK)
    }
}

#[cfg(not(unix))]
mod access {
    use std::fs::Metadata;
    use std::path::Path;

    pub fn readable(_path: &Path) -> bool {
        true
    }

    pub fn writable(_path: &Path, meta: &Metadata) -> bool {
        !meta.permissions().readonly()
    }
}
