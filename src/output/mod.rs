//! Output artifacts - results table and reflection text.
//!
//! Both artifacts are written write-then-rename: the final path only ever
//! holds a completely written file.

mod exporter;
mod reflection;

pub use exporter::*;
pub use reflection::*;

use crate::models::{Result, SweepError};
use std::fs::{self, File};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sibling temp path used while an artifact is being written.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_temp<F>(temp: &Path, what: &str, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(temp).map_err(|e| SweepError::io(format!("creating {what}"), e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer
        .flush()
        .map_err(|e| SweepError::io(format!("flushing {what}"), e))?;
    Ok(())
}

/// Fail if an existing destination is marked read-only.
///
/// A rename would otherwise replace it regardless of its own permissions.
fn check_writable(path: &Path, what: &str) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.permissions().readonly() => Err(SweepError::io(
            format!("opening {what}"),
            io::Error::new(ErrorKind::PermissionDenied, "destination is read-only"),
        )),
        _ => Ok(()),
    }
}

/// Write an artifact to `path` atomically.
///
/// On failure the temp file is removed and `path` is left untouched.
/// A read-only destination is refused before anything is written.
pub(crate) fn write_atomic<F>(path: &Path, what: &str, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    check_writable(path, what)?;
    let temp = temp_path(path);

    if let Err(e) = write_temp(&temp, what, write) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }

    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        SweepError::io(format!("renaming {what}"), e)
    })?;

    debug!(path = %path.display(), "{what} written");
    Ok(())
}
