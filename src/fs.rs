use std::{fs, io, path::Path};

use crate::error::{Error, Result};

/// Filesystem access needed to persist reports.
///
/// Writes for different modules may run on several threads at once, hence the
/// `Sync` bound.
pub trait ReportFs: Sync {
    /// Recursively create `path`, succeeding if it already exists.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create or truncate the file at `path` and write `contents` to it.
    fn write_report(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdFs;

impl ReportFs for StdFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write_report(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }
}

impl<T: ReportFs> ReportFs for &T {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }

    fn write_report(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        (**self).write_report(path, contents)
    }
}

/// Make sure the output directory exists.
pub fn ensure_dir(fs: &impl ReportFs, path: &Path) -> Result<()> {
    tracing::debug!(path = %path.display(), "ensuring output directory");
    fs.create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
