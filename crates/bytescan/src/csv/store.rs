//! Persistence collaborators for [`super::CsvTable`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Somewhere a serialized table can be read from and written to as a whole.
pub trait TableStore {
    /// Returns every stored byte.
    ///
    /// # Errors
    ///
    /// Any I/O failure of the backing store.
    fn read_all(&mut self) -> io::Result<Vec<u8>>;

    /// Replaces the stored bytes with `bytes`.
    ///
    /// # Errors
    ///
    /// Any I/O failure of the backing store.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// A table stored in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// A store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableStore for FileStore {
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        fs::write(&self.path, bytes)
    }
}

/// An in-memory store, handy for tests and for tables embedded elsewhere.
impl TableStore for Vec<u8> {
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        Ok(self.clone())
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.clear();
        self.extend_from_slice(bytes);
        Ok(())
    }
}
