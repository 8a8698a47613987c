use crate::error::{FsError, Result};
use crate::paths::PathResolver;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use wfserial::v1::Storage;

/// Keeps the snapshot document in a single JSON file.
///
/// Writes go to a temp file in the same directory that is then renamed over
/// the target, so readers only ever see a complete document.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the location `resolver` points to.
    pub fn from_resolver(resolver: &PathResolver) -> Result<Self> {
        Ok(Self::new(resolver.data_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(&self, document: &str) -> Result<()> {
        if self.path.file_name().is_none() {
            return Err(FsError::NotAFile(self.path.clone()));
        }
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(document.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), bytes = document.len(), "wrote data file");
        Ok(())
    }
}

impl Storage for FileStorage {
    fn save(&self, document: &str) -> wfserial::v1::Result<()> {
        Ok(self.write(document)?)
    }

    fn load(&self) -> wfserial::v1::Result<Option<String>> {
        Ok(self.read()?)
    }
}
