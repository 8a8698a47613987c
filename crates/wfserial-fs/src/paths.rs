use crate::error::{FsError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that relocates the data directory.
pub const DATA_DIR_ENV: &str = "WFSERIAL_HOME";

const DATA_FILE_NAME: &str = "data.json";

/// Resolves where the snapshot document lives.
///
/// Lookup order for the file: an explicit [`PathResolver::with_data_file`],
/// then `data.json` inside the data directory. The data directory is an
/// explicit [`PathResolver::with_data_dir`], then `$WFSERIAL_HOME`, then
/// `$HOME/Documents/WFSerial`.
#[derive(Debug, Clone)]
pub struct PathResolver {
    home_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    data_file: Option<PathBuf>,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PathResolver {
    pub fn new() -> Self {
        Self {
            home_dir: dirs::home_dir(),
            data_dir: env::var_os(DATA_DIR_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            data_file: None,
        }
    }

    pub fn with_home<P: Into<PathBuf>>(mut self, home: P) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    pub fn with_data_dir<P: Into<PathBuf>>(mut self, data_dir: P) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    pub fn with_data_file<P: Into<PathBuf>>(mut self, data_file: P) -> Self {
        self.data_file = Some(data_file.into());
        self
    }

    pub fn home_dir(&self) -> Result<&Path> {
        self.home_dir.as_deref().ok_or(FsError::NoHomeDirectory)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref data_dir) = self.data_dir {
            return Ok(data_dir.clone());
        }

        let home = self.home_dir()?;
        Ok(home.join("Documents").join("WFSerial"))
    }

    pub fn data_file(&self) -> Result<PathBuf> {
        if let Some(ref data_file) = self.data_file {
            return Ok(data_file.clone());
        }
        Ok(self.data_dir()?.join(DATA_FILE_NAME))
    }

    pub fn exists(&self) -> bool {
        self.data_file().map(|p| p.exists()).unwrap_or(false)
    }
}

mod dirs {
    use super::*;

    pub fn home_dir() -> Option<PathBuf> {
        env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map(PathBuf::from)
    }
}
