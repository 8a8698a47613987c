use std::path::PathBuf;
use thiserror::Error;
use wfserial::v1::StoreError;

pub type Result<T> = std::result::Result<T, FsError>;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Home directory not found")]
    NoHomeDirectory,

    #[error("Data file path does not name a file: {0}")]
    NotAFile(PathBuf),
}

impl From<FsError> for StoreError {
    fn from(e: FsError) -> Self {
        match e {
            FsError::Io(io) => StoreError::Io(io),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
