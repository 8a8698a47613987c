#![doc = include_str!("../README.md")]

pub mod error;
pub mod paths;
pub mod storage;

pub use error::{FsError, Result};
pub use paths::{DATA_DIR_ENV, PathResolver};
pub use storage::FileStorage;

/// Opens storage at the default location.
///
/// Equivalent to `FileStorage::from_resolver(&PathResolver::new())`.
///
/// # Example
///
/// ```rust
/// use wfserial_fs::{FileStorage, PathResolver};
///
/// let resolver = PathResolver::new().with_data_dir("/tmp/wfserial-doc");
/// let storage = FileStorage::from_resolver(&resolver).unwrap();
/// assert!(storage.path().ends_with("data.json"));
/// ```
pub fn default_storage() -> Result<FileStorage> {
    FileStorage::from_resolver(&PathResolver::new())
}
