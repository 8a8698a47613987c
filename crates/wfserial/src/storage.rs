use crate::error::Result;
use std::sync::{Arc, Mutex, PoisonError};

/// Where the engine keeps its single snapshot document.
///
/// `save` overwrites the whole document (last writer wins) and `load`
/// returns `None` when nothing has been saved yet. Neither needs to be atomic
/// or versioned: the engine only calls them from its own `&mut self`
/// operations, one at a time.
pub trait Storage {
    fn save(&self, document: &str) -> Result<()>;
    fn load(&self) -> Result<Option<String>>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn save(&self, document: &str) -> Result<()> {
        (**self).save(document)
    }

    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn save(&self, document: &str) -> Result<()> {
        (**self).save(document)
    }

    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }
}

/// In-memory storage.
///
/// Clones share the same document, so a caller can hand one clone to an
/// engine and keep another to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    document: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `document`, as if saved by a previous run.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Arc::new(Mutex::new(Some(document.into()))),
        }
    }

    /// The last document written, if any.
    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, document: &str) -> Result<()> {
        *self.document.lock().unwrap_or_else(PoisonError::into_inner) = Some(document.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        Ok(self.document())
    }
}
