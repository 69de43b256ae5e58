use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::LocaleStore;
use crate::LocaleMap;
use crate::error::{Error, Result};

/// In-process locale files, for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryLocaleStore {
    files: RwLock<HashMap<PathBuf, LocaleMap>>,
    writes: AtomicUsize,
}

impl MemoryLocaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, as if written by an earlier run
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, locale: LocaleMap) -> Self {
        self.files.get_mut().insert(path.into(), locale);
        self
    }

    pub async fn get(&self, path: &Path) -> Option<LocaleMap> {
        self.files.read().await.get(path).cloned()
    }

    /// Number of writes performed through the store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocaleStore for MemoryLocaleStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.read().await.contains_key(path))
    }

    async fn read(&self, path: &Path) -> Result<LocaleMap> {
        self.get(path).await.ok_or_else(|| Error::LocaleRead {
            path: path.to_path_buf(),
            reason: "no such file".to_string(),
        })
    }

    async fn write(&self, path: &Path, locale: &LocaleMap) -> Result<()> {
        self.files
            .write()
            .await
            .insert(path.to_path_buf(), locale.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
