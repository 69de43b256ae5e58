use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use super::LocaleStore;
use crate::LocaleMap;
use crate::error::{Error, Result};

/// Locale files as pretty-printed JSON objects on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLocaleStore;

impl FsLocaleStore {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LocaleStore for FsLocaleStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        tokio::fs::try_exists(path).await.map_err(|e| Error::LocaleRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    async fn read(&self, path: &Path) -> Result<LocaleMap> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| Error::LocaleRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| Error::LocaleParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    async fn write(&self, path: &Path, locale: &LocaleMap) -> Result<()> {
        let write_err = |reason: String| Error::LocaleWrite {
            path: path.to_path_buf(),
            reason,
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_err(format!("failed to create {}: {e}", parent.display())))?;
        }

        let mut content = serde_json::to_string_pretty(locale).map_err(|e| write_err(e.to_string()))?;
        content.push('\n');

        tokio::fs::write(path, content)
            .await
            .map_err(|e| write_err(e.to_string()))?;

        debug!("Wrote {} entries to {}", locale.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fr.json");
        let store = FsLocaleStore::new();

        assert_eq!(store.load_existing(&path).await.unwrap(), None);

        let locale: LocaleMap = [("greeting".to_string(), "Bonjour".to_string())].into();
        store.write(&path, &locale).await.unwrap();

        assert!(store.exists(&path).await.unwrap());
        assert_eq!(store.load_existing(&path).await.unwrap(), Some(locale));
    }

    #[tokio::test]
    async fn test_non_string_values_fail_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("de.json");
        std::fs::write(&path, r#"{"a": {"nested": "x"}}"#).unwrap();

        let err = FsLocaleStore::new().read(&path).await.unwrap_err();
        assert!(matches!(err, Error::LocaleParse { .. }));
    }
}
