mod memory;
mod fs;

pub use memory::MemoryLocaleStore;
pub use fs::FsLocaleStore;

use async_trait::async_trait;
use std::path::Path;

use crate::LocaleMap;
use crate::error::Result;

/// Where target locale files are read from and written to
#[async_trait]
pub trait LocaleStore: Send + Sync {
    async fn exists(&self, path: &Path) -> Result<bool>;

    async fn read(&self, path: &Path) -> Result<LocaleMap>;

    async fn write(&self, path: &Path, locale: &LocaleMap) -> Result<()>;

    /// Current content of `path`, or `None` on a first run
    async fn load_existing(&self, path: &Path) -> Result<Option<LocaleMap>> {
        if self.exists(path).await? {
            self.read(path).await.map(Some)
        } else {
            Ok(None)
        }
    }
}
