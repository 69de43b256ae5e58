use async_trait::async_trait;
use crate::config::Lang;
use crate::error::Result;

/// Information about a translator backend
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    /// Human-readable name
    pub name: &'static str,
}

/// One remote request: texts to translate, in key order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub source: Lang,
    pub target: Lang,
    pub project_id: u64,
    pub texts: Vec<String>,
}

/// Trait for batch translation backends
#[async_trait]
pub trait BatchTranslator: Send + Sync {
    /// Get information about this translator
    fn info(&self) -> TranslatorInfo;

    /// Get the translator name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate every text of the request.
    ///
    /// The returned texts are aligned with `request.texts` by position.
    async fn translate_batch(&self, request: &BatchRequest) -> Result<Vec<String>>;
}
