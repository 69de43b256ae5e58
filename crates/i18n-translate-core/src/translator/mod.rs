mod traits;
mod openai;

pub use traits::{BatchRequest, BatchTranslator, TranslatorInfo};
pub use openai::OpenAiBatchTranslator;

use crate::LocaleMap;
use crate::config::{Lang, TranslatorConfig};
use crate::error::{Error, Result};
use crate::partition::Batch;
use std::sync::Arc;
use tracing::debug;

/// Create a translator from configuration
pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn BatchTranslator>> {
    let translator = OpenAiBatchTranslator::new(
        config.api_base.clone(),
        config.api_key.clone(),
        config.model.clone(),
        config.timeout_secs,
    )?;

    Ok(Arc::new(translator))
}

/// Translate one batch and map the results back onto its keys
pub async fn send_batch(
    translator: &dyn BatchTranslator,
    source: &Lang,
    target: &Lang,
    project_id: u64,
    batch: Batch,
) -> Result<LocaleMap> {
    let (keys, texts): (Vec<String>, Vec<String>) = batch.into_entries().into_iter().unzip();

    debug!("Sending {} texts to {} ({} -> {})", texts.len(), translator.name(), source, target);

    let request = BatchRequest {
        source: source.clone(),
        target: target.clone(),
        project_id,
        texts,
    };
    let translated = translator.translate_batch(&request).await?;

    if translated.len() != keys.len() {
        return Err(Error::TranslationMisaligned {
            expected: keys.len(),
            actual: translated.len(),
        });
    }

    Ok(keys.into_iter().zip(translated).collect())
}
