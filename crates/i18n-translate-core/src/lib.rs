//! i18n Translate Core Library
//!
//! This library keeps translated locale files in sync with a source locale:
//! - Incremental diffing against previously written translations
//! - Size-bounded request batching
//! - Rate-limited dispatch in timed windows
//! - A cumulative character quota shared by the whole run

pub mod config;
pub mod diff;
pub mod error;
pub mod partition;
pub mod quota;
pub mod schedule;
pub mod store;
pub mod translator;
pub mod util;

pub use config::{
    AppConfig, Lang, LimitsConfig, NameRule, QuotaConfig, QuotaPolicy, TargetConfig,
    TranslatorConfig,
};
pub use diff::{LocaleDiff, diff};
pub use error::{Error, Result};
pub use partition::{Batch, partition};
pub use quota::QuotaTracker;
pub use schedule::{Window, run_windows, schedule};
pub use store::{FsLocaleStore, LocaleStore, MemoryLocaleStore};
pub use translator::{BatchRequest, BatchTranslator, OpenAiBatchTranslator, create_translator};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Locale content: message key to text
pub type LocaleMap = BTreeMap<String, String>;

/// Where the source strings come from
#[derive(Debug, Clone)]
pub enum SourceLocale {
    /// A JSON locale file, read through the store
    Path(PathBuf),
    /// Strings already in memory
    Inline(LocaleMap),
}

impl SourceLocale {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config
            .source_path
            .clone()
            .map(Self::Path)
            .ok_or_else(|| Error::ConfigInvalid {
                field: "source_path".to_string(),
                reason: "no source locale file configured".to_string(),
            })
    }

    async fn load(&self, store: &dyn LocaleStore) -> Result<LocaleMap> {
        match self {
            Self::Path(path) => store.read(path).await,
            Self::Inline(locale) => Ok(locale.clone()),
        }
    }
}

/// What happened to one target language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageOutcome {
    /// New entries were translated
    Translated {
        translated: usize,
        kept: usize,
        removed: usize,
    },
    /// Nothing to translate, stale keys dropped
    Pruned { removed: usize },
    /// Already up to date; the file was not touched
    Unchanged,
    /// Left untouched because the quota could not cover it
    Skipped { reason: String },
}

/// Result for a single target language
#[derive(Debug, Clone)]
pub struct LanguageReport {
    pub lang: Lang,
    pub path: PathBuf,
    pub outcome: LanguageOutcome,
    /// Final content, when it changed
    pub locale: Option<LocaleMap>,
}

/// Result of a whole run, in target language order
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub languages: Vec<LanguageReport>,
    /// Quota counter after the run
    pub quota_consumed: u64,
}

impl RunReport {
    pub fn get(&self, lang: &Lang) -> Option<&LanguageReport> {
        self.languages.iter().find(|r| &r.lang == lang)
    }
}

/// High-level locale translator that combines all components
pub struct LocaleTranslator {
    translator: Arc<dyn BatchTranslator>,
    store: Arc<dyn LocaleStore>,
    quota: Arc<QuotaTracker>,
    config: AppConfig,
}

impl LocaleTranslator {
    /// Create a new locale translator with the given configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let translator = create_translator(&config.translator)?;
        Self::with_translator(translator, config)
    }

    /// Create with a custom translator
    pub fn with_translator(translator: Arc<dyn BatchTranslator>, config: AppConfig) -> Result<Self> {
        config.validate()?;
        let quota = Arc::new(QuotaTracker::from_config(&config.quota));

        Ok(Self {
            translator,
            store: Arc::new(FsLocaleStore::new()),
            quota,
            config,
        })
    }

    /// Use a different locale store
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn LocaleStore>) -> Self {
        self.store = store;
        self
    }

    /// Share a quota tracker with other translators in this process
    #[must_use]
    pub fn with_quota(mut self, quota: Arc<QuotaTracker>) -> Self {
        self.quota = quota;
        self
    }

    /// Bring every target language up to date, one language at a time.
    ///
    /// Languages finished before a fatal failure keep their written files.
    pub async fn run(&self, source: &SourceLocale) -> Result<RunReport> {
        let source_locale = source.load(self.store.as_ref()).await?;
        let langs = &self.config.target.langs;
        let mut report = RunReport::default();

        info!(
            "Translating {} source entries into {} languages with {}",
            source_locale.len(),
            langs.len(),
            self.translator.name()
        );

        for (index, lang) in langs.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.limits.inter_language_delay()).await;
            }

            match self.translate_language(&source_locale, lang).await {
                Ok(language) => report.languages.push(language),
                Err(e)
                    if self.config.quota.on_exceeded == QuotaPolicy::Skip
                        && matches!(e.root(), Error::QuotaExceeded { .. }) =>
                {
                    warn!("Skipping {}: {}", lang, e.root());
                    report.languages.push(LanguageReport {
                        lang: lang.clone(),
                        path: self.config.target.file_path(lang),
                        outcome: LanguageOutcome::Skipped {
                            reason: e.root().to_string(),
                        },
                        locale: None,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        report.quota_consumed = self.quota.consumed();
        Ok(report)
    }

    /// Diff, translate and persist a single target language
    pub async fn translate_language(
        &self,
        source_locale: &LocaleMap,
        lang: &Lang,
    ) -> Result<LanguageReport> {
        let path = self.config.target.file_path(lang);
        self.translate_language_impl(source_locale, lang, path)
            .await
            .map_err(|e| e.for_lang(lang))
    }

    async fn translate_language_impl(
        &self,
        source_locale: &LocaleMap,
        lang: &Lang,
        path: PathBuf,
    ) -> Result<LanguageReport> {
        let existing = self.store.load_existing(&path).await?;
        let diff = diff::diff(source_locale, existing.as_ref());

        if diff.is_noop() {
            debug!("{} is up to date", lang);
            return Ok(LanguageReport {
                lang: lang.clone(),
                path,
                outcome: LanguageOutcome::Unchanged,
                locale: None,
            });
        }

        let removed = diff.removed.len();
        let kept = diff.to_keep.len();

        if diff.to_translate.is_empty() {
            info!("{}: removing {} stale keys", lang, removed);
            let locale = diff.merge(LocaleMap::new());
            self.persist(&path, &locale).await?;
            return Ok(LanguageReport {
                lang: lang.clone(),
                path,
                outcome: LanguageOutcome::Pruned { removed },
                locale: Some(locale),
            });
        }

        let limits = &self.config.limits;
        let batches = partition(&diff.to_translate, limits.max_request_length)?;
        self.quota.reserve(&diff.to_translate)?;

        let windows = schedule(batches, limits.max_requests_per_second);
        info!(
            "{}: translating {} entries in {} windows",
            lang,
            diff.to_translate.len(),
            windows.len()
        );

        let source_lang = &self.config.source_lang;
        let project_id = self.config.translator.project_id;
        let translated = run_windows(windows, limits.inter_window_delay(), |batch| {
            translator::send_batch(self.translator.as_ref(), source_lang, lang, project_id, batch)
        })
        .await?;

        let translated_count = translated.len();
        let locale = diff.merge(translated);
        self.persist(&path, &locale).await?;

        info!(
            "{}: {} translated, {} kept, {} removed",
            lang, translated_count, kept, removed
        );

        Ok(LanguageReport {
            lang: lang.clone(),
            path,
            outcome: LanguageOutcome::Translated {
                translated: translated_count,
                kept,
                removed,
            },
            locale: Some(locale),
        })
    }

    async fn persist(&self, path: &std::path::Path, locale: &LocaleMap) -> Result<()> {
        if self.config.write_files {
            self.store.write(path, locale).await
        } else {
            debug!("Dry run, not writing {}", path.display());
            Ok(())
        }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    pub fn translator_info(&self) -> translator::TranslatorInfo {
        self.translator.info()
    }
}
