use std::path::PathBuf;

use thiserror::Error;

use crate::config::Lang;

/// Unified error type for i18n-translate-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Content that cannot be sent (values longer than one request allows)
/// - Local character quota exhaustion
/// - Remote translation failures
/// - Locale file I/O
/// - Configuration loading and validation
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Content Errors
    // ==========================================================================
    /// A single source value is longer than one request may carry
    #[error("value for key '{key}' is {length} characters, request limit is {limit}")]
    ContentTooLong {
        key: String,
        length: usize,
        limit: usize,
    },

    // ==========================================================================
    // Quota Errors
    // ==========================================================================
    /// Translating would push the cumulative character count past the ceiling
    #[error(
        "character quota exceeded: {requested} requested, {consumed} of {ceiling} already consumed"
    )]
    QuotaExceeded {
        requested: u64,
        consumed: u64,
        ceiling: u64,
    },

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation API request failed
    #[error("translation API request failed: {0}")]
    TranslationRequest(String),

    /// Invalid response from translation API
    #[error("invalid translation API response: {0}")]
    TranslationInvalidResponse(String),

    /// Rate limited by translation API
    #[error("translation rate limited{}", retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    TranslationRateLimited { retry_after: Option<u64> },

    /// The provider returned a different number of texts than it was sent
    #[error("translation API returned {actual} texts for a batch of {expected}")]
    TranslationMisaligned { expected: usize, actual: usize },

    // ==========================================================================
    // Locale File Errors
    // ==========================================================================
    /// Failed to read a locale file
    #[error("failed to read locale file {}: {reason}", path.display())]
    LocaleRead { path: PathBuf, reason: String },

    /// Locale file is not a JSON object of strings
    #[error("failed to parse locale file {}: {reason}", path.display())]
    LocaleParse { path: PathBuf, reason: String },

    /// Failed to write a locale file
    #[error("failed to write locale file {}: {reason}", path.display())]
    LocaleWrite { path: PathBuf, reason: String },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // Context
    // ==========================================================================
    /// A failure while processing one target language
    #[error("translating '{lang}' failed: {source}")]
    Language {
        lang: Lang,
        #[source]
        source: Box<Error>,
    },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach the target language to a failure
    pub fn for_lang(self, lang: &Lang) -> Self {
        match self {
            already @ Self::Language { .. } => already,
            other => Self::Language {
                lang: lang.clone(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying failure, without language context
    pub fn root(&self) -> &Self {
        match self {
            Self::Language { source, .. } => source.root(),
            other => other,
        }
    }

    /// Language the failure occurred in, if known
    pub fn lang(&self) -> Option<&Lang> {
        match self {
            Self::Language { lang, .. } => Some(lang),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_context_wraps_once() {
        let lang = Lang::new("fr");
        let err = Error::TranslationRequest("boom".into())
            .for_lang(&lang)
            .for_lang(&Lang::new("de"));

        assert_eq!(err.lang(), Some(&lang));
        assert!(matches!(err.root(), Error::TranslationRequest(msg) if msg == "boom"));
    }

    #[test]
    fn test_content_too_long_names_key() {
        let err = Error::ContentTooLong {
            key: "greeting".into(),
            length: 5,
            limit: 4,
        };
        assert!(err.to_string().contains("'greeting'"));
    }
}
