use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Language codes as understood by the translation provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn default_source_lang() -> Lang {
    Lang::new(DEFAULT_SOURCE_LANG)
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// File naming rule for target locale files.
///
/// Every `{lang}` in the pattern is replaced by the language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameRule(String);

impl NameRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn file_name(&self, lang: &Lang) -> String {
        self.0.replace("{lang}", lang.as_str())
    }

    pub fn pattern(&self) -> &str {
        &self.0
    }
}

impl Default for NameRule {
    fn default() -> Self {
        Self::new("{lang}.json")
    }
}

/// Where translated locale files live and which languages to produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Output directory for target locale files
    #[serde(default = "default_target_path")]
    pub path: PathBuf,

    /// Target languages, processed in order
    #[serde(default)]
    pub langs: Vec<Lang>,

    /// File name pattern, e.g. `{lang}.json`
    #[serde(default)]
    pub file_name: NameRule,
}

fn default_target_path() -> PathBuf {
    PathBuf::from("locales")
}

impl TargetConfig {
    pub fn new(path: impl Into<PathBuf>, langs: impl IntoIterator<Item = Lang>) -> Self {
        Self {
            path: path.into(),
            langs: langs.into_iter().collect(),
            file_name: NameRule::default(),
        }
    }

    /// Full path of the locale file for `lang`
    pub fn file_path(&self, lang: &Lang) -> PathBuf {
        self.path.join(self.file_name.file_name(lang))
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::new(default_target_path(), Vec::new())
    }
}

/// Translator backend configuration for OpenAI-compatible APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Provider project identifier, forwarded with every batch
    #[serde(default)]
    pub project_id: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TranslatorConfig {
    /// Create a new translator config
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            model: model.into(),
            project_id: 0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/v1", None, "default_model")
    }
}

/// Request sizing and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum summed character length of one request
    #[serde(default = "default_max_request_length")]
    pub max_request_length: usize,

    /// Requests fired together in one window
    #[serde(default = "default_max_requests_per_second")]
    pub max_requests_per_second: usize,

    /// Spacing between window starts, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub inter_window_delay_ms: u64,

    /// Pause between finishing one language and starting the next
    #[serde(default = "default_delay_ms")]
    pub inter_language_delay_ms: u64,
}

const fn default_max_request_length() -> usize {
    2000
}

const fn default_max_requests_per_second() -> usize {
    5
}

const fn default_delay_ms() -> u64 {
    1100
}

impl LimitsConfig {
    pub const fn inter_window_delay(&self) -> Duration {
        Duration::from_millis(self.inter_window_delay_ms)
    }

    pub const fn inter_language_delay(&self) -> Duration {
        Duration::from_millis(self.inter_language_delay_ms)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_length: default_max_request_length(),
            max_requests_per_second: default_max_requests_per_second(),
            inter_window_delay_ms: default_delay_ms(),
            inter_language_delay_ms: default_delay_ms(),
        }
    }
}

/// What to do with a language whose pending text does not fit the quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaPolicy {
    /// Stop the whole run
    #[default]
    Abort,
    /// Leave the language untouched and continue with the next one
    Skip,
}

/// Character quota configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Character ceiling for the run (absent = unbounded)
    #[serde(default)]
    pub ceiling: Option<u64>,

    /// Characters already consumed before this run
    #[serde(default)]
    pub consumed: u64,

    #[serde(default)]
    pub on_exceeded: QuotaPolicy,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language of the source locale
    #[serde(default = "default_source_lang")]
    pub source_lang: Lang,

    /// Source locale JSON file
    #[serde(default)]
    pub source_path: Option<PathBuf>,

    #[serde(default)]
    pub target: TargetConfig,

    /// Translator backend configuration
    #[serde(default)]
    pub translator: TranslatorConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub quota: QuotaConfig,

    /// Persist target locale files (false = dry run)
    #[serde(default = "default_true")]
    pub write_files: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            source_path: None,
            target: TargetConfig::default(),
            translator: TranslatorConfig::default(),
            limits: LimitsConfig::default(),
            quota: QuotaConfig::default(),
            write_files: true,
        }
    }
}

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "i18n-translate.toml";
/// Environment variable overriding `translator.api_key`
pub const ENV_API_KEY: &str = "I18N_TRANSLATE_API_KEY";
/// Environment variable overriding `translator.api_base`
pub const ENV_API_BASE: &str = "I18N_TRANSLATE_API_BASE";

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))
    }

    /// Load from default locations (~/.config/i18n-translate/config.toml, ./i18n-translate.toml)
    pub fn load() -> Self {
        let user_config = crate::util::config_dir()
            .map(|dir| dir.join("i18n-translate").join("config.toml"));
        Self::load_from([user_config, Some(PathBuf::from(LOCAL_CONFIG_FILE))].into_iter().flatten())
    }

    /// First candidate file that exists and parses, otherwise defaults
    pub fn load_from(candidates: impl IntoIterator<Item = PathBuf>) -> Self {
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", path.display(), e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }

    /// Override translator credentials from the environment
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Override translator credentials from `lookup`, keyed by variable name
    #[must_use]
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.translator.api_key = Some(key);
        }
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
            self.translator.api_base = base;
        }
        self
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_request_length == 0 {
            return Err(invalid("limits.max_request_length", "must be greater than 0"));
        }
        if self.limits.max_requests_per_second == 0 {
            return Err(invalid(
                "limits.max_requests_per_second",
                "must be greater than 0",
            ));
        }
        if self.target.langs.is_empty() {
            return Err(invalid("target.langs", "at least one language is required"));
        }
        if !self.target.file_name.pattern().contains("{lang}") && self.target.langs.len() > 1 {
            return Err(invalid(
                "target.file_name",
                "must contain {lang} when translating into several languages",
            ));
        }
        if let Some(ceiling) = self.quota.ceiling
            && self.quota.consumed > ceiling
        {
            return Err(invalid("quota.consumed", "already exceeds quota.ceiling"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::ConfigInvalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Default source language code
pub const DEFAULT_SOURCE_LANG: &str = "zh";
