//! Utility functions shared across the crate.

use std::ffi::OsString;
use std::path::PathBuf;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    config_dir_from(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
}

fn config_dir_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|home| PathBuf::from(home).join(".config")))
}

/// Length of a text as billed by the provider: characters, not bytes.
pub fn text_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_prefers_xdg() {
        assert_eq!(
            config_dir_from(Some("/xdg".into()), Some("/home/me".into())),
            Some(PathBuf::from("/xdg"))
        );
    }

    #[test]
    fn test_config_dir_falls_back_to_home() {
        assert_eq!(
            config_dir_from(Some(OsString::new()), Some("/home/me".into())),
            Some(PathBuf::from("/home/me").join(".config"))
        );
        assert_eq!(config_dir_from(None, None), None);
    }

    #[test]
    fn test_text_len_counts_chars() {
        assert_eq!(text_len("Hello"), 5);
        assert_eq!(text_len("你好"), 2);
        assert_eq!(text_len(""), 0);
    }
}
