//! # Settings Loader
//!
//! Centralized settings loading for the offer ingestion tools. Settings live in a
//! JSON file (by default `settings.json` in the working directory) and control where
//! institution exports are discovered, how the header sniffer behaves and how many
//! assets the selector keeps per bucket.
//!
//! Every field is optional in the file; anything left out takes the value from
//! `Settings::default()`.
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! // Load settings from a specific path
//! let settings = settings_loader::load_settings("config/offers.json")?;
//!
//! // Load optional settings (returns None if no path is given)
//! let path = Some(PathBuf::from("settings.json"));
//! let settings = settings_loader::load_optional_settings(path.as_ref())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use models::Settings;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Loads settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    validate(&settings).with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(settings)
}

/// Loads settings from the default location (settings.json in the current directory)
pub fn load_default_settings() -> Result<Settings> {
    load_settings(DEFAULT_SETTINGS_FILE)
}

/// Loads settings from an optional path, returning None if no path is provided
pub fn load_optional_settings(path: Option<&PathBuf>) -> Result<Option<Settings>> {
    match path {
        Some(settings_path) => Ok(Some(load_settings(settings_path)?)),
        None => Ok(None),
    }
}

/// Tries the provided path, then the default location, then built-in defaults.
///
/// An explicitly provided path that fails to load is an error; a missing default
/// file is not.
pub fn load_settings_with_fallback(path: Option<&PathBuf>) -> Result<Settings> {
    if let Some(settings_path) = path {
        return load_settings(settings_path);
    }

    if default_settings_exist() {
        return load_default_settings();
    }

    tracing::debug!("no {} found, using built-in defaults", DEFAULT_SETTINGS_FILE);
    Ok(Settings::default())
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

/// Checks if the default settings file (settings.json) exists
pub fn default_settings_exist() -> bool {
    settings_file_exists(DEFAULT_SETTINGS_FILE)
}

fn validate(settings: &Settings) -> Result<()> {
    if settings.header_scan_rows == 0 {
        return Err(anyhow!("header_scan_rows must be at least 1"));
    }
    if settings.header_min_hits == 0 {
        return Err(anyhow!("header_min_hits must be at least 1"));
    }
    if settings.top_n == 0 || settings.advisor_top_n == 0 {
        return Err(anyhow!("top_n and advisor_top_n must be at least 1"));
    }
    if settings.extensions.is_empty() {
        return Err(anyhow!("extensions must list at least one file type"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_settings(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("settings.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(&dir, r#"{ "data_dir": "/srv/offers", "top_n": 3 }"#);

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/srv/offers"));
        assert_eq!(settings.top_n, 3);
        assert_eq!(settings.advisor_top_n, 8);
        assert_eq!(settings.header_scan_rows, 20);
    }

    #[test]
    fn test_rejects_zero_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(&dir, r#"{ "header_min_hits": 0 }"#);

        let err = load_settings(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("header_min_hits"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(&dir, "{ not json");
        assert!(load_settings(&path).is_err());
    }

    #[test]
    fn test_optional_none_yields_none() {
        assert!(load_optional_settings(None).unwrap().is_none());
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let missing = PathBuf::from("/definitely/not/here/settings.json");
        assert!(load_settings_with_fallback(Some(&missing)).is_err());
    }
}
