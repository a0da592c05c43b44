#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use lazzaran_contracts::settings::{EngineSettings, ProviderKeys};
use lazzaran_contracts::ContractViolation;

pub const SETTINGS_DOCUMENT_VERSION: u32 = 1;

/// Settings load failure. Fatal at startup, like a malformed catalog.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Document(String),
    UnsupportedSchemaVersion { got: u32 },
    Contract(ContractViolation),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "settings file unreadable: {e}"),
            Self::Document(detail) => write!(f, "settings document unreadable: {detail}"),
            Self::UnsupportedSchemaVersion { got } => {
                write!(f, "unsupported settings schema version {got}")
            }
            Self::Contract(violation) => write!(f, "settings invalid: {violation:?}"),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ContractViolation> for SettingsError {
    fn from(violation: ContractViolation) -> Self {
        Self::Contract(violation)
    }
}

/// On-disk settings shape. Every field beyond the version is optional;
/// omitted fields take the engine defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsDocument {
    pub schema_version: u32,
    #[serde(default = "default_wake_phrases")]
    pub wake_phrases: Vec<String>,
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_backoff_seconds")]
    pub retry_backoff_seconds: f32,
    #[serde(default)]
    pub app_paths: BTreeMap<String, String>,
    #[serde(default)]
    pub api_keys: ApiKeysDocument,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiKeysDocument {
    pub weather: Option<String>,
    pub news: Option<String>,
    pub gemini: Option<String>,
}

fn default_wake_phrases() -> Vec<String> {
    EngineSettings::default_v1().wake_phrases
}

fn default_match_threshold() -> f32 {
    EngineSettings::default_v1().match_threshold
}

fn default_retry_count() -> u32 {
    EngineSettings::default_v1().retry_count
}

fn default_retry_backoff_seconds() -> f32 {
    EngineSettings::default_v1().retry_backoff_seconds
}

pub fn load_settings(path: &Path) -> Result<EngineSettings, SettingsError> {
    let raw = fs::read_to_string(path)?;
    settings_from_json_str(&raw)
}

pub fn settings_from_json_str(raw: &str) -> Result<EngineSettings, SettingsError> {
    let document: SettingsDocument =
        serde_json::from_str(raw).map_err(|e| SettingsError::Document(e.to_string()))?;
    settings_from_document(&document)
}

pub fn settings_from_document(
    document: &SettingsDocument,
) -> Result<EngineSettings, SettingsError> {
    if document.schema_version != SETTINGS_DOCUMENT_VERSION {
        return Err(SettingsError::UnsupportedSchemaVersion {
            got: document.schema_version,
        });
    }
    let settings = EngineSettings::v1(
        document.wake_phrases.clone(),
        document.match_threshold,
        document.retry_count,
        document.retry_backoff_seconds,
        document.app_paths.clone(),
        resolve_provider_keys(&document.api_keys),
    )?;
    Ok(settings)
}

/// Keys come from the settings document first, the process environment
/// second, matching how the original deployment supplied them.
fn resolve_provider_keys(document: &ApiKeysDocument) -> ProviderKeys {
    ProviderKeys {
        weather_api_key: key_or_env(&document.weather, "WEATHER_API_KEY"),
        news_api_key: key_or_env(&document.news, "NEWS_API_KEY"),
        gemini_api_key: key_or_env(&document.gemini, "GEMINI_API_KEY"),
    }
}

fn key_or_env(configured: &Option<String>, var: &str) -> Option<String> {
    configured
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| env::var(var).ok().filter(|k| !k.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_settings_doc_01_minimal_document_takes_defaults() {
        let settings = settings_from_json_str(r#"{"schema_version": 1}"#).unwrap();
        let defaults = EngineSettings::default_v1();
        assert_eq!(settings.wake_phrases, defaults.wake_phrases);
        assert_eq!(settings.match_threshold, defaults.match_threshold);
        assert_eq!(settings.retry_count, defaults.retry_count);
    }

    #[test]
    fn at_settings_doc_02_out_of_range_threshold_is_fatal() {
        let raw = r#"{"schema_version": 1, "match_threshold": 1.5}"#;
        assert!(matches!(
            settings_from_json_str(raw),
            Err(SettingsError::Contract(_))
        ));
    }

    #[test]
    fn at_settings_doc_03_unknown_schema_version_is_fatal() {
        let raw = r#"{"schema_version": 7}"#;
        assert!(matches!(
            settings_from_json_str(raw),
            Err(SettingsError::UnsupportedSchemaVersion { got: 7 })
        ));
    }

    #[test]
    fn at_settings_doc_04_app_paths_and_document_keys_survive() {
        let raw = r#"{
            "schema_version": 1,
            "app_paths": {"calculator": "/usr/bin/gnome-calculator"},
            "api_keys": {"weather": "k-123"}
        }"#;
        let settings = settings_from_json_str(raw).unwrap();
        assert_eq!(
            settings.app_paths.get("calculator").map(String::as_str),
            Some("/usr/bin/gnome-calculator")
        );
        assert_eq!(
            settings.provider_keys.weather_api_key.as_deref(),
            Some("k-123")
        );
    }
}
