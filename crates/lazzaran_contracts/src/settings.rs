#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use crate::{ContractViolation, SchemaVersion, Validate};

pub const SETTINGS_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const MAX_WAKE_PHRASES: usize = 8;
pub const MAX_RETRY_COUNT: u32 = 10;

/// Provider credentials read once at startup. Absent keys disable the
/// corresponding web service; they never fail startup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderKeys {
    pub weather_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

/// Startup configuration for the whole engine. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub schema_version: SchemaVersion,
    pub wake_phrases: Vec<String>,
    pub match_threshold: f32,
    pub retry_count: u32,
    pub retry_backoff_seconds: f32,
    /// Launch-target key -> executable path table for the process launcher.
    pub app_paths: BTreeMap<String, String>,
    pub provider_keys: ProviderKeys,
}

impl EngineSettings {
    pub fn v1(
        wake_phrases: Vec<String>,
        match_threshold: f32,
        retry_count: u32,
        retry_backoff_seconds: f32,
        app_paths: BTreeMap<String, String>,
        provider_keys: ProviderKeys,
    ) -> Result<Self, ContractViolation> {
        let settings = Self {
            schema_version: SETTINGS_CONTRACT_VERSION,
            wake_phrases,
            match_threshold,
            retry_count,
            retry_backoff_seconds,
            app_paths,
            provider_keys,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn default_v1() -> Self {
        Self {
            schema_version: SETTINGS_CONTRACT_VERSION,
            wake_phrases: vec!["merhaba lazzaran".to_string(), "hey lazzaran".to_string()],
            match_threshold: 0.8,
            retry_count: 3,
            retry_backoff_seconds: 1.0,
            app_paths: BTreeMap::new(),
            provider_keys: ProviderKeys::default(),
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f32(self.retry_backoff_seconds)
    }
}

impl Validate for EngineSettings {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != SETTINGS_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "engine_settings.schema_version",
                reason: "must match SETTINGS_CONTRACT_VERSION",
            });
        }
        if self.wake_phrases.len() > MAX_WAKE_PHRASES {
            return Err(ContractViolation::InvalidValue {
                field: "engine_settings.wake_phrases",
                reason: "must be <= MAX_WAKE_PHRASES entries",
            });
        }
        if self.wake_phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(ContractViolation::InvalidValue {
                field: "engine_settings.wake_phrases",
                reason: "phrases must not be empty",
            });
        }
        if !self.match_threshold.is_finite() {
            return Err(ContractViolation::NotFinite {
                field: "engine_settings.match_threshold",
            });
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ContractViolation::InvalidRange {
                field: "engine_settings.match_threshold",
                min: 0.0,
                max: 1.0,
                got: self.match_threshold as f64,
            });
        }
        if self.retry_count > MAX_RETRY_COUNT {
            return Err(ContractViolation::InvalidRange {
                field: "engine_settings.retry_count",
                min: 0.0,
                max: MAX_RETRY_COUNT as f64,
                got: self.retry_count as f64,
            });
        }
        if !self.retry_backoff_seconds.is_finite() {
            return Err(ContractViolation::NotFinite {
                field: "engine_settings.retry_backoff_seconds",
            });
        }
        if !(0.0..=60.0).contains(&self.retry_backoff_seconds) {
            return Err(ContractViolation::InvalidRange {
                field: "engine_settings.retry_backoff_seconds",
                min: 0.0,
                max: 60.0,
                got: self.retry_backoff_seconds as f64,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_settings_01_defaults_are_valid() {
        assert!(EngineSettings::default_v1().validate().is_ok());
    }

    #[test]
    fn at_settings_02_threshold_outside_unit_interval_is_rejected() {
        let mut settings = EngineSettings::default_v1();
        settings.match_threshold = 1.2;
        assert!(settings.validate().is_err());
        settings.match_threshold = f32::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn at_settings_03_retry_budget_is_bounded() {
        let mut settings = EngineSettings::default_v1();
        settings.retry_count = MAX_RETRY_COUNT + 1;
        assert!(settings.validate().is_err());
        settings.retry_count = MAX_RETRY_COUNT;
        assert!(settings.validate().is_ok());
    }
}
