#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::{ContractViolation, SchemaVersion, Validate};

pub const COMMAND_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Unique symbolic identifier for one command's semantic effect.
///
/// Always ASCII lowercase snake_case so identifiers survive logging,
/// catalog documents and handler routing without case folding concerns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(raw: impl Into<String>) -> Result<Self, ContractViolation> {
        let raw = raw.into();
        let id = Self(raw);
        id.validate()?;
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for ActionId {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "action_id",
                reason: "must not be empty",
            });
        }
        if self.0.len() > 64 {
            return Err(ContractViolation::InvalidValue {
                field: "action_id",
                reason: "must be <= 64 chars",
            });
        }
        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ContractViolation::InvalidValue {
                field: "action_id",
                reason: "must be ascii lowercase snake_case",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    Application,
    WebService,
    System,
}

impl CommandCategory {
    /// Application launches and web-service calls may be re-attempted after
    /// a transient failure. System actions execute at most once: retrying a
    /// shutdown that may already be in flight is never acceptable.
    pub fn is_retryable(self) -> bool {
        match self {
            Self::Application | Self::WebService => true,
            Self::System => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::WebService => "web_service",
            Self::System => "system",
        }
    }
}

/// Ordered token sequence whose presence in an utterance signals an action.
/// Tokens are stored post-normalization; the catalog loader guarantees that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerPattern {
    tokens: Vec<String>,
}

impl TriggerPattern {
    pub fn new(tokens: Vec<String>) -> Result<Self, ContractViolation> {
        let pattern = Self { tokens };
        pattern.validate()?;
        Ok(pattern)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn token_len(&self) -> usize {
        self.tokens.len()
    }

    pub fn phrase(&self) -> String {
        self.tokens.join(" ")
    }
}

impl Validate for TriggerPattern {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.tokens.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "trigger_pattern.tokens",
                reason: "must not be empty",
            });
        }
        if self.tokens.len() > 12 {
            return Err(ContractViolation::InvalidValue {
                field: "trigger_pattern.tokens",
                reason: "must be <= 12 tokens",
            });
        }
        if self.tokens.iter().any(|t| t.is_empty()) {
            return Err(ContractViolation::InvalidValue {
                field: "trigger_pattern.tokens",
                reason: "tokens must not be empty",
            });
        }
        if self
            .tokens
            .iter()
            .any(|t| t.chars().any(|c| c.is_whitespace() || c.is_control()))
        {
            return Err(ContractViolation::InvalidValue {
                field: "trigger_pattern.tokens",
                reason: "tokens must not contain whitespace or control characters",
            });
        }
        Ok(())
    }
}

/// One catalog entry. Immutable after load; the catalog owns all definitions
/// and hands them out by reference only.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDefinition {
    pub schema_version: SchemaVersion,
    pub action_id: ActionId,
    pub category: CommandCategory,
    pub triggers: Vec<TriggerPattern>,
    pub requires_argument: bool,
    pub priority: i32,
    /// Launch target for argument-free Application commands
    /// (e.g. `open_calculator` -> "calculator").
    pub target: Option<String>,
}

impl CommandDefinition {
    pub fn v1(
        action_id: ActionId,
        category: CommandCategory,
        triggers: Vec<TriggerPattern>,
        requires_argument: bool,
        priority: i32,
        target: Option<String>,
    ) -> Result<Self, ContractViolation> {
        let def = Self {
            schema_version: COMMAND_CONTRACT_VERSION,
            action_id,
            category,
            triggers,
            requires_argument,
            priority,
            target,
        };
        def.validate()?;
        Ok(def)
    }
}

impl Validate for CommandDefinition {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != COMMAND_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "command_definition.schema_version",
                reason: "must match COMMAND_CONTRACT_VERSION",
            });
        }
        self.action_id.validate()?;
        if self.triggers.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "command_definition.triggers",
                reason: "must declare at least one trigger",
            });
        }
        for trigger in &self.triggers {
            trigger.validate()?;
        }
        if self.priority < -100 || self.priority > 100 {
            return Err(ContractViolation::InvalidRange {
                field: "command_definition.priority",
                min: -100.0,
                max: 100.0,
                got: self.priority as f64,
            });
        }
        if let Some(target) = &self.target {
            if target.trim().is_empty() {
                return Err(ContractViolation::InvalidValue {
                    field: "command_definition.target",
                    reason: "must not be empty when present",
                });
            }
        }
        if self.category == CommandCategory::Application
            && !self.requires_argument
            && self.target.is_none()
        {
            return Err(ContractViolation::InvalidValue {
                field: "command_definition.target",
                reason: "argument-free application command needs a launch target",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(tokens: &[&str]) -> TriggerPattern {
        TriggerPattern::new(tokens.iter().map(|t| t.to_string()).collect()).unwrap()
    }

    #[test]
    fn at_command_01_action_id_rejects_uppercase_and_spaces() {
        assert!(ActionId::new("open_calculator").is_ok());
        assert!(ActionId::new("Open").is_err());
        assert!(ActionId::new("open calculator").is_err());
        assert!(ActionId::new("").is_err());
    }

    #[test]
    fn at_command_02_trigger_pattern_rejects_empty_and_whitespace_tokens() {
        assert!(TriggerPattern::new(vec![]).is_err());
        assert!(TriggerPattern::new(vec!["hava durumu".to_string()]).is_err());
        assert!(trigger(&["hava", "durumu"]).validate().is_ok());
    }

    #[test]
    fn at_command_03_application_without_argument_needs_target() {
        let out = CommandDefinition::v1(
            ActionId::new("open_calculator").unwrap(),
            CommandCategory::Application,
            vec![trigger(&["hesap", "makinesi"])],
            false,
            0,
            None,
        );
        assert!(out.is_err());

        let ok = CommandDefinition::v1(
            ActionId::new("open_calculator").unwrap(),
            CommandCategory::Application,
            vec![trigger(&["hesap", "makinesi"])],
            false,
            0,
            Some("calculator".to_string()),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn at_command_04_system_category_is_never_retryable() {
        assert!(CommandCategory::Application.is_retryable());
        assert!(CommandCategory::WebService.is_retryable());
        assert!(!CommandCategory::System.is_retryable());
    }
}
