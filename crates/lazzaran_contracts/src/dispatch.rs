#![forbid(unsafe_code)]

use crate::{ContractViolation, ReasonCodeId, SchemaVersion, Validate};

pub const DISPATCH_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const MAX_OUTCOME_MESSAGE_CHARS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchStatus {
    Executed,
    NotFound,
    Ambiguous,
    ArgumentMissing,
    HandlerFailed,
    Cancelled,
}

impl DispatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Executed => "executed",
            Self::NotFound => "not_found",
            Self::Ambiguous => "ambiguous",
            Self::ArgumentMissing => "argument_missing",
            Self::HandlerFailed => "handler_failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Per-invocation dispatch result. `message` is plain spoken-language text
/// for the presentation layer; no markup, no stack traces.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub schema_version: SchemaVersion,
    pub status: DispatchStatus,
    pub message: String,
    pub retry_count: u32,
    pub reason_code: ReasonCodeId,
}

impl DispatchOutcome {
    pub fn v1(
        status: DispatchStatus,
        message: String,
        retry_count: u32,
        reason_code: ReasonCodeId,
    ) -> Result<Self, ContractViolation> {
        let outcome = Self {
            schema_version: DISPATCH_CONTRACT_VERSION,
            status,
            message,
            retry_count,
            reason_code,
        };
        outcome.validate()?;
        Ok(outcome)
    }
}

impl Validate for DispatchOutcome {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != DISPATCH_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "dispatch_outcome.schema_version",
                reason: "must match DISPATCH_CONTRACT_VERSION",
            });
        }
        if self.message.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "dispatch_outcome.message",
                reason: "must not be empty",
            });
        }
        if self.message.chars().count() > MAX_OUTCOME_MESSAGE_CHARS {
            return Err(ContractViolation::InvalidValue {
                field: "dispatch_outcome.message",
                reason: "must be <= MAX_OUTCOME_MESSAGE_CHARS",
            });
        }
        if self.message.chars().any(|c| c.is_control()) {
            return Err(ContractViolation::InvalidValue {
                field: "dispatch_outcome.message",
                reason: "must not contain control characters",
            });
        }
        if self.status == DispatchStatus::Executed && self.retry_count > 16 {
            return Err(ContractViolation::InvalidValue {
                field: "dispatch_outcome.retry_count",
                reason: "must be <= 16",
            });
        }
        Ok(())
    }
}
