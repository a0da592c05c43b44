#![forbid(unsafe_code)]

use crate::command::{ActionId, TriggerPattern};
use crate::{ContractViolation, SchemaVersion, Validate};

pub const MATCHING_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Best trigger alignment for one catalog entry. Consumed immediately by the
/// argument extractor and dispatcher; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub schema_version: SchemaVersion,
    pub action_id: ActionId,
    pub matched_trigger: TriggerPattern,
    pub score: f32,
    /// Token index one past the last matched trigger token, when the
    /// utterance continues beyond the trigger.
    pub argument_start: Option<usize>,
}

impl MatchResult {
    pub fn v1(
        action_id: ActionId,
        matched_trigger: TriggerPattern,
        score: f32,
        argument_start: Option<usize>,
    ) -> Result<Self, ContractViolation> {
        let result = Self {
            schema_version: MATCHING_CONTRACT_VERSION,
            action_id,
            matched_trigger,
            score,
            argument_start,
        };
        result.validate()?;
        Ok(result)
    }
}

impl Validate for MatchResult {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != MATCHING_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "match_result.schema_version",
                reason: "must match MATCHING_CONTRACT_VERSION",
            });
        }
        self.action_id.validate()?;
        self.matched_trigger.validate()?;
        if !self.score.is_finite() {
            return Err(ContractViolation::NotFinite {
                field: "match_result.score",
            });
        }
        if self.score <= 0.0 {
            return Err(ContractViolation::InvalidValue {
                field: "match_result.score",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

/// One entry of an ambiguous tie, surfaced back to the user verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub action_id: ActionId,
    pub trigger_phrase: String,
    pub score: f32,
}

/// Matcher output. `NoMatch` and `Ambiguous` are ordinary values, not
/// errors; the dispatcher turns them into user-facing outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum MatcherVerdict {
    Matched(MatchResult),
    NoMatch,
    Ambiguous(Vec<MatchCandidate>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(tokens: &[&str]) -> TriggerPattern {
        TriggerPattern::new(tokens.iter().map(|t| t.to_string()).collect()).unwrap()
    }

    #[test]
    fn at_matching_01_score_must_be_finite_and_positive() {
        let id = ActionId::new("open_calculator").unwrap();
        assert!(MatchResult::v1(id.clone(), trigger(&["aç"]), 1.0, None).is_ok());
        assert!(MatchResult::v1(id.clone(), trigger(&["aç"]), 0.0, None).is_err());
        assert!(MatchResult::v1(id, trigger(&["aç"]), f32::NAN, None).is_err());
    }
}
