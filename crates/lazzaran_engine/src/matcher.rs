#![forbid(unsafe_code)]

use lazzaran_contracts::command::{CommandDefinition, TriggerPattern};
use lazzaran_contracts::matching::{MatchCandidate, MatchResult, MatcherVerdict};
use lazzaran_contracts::utterance::NormalizedUtterance;
use lazzaran_contracts::{ContractViolation, Validate};

use crate::catalog::Catalog;

/// Scores within this distance count as tied and fall through to the next
/// tie-break rule.
const SCORE_EPSILON: f32 = 1e-4;

/// Per-token fuzzy tolerance for misrecognized speech.
const MAX_TOKEN_EDIT_DISTANCE: u32 = 1;

/// Scoring weights. Defaults are tuning starting points, not requirements;
/// the threshold comes from the startup settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Minimum score a candidate needs to stay in the field.
    pub threshold: f32,
    /// Added when every trigger token matched exactly and contiguously.
    pub exact_bonus: f32,
    /// Subtracted per edit across all fuzzily matched tokens.
    pub edit_penalty: f32,
    /// Subtracted per utterance token sitting inside the matched span
    /// without belonging to the trigger.
    pub gap_penalty: f32,
}

impl MatcherConfig {
    pub fn default_v1() -> Self {
        Self {
            threshold: 0.8,
            exact_bonus: 0.25,
            edit_penalty: 0.1,
            gap_penalty: 0.05,
        }
    }

    pub fn with_threshold(threshold: f32) -> Result<Self, ContractViolation> {
        if !threshold.is_finite() {
            return Err(ContractViolation::NotFinite {
                field: "matcher_config.threshold",
            });
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ContractViolation::InvalidRange {
                field: "matcher_config.threshold",
                min: 0.0,
                max: 1.0,
                got: threshold as f64,
            });
        }
        Ok(Self {
            threshold,
            ..Self::default_v1()
        })
    }
}

/// Scored-containment matcher. Deterministic by construction: the same
/// utterance against the same catalog always yields the same verdict, and
/// every tie-break is an explicit rule, never hash order.
#[derive(Debug, Clone)]
pub struct MatcherRuntime {
    config: MatcherConfig,
}

#[derive(Debug, Clone)]
struct ScoredCandidate<'a> {
    definition: &'a CommandDefinition,
    trigger: &'a TriggerPattern,
    score: f32,
    last_matched_index: usize,
    catalog_index: usize,
}

impl MatcherRuntime {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, utterance: &NormalizedUtterance, catalog: &Catalog) -> MatcherVerdict {
        if utterance.is_empty() {
            return MatcherVerdict::NoMatch;
        }

        let mut field = Vec::new();
        for (catalog_index, definition) in catalog.all_definitions().iter().enumerate() {
            if let Some(candidate) = self.best_trigger(definition, catalog_index, utterance) {
                field.push(candidate);
            }
        }

        if field.is_empty() {
            return MatcherVerdict::NoMatch;
        }

        field.sort_by(|a, b| {
            compare_scores(b.score, a.score)
                .then_with(|| b.trigger.token_len().cmp(&a.trigger.token_len()))
                .then_with(|| b.definition.priority.cmp(&a.definition.priority))
                .then_with(|| a.catalog_index.cmp(&b.catalog_index))
        });

        let best = &field[0];
        let tied: Vec<&ScoredCandidate> = field
            .iter()
            .filter(|c| {
                scores_tie(c.score, best.score)
                    && c.trigger.token_len() == best.trigger.token_len()
                    && c.definition.priority == best.definition.priority
            })
            .collect();

        // Declaration order only resolves ties inside one action; distinct
        // actions still tied here are surfaced for clarification.
        if tied
            .iter()
            .any(|c| c.definition.action_id != best.definition.action_id)
        {
            let candidates = tied
                .iter()
                .map(|c| MatchCandidate {
                    action_id: c.definition.action_id.clone(),
                    trigger_phrase: c.trigger.phrase(),
                    score: c.score,
                })
                .collect();
            return MatcherVerdict::Ambiguous(candidates);
        }

        let argument_start = if best.last_matched_index + 1 < utterance.token_len() {
            Some(best.last_matched_index + 1)
        } else {
            None
        };

        match MatchResult::v1(
            best.definition.action_id.clone(),
            best.trigger.clone(),
            best.score,
            argument_start,
        ) {
            Ok(result) => {
                debug_assert!(result.validate().is_ok());
                MatcherVerdict::Matched(result)
            }
            Err(_) => MatcherVerdict::NoMatch,
        }
    }

    /// Best-scoring trigger of one definition, or `None` when every trigger
    /// falls below the acceptance threshold.
    fn best_trigger<'a>(
        &self,
        definition: &'a CommandDefinition,
        catalog_index: usize,
        utterance: &NormalizedUtterance,
    ) -> Option<ScoredCandidate<'a>> {
        let mut best: Option<ScoredCandidate<'a>> = None;
        for trigger in &definition.triggers {
            let Some(alignment) = align_trigger(trigger.tokens(), utterance.tokens()) else {
                continue;
            };
            let score = self.score(trigger.token_len(), &alignment);
            if score < self.config.threshold || score <= 0.0 {
                continue;
            }
            let replace = match &best {
                None => true,
                Some(current) => {
                    compare_scores(score, current.score)
                        .then_with(|| trigger.token_len().cmp(&current.trigger.token_len()))
                        == std::cmp::Ordering::Greater
                }
            };
            if replace {
                best = Some(ScoredCandidate {
                    definition,
                    trigger,
                    score,
                    last_matched_index: alignment.last_index,
                    catalog_index,
                });
            }
        }
        best
    }

    fn score(&self, trigger_len: usize, alignment: &Alignment) -> f32 {
        let coverage = alignment.matched as f32 / trigger_len as f32;
        let mut score = coverage;
        score -= self.config.edit_penalty * alignment.edits as f32;
        score -= self.config.gap_penalty * alignment.gap_tokens as f32;
        if alignment.matched == trigger_len && alignment.edits == 0 && alignment.gap_tokens == 0 {
            score += self.config.exact_bonus;
        }
        score
    }
}

#[derive(Debug, Clone, Copy)]
struct Alignment {
    matched: usize,
    edits: u32,
    gap_tokens: usize,
    last_index: usize,
}

/// Greedy in-order alignment of trigger tokens against the utterance.
/// Trigger tokens that find no acceptable utterance token are skipped;
/// matched tokens must appear in trigger order.
fn align_trigger(trigger: &[String], utterance: &[String]) -> Option<Alignment> {
    let mut cursor = 0usize;
    let mut matched = 0usize;
    let mut edits = 0u32;
    let mut first_index = None;
    let mut last_index = 0usize;

    for trigger_token in trigger {
        let mut found = None;
        for (offset, utterance_token) in utterance[cursor..].iter().enumerate() {
            if let Some(distance) = token_distance(trigger_token, utterance_token) {
                found = Some((cursor + offset, distance));
                break;
            }
        }
        if let Some((index, distance)) = found {
            matched += 1;
            edits += distance;
            first_index.get_or_insert(index);
            last_index = index;
            cursor = index + 1;
        }
    }

    let first_index = first_index?;
    let span = last_index - first_index + 1;
    Some(Alignment {
        matched,
        edits,
        gap_tokens: span - matched,
        last_index,
    })
}

/// Edit distance when within the fuzzy tolerance, `None` otherwise.
fn token_distance(a: &str, b: &str) -> Option<u32> {
    if a == b {
        return Some(0);
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.len().abs_diff(b_chars.len()) > MAX_TOKEN_EDIT_DISTANCE as usize {
        return None;
    }
    let distance = levenshtein(&a_chars, &b_chars);
    (distance <= MAX_TOKEN_EDIT_DISTANCE).then_some(distance)
}

fn levenshtein(a: &[char], b: &[char]) -> u32 {
    let mut previous: Vec<u32> = (0..=b.len() as u32).collect();
    let mut current = vec![0u32; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i as u32 + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + u32::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

fn scores_tie(a: f32, b: f32) -> bool {
    (a - b).abs() <= SCORE_EPSILON
}

fn compare_scores(a: f32, b: f32) -> std::cmp::Ordering {
    if scores_tie(a, b) {
        return std::cmp::Ordering::Equal;
    }
    // Scores are finite by construction (weights and counts are finite).
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}
