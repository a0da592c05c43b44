#![forbid(unsafe_code)]

use lazzaran_contracts::matching::MatchResult;
use lazzaran_contracts::utterance::NormalizedUtterance;

/// Slices the free-text argument out of the utterance: everything after the
/// last matched trigger token. `None` means the argument is missing; the
/// dispatcher turns that into a prompt when the command requires one.
///
/// Tokens are already whitespace-trimmed by normalization, so joining the
/// tail is all that remains.
pub fn extract_argument(utterance: &NormalizedUtterance, result: &MatchResult) -> Option<String> {
    let start = result.argument_start?;
    utterance
        .tail_phrase(start)
        .filter(|phrase| !phrase.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::matcher::{MatcherConfig, MatcherRuntime};
    use crate::normalize::NormalizerRuntime;
    use lazzaran_contracts::matching::MatcherVerdict;

    fn resolve(raw: &str) -> (NormalizedUtterance, MatchResult) {
        let catalog = Catalog::builtin_turkish();
        let utterance = NormalizerRuntime::bare().normalize(raw);
        match MatcherRuntime::new(MatcherConfig::default_v1()).run(&utterance, &catalog) {
            MatcherVerdict::Matched(result) => (utterance, result),
            other => panic!("expected match for {raw:?}, got {other:?}"),
        }
    }

    #[test]
    fn at_extract_01_tail_after_trigger_is_the_argument() {
        let (utterance, result) = resolve("google'da ara python voice assistant");
        assert_eq!(
            extract_argument(&utterance, &result).as_deref(),
            Some("python voice assistant")
        );
    }

    #[test]
    fn at_extract_02_trigger_alone_has_no_argument() {
        let (utterance, result) = resolve("google'da ara");
        assert_eq!(extract_argument(&utterance, &result), None);
    }

    #[test]
    fn at_extract_03_round_trip_for_built_arguments() {
        for argument in ["istanbul", "istanbul hava durumu", "rust 2021 sürümü"] {
            let raw = format!("google'da ara {argument}");
            let (utterance, result) = resolve(&raw);
            assert_eq!(
                extract_argument(&utterance, &result).as_deref(),
                Some(argument)
            );
        }
    }
}
