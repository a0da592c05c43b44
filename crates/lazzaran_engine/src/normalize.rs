#![forbid(unsafe_code)]

use lazzaran_contracts::utterance::NormalizedUtterance;

/// Trailing filler the speech front end regularly appends. Stripped after
/// wake-phrase removal so "chrome'u aç lütfen" and "chrome'u aç" normalize
/// to the same token sequence.
const POLITENESS_WORDS: &[&str] = &["lütfen", "lutfen"];

/// Canonicalizes raw utterance text: Turkish-aware lowercasing, punctuation
/// stripping (intra-word apostrophes survive), whitespace collapsing and
/// wake-phrase prefix removal.
///
/// Total function. Input that contains no word characters normalizes to the
/// empty utterance, which guarantees a downstream no-match.
#[derive(Debug, Clone)]
pub struct NormalizerRuntime {
    /// Tokenized wake phrases, longest first so the most specific prefix
    /// wins ("merhaba lazzaran asistan" before "merhaba lazzaran").
    wake_token_sets: Vec<Vec<String>>,
}

impl NormalizerRuntime {
    pub fn new(wake_phrases: &[String]) -> Self {
        let mut wake_token_sets: Vec<Vec<String>> = wake_phrases
            .iter()
            .map(|phrase| base_tokens(phrase))
            .filter(|tokens| !tokens.is_empty())
            .collect();
        wake_token_sets.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { wake_token_sets }
    }

    /// Normalizer with no wake phrases; used for catalog trigger loading,
    /// where a trigger starting with a wake word must survive intact.
    pub fn bare() -> Self {
        Self {
            wake_token_sets: Vec::new(),
        }
    }

    pub fn normalize(&self, raw: &str) -> NormalizedUtterance {
        let mut tokens = base_tokens(raw);
        self.strip_wake_prefix(&mut tokens);
        strip_trailing_politeness(&mut tokens);
        NormalizedUtterance::from_tokens(tokens)
    }

    /// Strips wake prefixes until none remains, so a stuttered or repeated
    /// wake phrase cannot survive into matching and normalization stays a
    /// fixpoint.
    fn strip_wake_prefix(&self, tokens: &mut Vec<String>) {
        loop {
            let Some(wake) = self
                .wake_token_sets
                .iter()
                .find(|wake| tokens.len() >= wake.len() && tokens[..wake.len()] == wake[..])
            else {
                return;
            };
            tokens.drain(..wake.len());
        }
    }
}

fn strip_trailing_politeness(tokens: &mut Vec<String>) {
    while let Some(last) = tokens.last() {
        if POLITENESS_WORDS.contains(&last.as_str()) {
            tokens.pop();
        } else {
            break;
        }
    }
}

/// Lowercases and tokenizes in one pass. Word characters are alphanumerics;
/// an apostrophe between two word characters is part of the token
/// (`chrome'u`), every other character is a separator.
fn base_tokens(raw: &str) -> Vec<String> {
    let chars: Vec<char> = turkish_lowercase(raw).chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            current.push(c);
            continue;
        }
        let keeps_apostrophe = is_apostrophe(c)
            && !current.is_empty()
            && chars.get(i + 1).is_some_and(|next| next.is_alphanumeric());
        if keeps_apostrophe {
            current.push('\'');
            continue;
        }
        if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Turkish-aware lowercasing. The dotted/dotless i pair does not follow the
/// default Unicode mapping: 'I' folds to 'ı' and 'İ' to plain 'i' (the
/// default would produce "i" + combining dot above).
pub fn turkish_lowercase(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            'I' => out.push('ı'),
            'İ' => out.push('i'),
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> NormalizerRuntime {
        NormalizerRuntime::new(&[
            "merhaba lazzaran".to_string(),
            "hey lazzaran".to_string(),
        ])
    }

    #[test]
    fn at_normalize_01_turkish_casing_preserves_dot_distinction() {
        let u = NormalizerRuntime::bare().normalize("İstanbul ISPARTA");
        assert_eq!(u.tokens(), ["istanbul", "ısparta"]);
    }

    #[test]
    fn at_normalize_02_possessive_apostrophe_survives_punctuation_strip() {
        let u = NormalizerRuntime::bare().normalize("Chrome'u aç!!");
        assert_eq!(u.as_str(), "chrome'u aç");
    }

    #[test]
    fn at_normalize_03_whitespace_collapses() {
        let u = NormalizerRuntime::bare().normalize("  hesap\t makinesini \n aç ");
        assert_eq!(u.as_str(), "hesap makinesini aç");
    }

    #[test]
    fn at_normalize_04_wake_phrase_stripped_only_as_prefix() {
        let rt = runtime();
        assert_eq!(
            rt.normalize("Merhaba Lazzaran, saat kaç?").as_str(),
            "saat kaç"
        );
        // Mid-utterance wake words are ordinary tokens.
        assert_eq!(
            rt.normalize("bugün merhaba lazzaran dedim").as_str(),
            "bugün merhaba lazzaran dedim"
        );
    }

    #[test]
    fn at_normalize_05_trailing_politeness_is_dropped() {
        let u = runtime().normalize("chrome'u aç lütfen");
        assert_eq!(u.as_str(), "chrome'u aç");
    }

    #[test]
    fn at_normalize_06_garbage_normalizes_to_empty() {
        assert!(runtime().normalize("?! .,:").is_empty());
        assert!(runtime().normalize("").is_empty());
    }

    #[test]
    fn at_normalize_07_idempotent_on_normalized_text() {
        let rt = runtime();
        let once = rt.normalize("Merhaba Lazzaran, Google'da ara İstanbul lütfen");
        let twice = rt.normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn at_normalize_09_repeated_wake_phrase_strips_completely() {
        let rt = runtime();
        let once = rt.normalize("merhaba lazzaran merhaba lazzaran saat kaç");
        assert_eq!(once.as_str(), "saat kaç");
        assert_eq!(rt.normalize(once.as_str()), once);
        // Mixed wake phrases stack too.
        let u = rt.normalize("hey lazzaran merhaba lazzaran saat kaç");
        assert_eq!(u.as_str(), "saat kaç");
    }

    #[test]
    fn at_normalize_08_wake_phrase_alone_yields_empty() {
        assert!(runtime().normalize("merhaba lazzaran").is_empty());
    }
}
