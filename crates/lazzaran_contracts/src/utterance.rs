#![forbid(unsafe_code)]

/// Lowercased, diacritic-preserved, whitespace-collapsed token sequence
/// derived from one raw utterance. Pure value type: created fresh per
/// utterance, discarded after dispatch.
///
/// The empty utterance is legal and guarantees a downstream no-match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedUtterance {
    tokens: Vec<String>,
    text: String,
}

impl NormalizedUtterance {
    /// Builds the joined text from the tokens so the two views can never
    /// disagree. Tokens are trusted to be normalizer output.
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let text = tokens.join(" ");
        Self { tokens, text }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn token_len(&self) -> usize {
        self.tokens.len()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Joins the tokens of `start..` back into a phrase. Returns `None` when
    /// the span is empty or out of range.
    pub fn tail_phrase(&self, start: usize) -> Option<String> {
        if start >= self.tokens.len() {
            return None;
        }
        Some(self.tokens[start..].join(" "))
    }
}
