//! Search-pattern classification.
//!
//! A pure function from a normalized search string to a strategy label plus
//! the features that drove the decision. The precedence is a fixed decision
//! table (identifier grammar first, hybrid heuristics second, plain text
//! last) so each rule can be audited and tested in isolation from query
//! construction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Full identifier: alphanumeric segments joined by `_`, ending in a
/// single-letter segment adjacent to a hyphen and digits (`KCDC_A-005`).
/// With zero leading segments this also covers the bare fragment form
/// (`A-005`), and a hyphenated tail (`KCDC_A-005-1`) stays in the class.
static FULL_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9]+_)*[A-Za-z]-[0-9]+(?:-[A-Za-z0-9]+)*$").unwrap()
});

/// Partial identifier: segments joined by `_` ending in an isolated single
/// letter (`KCDC_A`) — the prefix a user types before the hyphenated part.
static PREFIX_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z0-9]+_)+[A-Za-z]$").unwrap());

/// Path/code alphabet: word characters, spaces, `-`, `#`, `/` only.
/// Identifier classification additionally requires a `#` or `/` delimiter.
static PATH_ALPHABET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w\s#/-]+$").unwrap());

/// Strategy label for a search string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueryKind {
    /// Strict identifier grammar; exact substring matching is the only
    /// strategy that survives the tokenizer.
    Identifier,
    /// Multi-word input with traits that make tokenized search unreliable;
    /// gets the full-text OR all-words-verbatim union.
    HybridCandidate,
    /// Ordinary text, served by tokenized full-text search.
    Plain,
}

/// Feature set extracted while classifying, kept for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryFeatures {
    /// Whitespace-separated token count.
    pub word_count: usize,
    /// Matched the strict identifier grammar (full, prefix, or fragment).
    pub identifier_grammar: bool,
    /// Path/code alphabet with at least one `#` or `/` delimiter.
    pub delimiter_alphabet: bool,
    /// A capitalized token in non-sentence-initial position.
    pub non_initial_capital: bool,
    /// A token carrying non-alphanumeric symbols.
    pub symbol_run: bool,
    /// A token longer than the configured threshold (rare-vocabulary
    /// heuristic; stemmers mis-tokenize uncommon long words).
    pub long_token: bool,
    /// A token carrying a digit.
    pub numeric_token: bool,
}

/// Classification result: label plus the features behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: QueryKind,
    pub features: QueryFeatures,
}

/// Tuning knobs for the classifier.
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    /// Tokens longer than this count as rare vocabulary for the hybrid
    /// heuristic.
    pub long_token_len: usize,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self { long_token_len: 8 }
    }
}

/// Classify a normalized search string.
///
/// Decision order, first match wins:
/// 1. `Identifier` — the trimmed string matches the identifier grammar
///    (case-insensitive) or the delimiter rule.
/// 2. `HybridCandidate` — at least two words, and at least one of: a
///    non-initial capitalized token, a symbol-bearing token, an overlong
///    token, or a digit-bearing token in a query of more than two words.
/// 3. `Plain` — everything else, including empty input.
pub fn classify(text: &str, options: &ClassifierOptions) -> Classification {
    let trimmed = text.trim();
    let words: Vec<&str> = trimmed.split_whitespace().collect();

    let mut features = QueryFeatures {
        word_count: words.len(),
        ..QueryFeatures::default()
    };

    if trimmed.is_empty() {
        return Classification { kind: QueryKind::Plain, features };
    }

    features.identifier_grammar = FULL_ID.is_match(trimmed) || PREFIX_ID.is_match(trimmed);
    features.delimiter_alphabet =
        PATH_ALPHABET.is_match(trimmed) && trimmed.contains(['#', '/']);

    if features.identifier_grammar || features.delimiter_alphabet {
        return Classification { kind: QueryKind::Identifier, features };
    }

    features.non_initial_capital = words
        .iter()
        .enumerate()
        .any(|(i, w)| i > 0 && is_capitalized(w));
    features.symbol_run = words.iter().any(|w| has_symbol(w));
    features.long_token = words
        .iter()
        .any(|w| w.chars().count() > options.long_token_len);
    features.numeric_token = words.iter().any(|w| w.chars().any(|c| c.is_ascii_digit()));

    let hybrid = features.word_count >= 2
        && (features.non_initial_capital
            || features.symbol_run
            || features.long_token
            || (features.numeric_token && features.word_count > 2));

    let kind = if hybrid {
        QueryKind::HybridCandidate
    } else {
        QueryKind::Plain
    };
    Classification { kind, features }
}

/// Proper-noun shape: leading uppercase, rest lowercase, more than one char.
fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest: Vec<char> = chars.collect();
            !rest.is_empty() && rest.iter().all(|c| c.is_lowercase())
        }
        _ => false,
    }
}

fn has_symbol(word: &str) -> bool {
    word.chars().any(|c| !c.is_alphanumeric() && c != '_')
}
