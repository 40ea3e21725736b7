//! Language configuration for the tokenized full-text path.
//!
//! Each token maps to an analyzer pipeline on the index (lowercasing, a
//! stop-word list, a stemmer). Resolution is strict: an unknown token is an
//! error, never a silent default — changing tokenization behavior under the
//! caller is precisely the bug class this layer guards against.

use tantivy::tokenizer::Language;

use crate::interface::SearchError;

/// Token used when a request carries no explicit language.
pub const DEFAULT_LANGUAGE: &str = "english";

/// Analyzer binding for one language token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageConfig {
    token: &'static str,
    stemmer: Option<Language>,
}

/// Supported configs. `simple` lowercases only — no stemming, no stop
/// words — mirroring the index configuration used when identifier-bearing
/// fields must not be mangled.
const REGISTRY: &[LanguageConfig] = &[
    LanguageConfig { token: "english", stemmer: Some(Language::English) },
    LanguageConfig { token: "french", stemmer: Some(Language::French) },
    LanguageConfig { token: "german", stemmer: Some(Language::German) },
    LanguageConfig { token: "spanish", stemmer: Some(Language::Spanish) },
    LanguageConfig { token: "simple", stemmer: None },
];

impl LanguageConfig {
    /// Resolve a token (case-insensitive). `None` resolves to
    /// [`DEFAULT_LANGUAGE`]; an unknown token is `InvalidConfig`.
    pub fn resolve(token: Option<&str>) -> Result<Self, SearchError> {
        let token = token.unwrap_or(DEFAULT_LANGUAGE);
        REGISTRY
            .iter()
            .find(|c| c.token.eq_ignore_ascii_case(token))
            .copied()
            .ok_or_else(|| SearchError::InvalidConfig(token.to_string()))
    }

    /// All registered configs.
    pub fn all() -> &'static [Self] {
        REGISTRY
    }

    pub fn token(&self) -> &'static str {
        self.token
    }

    /// Stemmer language, if this config stems at all.
    pub fn stemmer(&self) -> Option<Language> {
        self.stemmer
    }

    /// Name under which this config's analyzer is registered on an index.
    pub fn analyzer_name(&self) -> String {
        format!("lang_{}", self.token)
    }

    /// Whether every character class in `text` is one this config's
    /// tokenizer segments reliably. All registered configs are Latin-script:
    /// CJK content has no word boundaries for them to split on, so it is
    /// uncovered and routes to per-word verbatim matching instead.
    pub fn covers(&self, text: &str) -> bool {
        !contains_cjk(text)
    }
}

/// CJK detection: Han, kana, and hangul ranges.
fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{4e00}'..='\u{9fff}' |  // CJK Unified Ideographs
            '\u{3400}'..='\u{4dbf}' |  // CJK Extension A
            '\u{3040}'..='\u{309f}' |  // Hiragana
            '\u{30a0}'..='\u{30ff}' |  // Katakana
            '\u{ac00}'..='\u{d7af}'    // Hangul Syllables
        )
    })
}
