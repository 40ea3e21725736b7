//! Strategy selection and the boolean predicate tree.
//!
//! A classification maps to a tree of primitive query operations. OR joins
//! strategies where either one finding a document is acceptable (heuristic
//! fallbacks); AND joins requirements that must all hold. Getting this
//! combination wrong silently drops results rather than erroring, which is
//! why the tree is built by a pure function that can be inspected without
//! touching an index.

use serde::Serialize;

use crate::classify::{Classification, QueryKind};
use crate::language::LanguageConfig;

/// A leaf query understood by the execution adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PrimitiveOp {
    /// Literal case-insensitive containment of the byte sequence, bypassing
    /// the tokenizer entirely. Correctness-over-recall for identifier-like
    /// input: nothing the tokenizer drops or splits can lose the match.
    ExactSubstring(String),
    /// Adjacent analyzed tokens in order. Not produced by the default
    /// decision table; part of the adapter boundary for callers composing
    /// their own predicates.
    Phrase(String),
    /// Tokenized full-text query. The field set and language config bind at
    /// materialization, so the leaf carries only text.
    FullText(String),
    /// Every word present verbatim (case-insensitive substring), each word
    /// independently. Strict: a document missing any word does not match.
    WordAnd(Vec<String>),
}

/// Boolean combination operator over document sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoolOp {
    And,
    Or,
}

/// Boolean tree over primitive operations. Always has at least one leaf;
/// the constructors below preserve that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QueryPredicate {
    Leaf(PrimitiveOp),
    Combine(BoolOp, Vec<QueryPredicate>),
}

impl QueryPredicate {
    pub fn leaf(op: PrimitiveOp) -> Self {
        QueryPredicate::Leaf(op)
    }

    /// OR of `children`. A single child collapses to itself.
    pub fn union(mut children: Vec<QueryPredicate>) -> Self {
        debug_assert!(!children.is_empty(), "a predicate needs at least one leaf");
        if children.len() == 1 {
            children.remove(0)
        } else {
            QueryPredicate::Combine(BoolOp::Or, children)
        }
    }

    /// AND of `children`. A single child collapses to itself.
    pub fn intersection(mut children: Vec<QueryPredicate>) -> Self {
        debug_assert!(!children.is_empty(), "a predicate needs at least one leaf");
        if children.len() == 1 {
            children.remove(0)
        } else {
            QueryPredicate::Combine(BoolOp::And, children)
        }
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            QueryPredicate::Leaf(_) => 1,
            QueryPredicate::Combine(_, children) => {
                children.iter().map(QueryPredicate::leaf_count).sum()
            }
        }
    }
}

/// Map a classification to its query predicate.
///
/// Returns `None` only for empty/whitespace input — the caller short-
/// circuits to zero results instead of building a degenerate tree. For any
/// non-empty input the returned tree has at least one leaf.
///
/// - `Identifier` → exact substring of the whole string.
/// - `HybridCandidate` → tokenized full-text OR all-words-verbatim. The
///   union is deliberate: full-text may fail silently on rare proper nouns
///   or mixed symbol/word content, and the verbatim side rescues those
///   documents without suppressing full-text's own matches.
/// - `Plain` → tokenized full-text, unless the text carries a script the
///   configured language cannot segment — then all-words-verbatim alone.
pub fn select(
    text: &str,
    classification: &Classification,
    language: &LanguageConfig,
) -> Option<QueryPredicate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let predicate = match classification.kind {
        QueryKind::Identifier => {
            QueryPredicate::leaf(PrimitiveOp::ExactSubstring(trimmed.to_string()))
        }
        QueryKind::HybridCandidate => QueryPredicate::union(vec![
            QueryPredicate::leaf(PrimitiveOp::FullText(trimmed.to_string())),
            QueryPredicate::leaf(PrimitiveOp::WordAnd(words_of(trimmed))),
        ]),
        QueryKind::Plain => {
            if language.covers(trimmed) {
                QueryPredicate::leaf(PrimitiveOp::FullText(trimmed.to_string()))
            } else {
                QueryPredicate::leaf(PrimitiveOp::WordAnd(words_of(trimmed)))
            }
        }
    };
    Some(predicate)
}

/// Whitespace-split tokens with empties removed, original casing kept.
fn words_of(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}
