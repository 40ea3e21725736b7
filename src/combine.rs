//! Query materialization — binding a predicate tree to one request.
//!
//! Walks the tree once, attaching the request's field set to every leaf and
//! the resolved language config to every analyzed leaf. Structure is
//! preserved 1:1: AND/OR children may stay flat within one operator
//! (document-set AND/OR is associative and commutative) but grouping
//! boundaries between different operators are never merged.

use crate::interface::{SearchError, SearchRequest};
use crate::language::LanguageConfig;
use crate::plan::{BoolOp, PrimitiveOp, QueryPredicate};

/// A leaf bound to the fields and language it will execute against.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundOp {
    ExactSubstring {
        text: String,
        fields: Vec<String>,
    },
    Phrase {
        text: String,
        fields: Vec<String>,
        language: LanguageConfig,
    },
    FullText {
        text: String,
        fields: Vec<String>,
        language: LanguageConfig,
    },
    WordAnd {
        words: Vec<String>,
        fields: Vec<String>,
    },
}

/// The execution adapter's native input: a bound predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledQuery {
    Leaf(BoundOp),
    Bool(BoolOp, Vec<CompiledQuery>),
}

impl CompiledQuery {
    /// Number of bound leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            CompiledQuery::Leaf(_) => 1,
            CompiledQuery::Bool(_, children) => {
                children.iter().map(CompiledQuery::leaf_count).sum()
            }
        }
    }
}

/// Bind `predicate` to `request`, resolving the request's language token.
///
/// An unknown token surfaces as `InvalidConfig` here, before anything
/// touches the index.
pub fn materialize(
    predicate: &QueryPredicate,
    request: &SearchRequest,
) -> Result<CompiledQuery, SearchError> {
    let language = LanguageConfig::resolve(request.language.as_deref())?;
    Ok(bind(predicate, request.effective_fields(), language))
}

fn bind(predicate: &QueryPredicate, fields: &[String], language: LanguageConfig) -> CompiledQuery {
    match predicate {
        QueryPredicate::Leaf(op) => CompiledQuery::Leaf(bind_leaf(op, fields, language)),
        QueryPredicate::Combine(bool_op, children) => CompiledQuery::Bool(
            *bool_op,
            children
                .iter()
                .map(|child| bind(child, fields, language))
                .collect(),
        ),
    }
}

fn bind_leaf(op: &PrimitiveOp, fields: &[String], language: LanguageConfig) -> BoundOp {
    let fields = fields.to_vec();
    match op {
        PrimitiveOp::ExactSubstring(text) => BoundOp::ExactSubstring {
            text: text.clone(),
            fields,
        },
        PrimitiveOp::Phrase(text) => BoundOp::Phrase {
            text: text.clone(),
            fields,
            language,
        },
        PrimitiveOp::FullText(text) => BoundOp::FullText {
            text: text.clone(),
            fields,
            language,
        },
        PrimitiveOp::WordAnd(words) => BoundOp::WordAnd {
            words: words.clone(),
            fields,
        },
    }
}
