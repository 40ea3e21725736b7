//! Public request/outcome/error types for the dispatch layer.
//!
//! These are the types callers exchange with [`QueryRouter`](crate::QueryRouter)
//! and the execution adapter boundary. Everything here is immutable once
//! constructed and cheap to clone.

use serde::Serialize;
use thiserror::Error;

use crate::index::IndexError;

/// One search request, created after normalization and discarded once the
/// predicate has been materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Normalized search text (transport escaping already reversed).
    pub text: String,
    /// Field names the query runs against.
    pub fields: Vec<String>,
    /// Optional language token, resolved against the registry in
    /// [`language`](crate::language). `None` means the default language.
    pub language: Option<String>,
    /// When false, only the first entry of `fields` is searched.
    pub multi_field: bool,
}

impl SearchRequest {
    /// Request against `fields` with the default language, all fields active.
    pub fn new(text: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            text: text.into(),
            fields,
            language: None,
            multi_field: true,
        }
    }

    /// Bind an explicit language token.
    pub fn with_language(mut self, token: impl Into<String>) -> Self {
        self.language = Some(token.into());
        self
    }

    /// Restrict execution to the first field in the set.
    pub fn single_field(mut self) -> Self {
        self.multi_field = false;
        self
    }

    /// The fields execution actually targets, honoring `multi_field`.
    pub fn effective_fields(&self) -> &[String] {
        if self.multi_field {
            &self.fields
        } else {
            &self.fields[..self.fields.len().min(1)]
        }
    }
}

/// What routing a raw query produced.
///
/// `EmptyQuery` is an outcome, not an error: whether it surfaces to the end
/// user as zero results or a validation message is the transport layer's
/// decision. The adapter is never invoked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SearchOutcome {
    /// Input was empty (or whitespace-only) after normalization.
    EmptyQuery,
    /// Matching document identifiers from the execution adapter.
    Matches(Vec<i64>),
}

impl SearchOutcome {
    /// Matched ids, treating an empty query as zero results.
    pub fn ids(&self) -> &[i64] {
        match self {
            SearchOutcome::EmptyQuery => &[],
            SearchOutcome::Matches(ids) => ids,
        }
    }
}

/// Error type for the routing and execution boundary.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The underlying index could not serve the query.
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),
    /// The execution adapter gave up waiting on the index.
    #[error("query timed out: {0}")]
    QueryTimeout(String),
    /// Unknown language token or a query bound to a config the index was
    /// not built with. Never downgraded to a default: silently changing
    /// tokenization behavior is the failure mode this layer exists to
    /// prevent.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),
}

impl From<IndexError> for SearchError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::UnknownField(_) | IndexError::LanguageMismatch { .. } => {
                SearchError::InvalidConfig(e.to_string())
            }
            _ => SearchError::IndexUnavailable(e.to_string()),
        }
    }
}
