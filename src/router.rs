//! End-to-end dispatch: normalize → classify → select → materialize → execute.
//!
//! The router is the one place the pipeline stages meet. Each stage is a
//! pure function over its own data; the only side effect on this path is
//! the final handoff to the execution adapter, which owns its own
//! concurrency and resource model.

use crate::classify::{classify, Classification, ClassifierOptions};
use crate::combine::materialize;
use crate::index::ExecutionAdapter;
use crate::interface::{SearchError, SearchOutcome, SearchRequest};
use crate::language::LanguageConfig;
use crate::normalize::normalize;
use crate::plan::{select, QueryPredicate};

/// Everything the router decided for one query, short of executing it.
/// Useful for diagnostics and for testing routing without an index.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Input after transport decoding.
    pub normalized: String,
    pub classification: Classification,
    /// `None` for empty input.
    pub predicate: Option<QueryPredicate>,
}

/// Routes raw search strings to an execution adapter.
pub struct QueryRouter<A> {
    adapter: A,
    fields: Vec<String>,
    options: ClassifierOptions,
}

impl<A: ExecutionAdapter> QueryRouter<A> {
    /// Router over `adapter`, searching `fields`, default classifier tuning.
    pub fn new(adapter: A, fields: Vec<String>) -> Self {
        Self {
            adapter,
            fields,
            options: ClassifierOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClassifierOptions) -> Self {
        self.options = options;
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Search with the default language across all configured fields.
    pub fn search(&self, raw: &str) -> Result<SearchOutcome, SearchError> {
        self.search_filtered(raw, None, true)
    }

    /// Search with an explicit language override and multi-field flag.
    pub fn search_filtered(
        &self,
        raw: &str,
        language: Option<&str>,
        multi_field: bool,
    ) -> Result<SearchOutcome, SearchError> {
        let plan = self.plan(raw, language)?;
        let Some(predicate) = plan.predicate else {
            return Ok(SearchOutcome::EmptyQuery);
        };

        let mut request = SearchRequest::new(plan.normalized, self.fields.clone());
        request.language = language.map(str::to_string);
        request.multi_field = multi_field;

        let compiled = materialize(&predicate, &request)?;
        let ids = self.adapter.execute(&compiled)?;
        Ok(SearchOutcome::Matches(ids))
    }

    /// Run the pure stages only; the adapter is never touched.
    pub fn plan(&self, raw: &str, language: Option<&str>) -> Result<QueryPlan, SearchError> {
        let language_config = LanguageConfig::resolve(language)?;
        let normalized = normalize(raw);
        let trimmed = normalized.trim();

        let classification = classify(trimmed, &self.options);
        let predicate = select(trimmed, &classification, &language_config);
        tracing::debug!(
            query = trimmed,
            kind = ?classification.kind,
            leaves = predicate.as_ref().map_or(0, QueryPredicate::leaf_count),
            "routed query"
        );

        Ok(QueryPlan {
            normalized: trimmed.to_string(),
            classification,
            predicate,
        })
    }
}
