//! Vizsla — query classification and multi-strategy dispatch for full-text
//! search.
//!
//! Given a raw, possibly percent-encoded search string, decide which
//! matching strategy (or union of strategies) reliably retrieves documents
//! that naive tokenized search silently drops: single-letter tokens eaten
//! by stop-word filters, punctuation-bearing identifiers split at
//! delimiters, characters lost to transport encoding.
//!
//! Pipeline: [`normalize`](normalize::normalize) →
//! [`classify`](classify::classify) → [`select`](plan::select) →
//! [`materialize`](combine::materialize) → [`ExecutionAdapter::execute`].
//! Every stage before the adapter is a pure function; [`QueryRouter`] wires
//! them together.

pub mod classify;
pub mod combine;
pub mod index;
pub mod interface;
pub mod language;
pub mod normalize;
pub mod plan;
mod router;

pub use index::{ExecutionAdapter, SearchIndex};
pub use interface::*;
pub use router::{QueryPlan, QueryRouter};
