//! Tantivy-backed execution adapter.
//!
//! Analyzed leaves (FullText, Phrase) run through tantivy with the index's
//! language analyzer (lowercasing, stop words, stemming). Verbatim leaves
//! (ExactSubstring, WordAnd) scan the stored field text instead — the
//! analyzer's stop-word and stemming behavior is exactly what those leaves
//! exist to bypass. Boolean nodes evaluate to id-set intersection/union, so
//! grouping survives the mixed execution paths unchanged.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use parking_lot::RwLock;
use tantivy::collector::DocSetCollector;
use tantivy::directory::MmapDirectory;
use tantivy::query::{BooleanQuery, Occur, PhraseQuery, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, FAST, INDEXED,
    STORED,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, Stemmer, StopWordFilter, TextAnalyzer};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use thiserror::Error;

use crate::combine::{BoundOp, CompiledQuery};
use crate::interface::SearchError;
use crate::language::LanguageConfig;
use crate::plan::BoolOp;

/// Error type for index operations.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
    #[error("Directory error: {0}")]
    Directory(#[from] tantivy::directory::error::OpenDirectoryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("index built for '{expected}', query bound to '{requested}'")]
    LanguageMismatch {
        expected: &'static str,
        requested: &'static str,
    },
}

pub type IndexResult<T> = Result<T, IndexError>;

/// The boundary this crate hands a compiled query across. The in-tree
/// implementation is [`SearchIndex`]; tests mock it to pin down boolean
/// semantics independent of any engine.
pub trait ExecutionAdapter {
    /// Execute a compiled query, returning matching document ids.
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<i64>, SearchError>;
}

/// One document's stored field text, scanned by the verbatim leaves.
#[derive(Debug, Clone, Default)]
struct StoredFields(HashMap<String, String>);

/// Buffered writes, published together with the tantivy commit so scans and
/// tokenized queries always see the same document set.
#[derive(Default)]
struct PendingOps {
    upserts: HashMap<i64, StoredFields>,
    deletes: Vec<i64>,
}

/// Tantivy index plus a stored-text view, built for one language config.
pub struct SearchIndex {
    index: Index,
    writer: RwLock<IndexWriter>,
    reader: RwLock<IndexReader>,
    id_field: Field,
    text_fields: HashMap<String, Field>,
    language: LanguageConfig,
    live_docs: RwLock<HashMap<i64, StoredFields>>,
    pending: RwLock<PendingOps>,
}

impl SearchIndex {
    /// Create an in-memory index over `fields`.
    pub fn create_in_ram(fields: &[&str], language: LanguageConfig) -> IndexResult<Self> {
        let schema = Self::build_schema(fields, &language);
        let index = Index::create_in_ram(schema.clone());
        Self::register_analyzer(&index, &language);

        let writer = index.writer(15_000_000)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self::from_parts(index, writer, reader, schema, fields, language))
    }

    /// Create or open an on-disk index at `path` over `fields`.
    pub fn open_or_create(
        path: &Path,
        fields: &[&str],
        language: LanguageConfig,
    ) -> IndexResult<Self> {
        std::fs::create_dir_all(path)?;
        let dir = MmapDirectory::open(path)?;
        let schema = Self::build_schema(fields, &language);
        let index = Index::open_or_create(dir, schema.clone())?;
        Self::register_analyzer(&index, &language);

        let writer = index.writer(50_000_000)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self::from_parts(index, writer, reader, schema, fields, language))
    }

    fn from_parts(
        index: Index,
        writer: IndexWriter,
        reader: IndexReader,
        schema: Schema,
        fields: &[&str],
        language: LanguageConfig,
    ) -> Self {
        let text_fields = fields
            .iter()
            .map(|name| (name.to_string(), schema.get_field(name).unwrap()))
            .collect();
        Self {
            id_field: schema.get_field("id").unwrap(),
            text_fields,
            language,
            index,
            writer: RwLock::new(writer),
            reader: RwLock::new(reader),
            live_docs: RwLock::new(HashMap::new()),
            pending: RwLock::new(PendingOps::default()),
        }
    }

    fn build_schema(fields: &[&str], language: &LanguageConfig) -> Schema {
        let mut builder = Schema::builder();
        builder.add_i64_field("id", STORED | FAST | INDEXED);

        // Positions are required for PhraseQuery
        let indexing = TextFieldIndexing::default()
            .set_tokenizer(&language.analyzer_name())
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let options = TextOptions::default()
            .set_indexing_options(indexing)
            .set_stored();
        for name in fields {
            builder.add_text_field(name, options.clone());
        }
        builder.build()
    }

    /// Register the language analyzer with the index. The stop-word filter
    /// is what makes single-letter identifier segments unsearchable through
    /// the tokenized path; verbatim leaves exist to route around it.
    fn register_analyzer(index: &Index, language: &LanguageConfig) {
        let analyzer = match language.stemmer() {
            Some(stemmer_language) => TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(LowerCaser)
                .filter(StopWordFilter::remove(stop_word_list(language)))
                .filter(Stemmer::new(stemmer_language))
                .build(),
            None => TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(LowerCaser)
                .build(),
        };
        index.tokenizers().register(&language.analyzer_name(), analyzer);
    }

    /// The language config this index was built with.
    pub fn language(&self) -> LanguageConfig {
        self.language
    }

    /// Add or update a document. Visible to queries after [`commit`](Self::commit).
    pub fn add_document(&self, id: i64, fields: &[(&str, &str)]) -> IndexResult<()> {
        let writer = self.writer.read();

        // Delete existing document with same ID (upsert semantics)
        writer.delete_term(Term::from_field_i64(self.id_field, id));

        let mut doc = TantivyDocument::default();
        doc.add_i64(self.id_field, id);
        let mut stored = StoredFields::default();
        for (name, text) in fields {
            let field = self
                .text_fields
                .get(*name)
                .copied()
                .ok_or_else(|| IndexError::UnknownField(name.to_string()))?;
            doc.add_text(field, *text);
            stored.0.insert(name.to_string(), text.to_string());
        }
        writer.add_document(doc)?;

        self.pending.write().upserts.insert(id, stored);
        Ok(())
    }

    /// Delete a document. Visible to queries after [`commit`](Self::commit).
    pub fn delete_document(&self, id: i64) {
        let writer = self.writer.read();
        writer.delete_term(Term::from_field_i64(self.id_field, id));
        let mut pending = self.pending.write();
        pending.upserts.remove(&id);
        pending.deletes.push(id);
    }

    /// Publish buffered writes to both the tantivy reader and the stored-text view.
    pub fn commit(&self) -> IndexResult<()> {
        self.writer.write().commit()?;
        self.reader.write().reload()?;

        let mut pending = self.pending.write();
        let mut live = self.live_docs.write();
        for id in pending.deletes.drain(..) {
            live.remove(&id);
        }
        for (id, stored) in pending.upserts.drain() {
            live.insert(id, stored);
        }
        Ok(())
    }

    /// Number of committed documents.
    pub fn num_docs(&self) -> u64 {
        self.reader.read().searcher().num_docs()
    }

    /// Remove every document from the index.
    pub fn clear(&self) -> IndexResult<()> {
        {
            let mut writer = self.writer.write();
            writer.delete_all_documents()?;
            writer.commit()?;
        }
        self.reader.write().reload()?;
        self.live_docs.write().clear();
        *self.pending.write() = PendingOps::default();
        Ok(())
    }

    // ── Leaf execution ───────────────────────────────────────────

    fn eval(&self, query: &CompiledQuery) -> IndexResult<BTreeSet<i64>> {
        match query {
            CompiledQuery::Leaf(op) => self.eval_leaf(op),
            CompiledQuery::Bool(BoolOp::Or, children) => {
                let mut ids = BTreeSet::new();
                for child in children {
                    ids.extend(self.eval(child)?);
                }
                Ok(ids)
            }
            CompiledQuery::Bool(BoolOp::And, children) => {
                let mut ids: Option<BTreeSet<i64>> = None;
                for child in children {
                    let child_ids = self.eval(child)?;
                    ids = Some(match ids {
                        None => child_ids,
                        Some(acc) => acc.intersection(&child_ids).copied().collect(),
                    });
                    if ids.as_ref().is_some_and(BTreeSet::is_empty) {
                        break;
                    }
                }
                Ok(ids.unwrap_or_default())
            }
        }
    }

    fn eval_leaf(&self, op: &BoundOp) -> IndexResult<BTreeSet<i64>> {
        match op {
            BoundOp::FullText { text, fields, language } => {
                self.check_language(*language)?;
                self.analyzed_conjunction(text, fields, false)
            }
            BoundOp::Phrase { text, fields, language } => {
                self.check_language(*language)?;
                self.analyzed_conjunction(text, fields, true)
            }
            BoundOp::ExactSubstring { text, fields } => {
                let needle = text.to_lowercase();
                self.scan(fields, |doc| {
                    fields.iter().any(|f| {
                        doc.0
                            .get(f)
                            .is_some_and(|t| t.to_lowercase().contains(&needle))
                    })
                })
            }
            BoundOp::WordAnd { words, fields } => {
                let needles: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
                self.scan(fields, |doc| {
                    let haystack = fields
                        .iter()
                        .filter_map(|f| doc.0.get(f).map(String::as_str))
                        .collect::<Vec<_>>()
                        .join("\n")
                        .to_lowercase();
                    needles.iter().all(|w| haystack.contains(w.as_str()))
                })
            }
        }
    }

    /// Tokenized query over `fields`: every analyzed token must match within
    /// a field (`as_phrase` additionally requires adjacency), any field may
    /// satisfy the query.
    fn analyzed_conjunction(
        &self,
        text: &str,
        fields: &[String],
        as_phrase: bool,
    ) -> IndexResult<BTreeSet<i64>> {
        let tokens = self.analyze(text);
        if tokens.is_empty() {
            // Everything was stop-worded away; a match is unprovable
            return Ok(BTreeSet::new());
        }

        let mut per_field: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for name in fields {
            let field = self
                .text_fields
                .get(name)
                .copied()
                .ok_or_else(|| IndexError::UnknownField(name.clone()))?;
            let terms: Vec<Term> = tokens
                .iter()
                .map(|t| Term::from_field_text(field, t))
                .collect();

            let field_query: Box<dyn Query> = if as_phrase && terms.len() >= 2 {
                Box::new(PhraseQuery::new(terms))
            } else {
                let clauses: Vec<(Occur, Box<dyn Query>)> = terms
                    .into_iter()
                    .map(|term| {
                        let q: Box<dyn Query> =
                            Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                        (Occur::Must, q)
                    })
                    .collect();
                Box::new(BooleanQuery::new(clauses))
            };
            per_field.push((Occur::Should, field_query));
        }

        self.run_tantivy(BooleanQuery::new(per_field))
    }

    fn run_tantivy(&self, query: BooleanQuery) -> IndexResult<BTreeSet<i64>> {
        let reader = self.reader.read();
        let searcher = reader.searcher();
        let addresses = searcher.search(&query, &DocSetCollector)?;

        let mut ids = BTreeSet::new();
        for address in addresses {
            let doc: TantivyDocument = searcher.doc(address)?;
            let id = doc
                .get_first(self.id_field)
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            ids.insert(id);
        }
        Ok(ids)
    }

    /// Scan the stored-text view with `matches`, validating `fields` first.
    fn scan<F>(&self, fields: &[String], matches: F) -> IndexResult<BTreeSet<i64>>
    where
        F: Fn(&StoredFields) -> bool,
    {
        for name in fields {
            if !self.text_fields.contains_key(name) {
                return Err(IndexError::UnknownField(name.clone()));
            }
        }
        let live = self.live_docs.read();
        Ok(live
            .iter()
            .filter(|(_, doc)| matches(doc))
            .map(|(id, _)| *id)
            .collect())
    }

    /// Tokenize `text` through the index's registered analyzer.
    fn analyze(&self, text: &str) -> Vec<String> {
        let mut analyzer = self
            .index
            .tokenizers()
            .get(&self.language.analyzer_name())
            .unwrap();
        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while let Some(token) = stream.next() {
            tokens.push(token.text.clone());
        }
        tokens
    }

    fn check_language(&self, bound: LanguageConfig) -> IndexResult<()> {
        if bound != self.language {
            return Err(IndexError::LanguageMismatch {
                expected: self.language.token(),
                requested: bound.token(),
            });
        }
        Ok(())
    }
}

impl ExecutionAdapter for SearchIndex {
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<i64>, SearchError> {
        let ids = self.eval(query)?;
        Ok(ids.into_iter().collect())
    }
}

fn stop_word_list(language: &LanguageConfig) -> Vec<String> {
    use stop_words::{get, LANGUAGE};
    let words: &[&str] = match language.token() {
        "english" => get(LANGUAGE::English),
        "french" => get(LANGUAGE::French),
        "german" => get(LANGUAGE::German),
        "spanish" => get(LANGUAGE::Spanish),
        _ => &[],
    };
    words.iter().map(|s| s.to_string()).collect()
}
