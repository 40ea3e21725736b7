//! Routing-level tests: classification → predicate shapes, boolean safety,
//! and normalizer properties — all without a real index. The execution
//! adapter is mocked so boolean semantics are pinned down independent of
//! any engine's behavior.

use std::collections::BTreeSet;

use vizsla::classify::{classify, ClassifierOptions, QueryKind};
use vizsla::combine::{BoundOp, CompiledQuery};
use vizsla::normalize::normalize;
use vizsla::plan::{BoolOp, PrimitiveOp, QueryPredicate};
use vizsla::{ExecutionAdapter, QueryRouter, SearchError, SearchOutcome};

// ============================================================
// Mock adapter
// ============================================================

/// Evaluates compiled queries against canned per-strategy answers, so tests
/// can force one strategy to miss and assert the union still delivers.
struct CannedAdapter {
    full_text: Vec<i64>,
    word_and: Vec<i64>,
    exact: Vec<i64>,
    phrase: Vec<i64>,
}

impl CannedAdapter {
    fn eval(&self, query: &CompiledQuery) -> BTreeSet<i64> {
        match query {
            CompiledQuery::Leaf(op) => match op {
                BoundOp::FullText { .. } => self.full_text.iter().copied().collect(),
                BoundOp::WordAnd { .. } => self.word_and.iter().copied().collect(),
                BoundOp::ExactSubstring { .. } => self.exact.iter().copied().collect(),
                BoundOp::Phrase { .. } => self.phrase.iter().copied().collect(),
            },
            CompiledQuery::Bool(BoolOp::Or, children) => children
                .iter()
                .flat_map(|child| self.eval(child))
                .collect(),
            CompiledQuery::Bool(BoolOp::And, children) => {
                let mut sets = children.iter().map(|child| self.eval(child));
                let first = sets.next().unwrap_or_default();
                sets.fold(first, |acc, s| acc.intersection(&s).copied().collect())
            }
        }
    }
}

impl ExecutionAdapter for CannedAdapter {
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<i64>, SearchError> {
        Ok(self.eval(query).into_iter().collect())
    }
}

fn router(adapter: CannedAdapter) -> QueryRouter<CannedAdapter> {
    QueryRouter::new(adapter, vec!["title".into(), "body".into()])
}

// ============================================================
// Routing scenarios: classification → predicate
// ============================================================

fn plan_predicate(raw: &str) -> Option<QueryPredicate> {
    let adapter = CannedAdapter { full_text: vec![], word_and: vec![], exact: vec![], phrase: vec![] };
    router(adapter).plan(raw, None).unwrap().predicate
}

#[test]
fn scenario_identifier_a_variant() {
    assert_eq!(
        plan_predicate("KCDC_A-005"),
        Some(QueryPredicate::Leaf(PrimitiveOp::ExactSubstring("KCDC_A-005".into())))
    );
}

#[test]
fn scenario_identifier_b_variant_same_strategy() {
    // The original failure was asymmetric: A failed while B worked. Both
    // now route through the identical exact-substring strategy.
    assert_eq!(
        plan_predicate("KCDC_B-005"),
        Some(QueryPredicate::Leaf(PrimitiveOp::ExactSubstring("KCDC_B-005".into())))
    );
}

#[test]
fn scenario_percent_encoded_delimiter_path() {
    assert_eq!(
        plan_predicate("%23/10/9/4"),
        Some(QueryPredicate::Leaf(PrimitiveOp::ExactSubstring("#/10/9/4".into())))
    );
}

#[test]
fn scenario_hybrid_candidate_union() {
    assert_eq!(
        plan_predicate("Kundeling archives ID 108"),
        Some(QueryPredicate::Combine(
            BoolOp::Or,
            vec![
                QueryPredicate::Leaf(PrimitiveOp::FullText("Kundeling archives ID 108".into())),
                QueryPredicate::Leaf(PrimitiveOp::WordAnd(vec![
                    "Kundeling".into(),
                    "archives".into(),
                    "ID".into(),
                    "108".into(),
                ])),
            ]
        ))
    );
}

#[test]
fn scenario_empty_query_zero_leaves() {
    assert_eq!(plan_predicate(""), None);
}

#[test]
fn scenario_plain_full_text() {
    assert_eq!(
        plan_predicate("simple search"),
        Some(QueryPredicate::Leaf(PrimitiveOp::FullText("simple search".into())))
    );
}

// ============================================================
// OR-safety
// ============================================================

#[test]
fn or_safety_word_and_matches_survive_full_text_miss() {
    // Full-text finds nothing; the verbatim side finds two documents.
    // The union must deliver them — this is the whole point of hybrid.
    let adapter = CannedAdapter {
        full_text: vec![],
        word_and: vec![4, 9],
        exact: vec![],
        phrase: vec![],
    };
    let outcome = router(adapter).search("Kundeling archives ID 108").unwrap();
    assert_eq!(outcome, SearchOutcome::Matches(vec![4, 9]));
}

#[test]
fn or_safety_full_text_matches_not_suppressed() {
    let adapter = CannedAdapter {
        full_text: vec![1, 2],
        word_and: vec![2, 3],
        exact: vec![],
        phrase: vec![],
    };
    let outcome = router(adapter).search("Kundeling archives ID 108").unwrap();
    assert_eq!(outcome, SearchOutcome::Matches(vec![1, 2, 3]));
}

// ============================================================
// Properties
// ============================================================

#[test]
fn property_normalize_idempotent() {
    let inputs = [
        "KCDC_A-005",
        "%23/10/9/4",
        "Kundeling%20archives",
        "100% done",
        "%2523",
        "no escapes at all",
        "%",
        "%%20",
        "trailing %2",
    ];
    for input in inputs {
        let once = normalize(input).into_owned();
        let twice = normalize(&once).into_owned();
        assert_eq!(once, twice, "normalize(normalize({input:?}))");
    }
}

#[test]
fn property_identifier_classification_stable_under_case() {
    let options = ClassifierOptions::default();
    for id in ["KCDC_A-005", "KCDC_B-005", "KCDC_A", "A-005", "AB_CD_E-17"] {
        for variant in [id.to_lowercase(), id.to_uppercase(), id.to_string()] {
            assert_eq!(
                classify(&variant, &options).kind,
                QueryKind::Identifier,
                "classification changed under case for {variant:?}"
            );
        }
    }
}

#[test]
fn property_non_empty_input_never_empty_tree() {
    let inputs = [
        "KCDC_A-005", "#/10/9/4", "John Smith", "simple search", "x",
        "学生生活", "Kundeling archives ID 108 (012 1-1/#/11/7/4)",
    ];
    let adapter = CannedAdapter { full_text: vec![], word_and: vec![], exact: vec![], phrase: vec![] };
    let router = router(adapter);
    for input in inputs {
        let plan = router.plan(input, None).unwrap();
        let predicate = plan.predicate.expect("non-empty input must produce a predicate");
        assert!(predicate.leaf_count() >= 1, "empty tree for {input:?}");
    }
}

#[test]
fn original_casing_preserved_in_leaves() {
    match plan_predicate("John Smith") {
        Some(QueryPredicate::Combine(BoolOp::Or, children)) => {
            assert_eq!(
                children[0],
                QueryPredicate::Leaf(PrimitiveOp::FullText("John Smith".into()))
            );
            assert_eq!(
                children[1],
                QueryPredicate::Leaf(PrimitiveOp::WordAnd(vec!["John".into(), "Smith".into()]))
            );
        }
        other => panic!("expected hybrid union, got {other:?}"),
    }
}

#[test]
fn parenthesized_bug_report_query_is_identifier_free_hybrid() {
    // The full query from the original bug report: symbols push it to the
    // hybrid union, not the identifier path (it is not one identifier).
    let predicate = plan_predicate("Kundeling archives ID 108 (012 1-1/#/11/7/4)").unwrap();
    match predicate {
        QueryPredicate::Combine(BoolOp::Or, children) => assert_eq!(children.len(), 2),
        other => panic!("expected hybrid union, got {other:?}"),
    }
}
