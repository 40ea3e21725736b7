//! End-to-end tests through the real tantivy backend: raw string in,
//! document ids out. These exercise the blind spots the dispatch layer
//! exists to route around — stop-worded identifier segments, stemming
//! mismatches, scripts the analyzer cannot segment.

use tempfile::TempDir;
use vizsla::language::LanguageConfig;
use vizsla::{QueryRouter, SearchError, SearchIndex, SearchOutcome};

/// Catalogue-style corpus: two identifier variants that tokenize
/// identically, plus a record findable only through hybrid matching.
fn seeded_index() -> SearchIndex {
    let english = LanguageConfig::resolve(None).unwrap();
    let index = SearchIndex::create_in_ram(&["label", "text"], english).unwrap();
    index
        .add_document(1, &[("label", "KCDC_A-005"), ("text", "Ritual manual, volume five")])
        .unwrap();
    index
        .add_document(2, &[("label", "KCDC_B-005"), ("text", "Ritual manual, companion volume")])
        .unwrap();
    index
        .add_document(
            3,
            &[
                ("label", "Kundeling archives ID 108"),
                ("text", "Shelf mark (012 1-1/#/10/9/4), Kundeling collection"),
            ],
        )
        .unwrap();
    index
        .add_document(4, &[("label", "Student life"), ("text", "學生生活 photographs")])
        .unwrap();
    index.commit().unwrap();
    index
}

fn seeded_router() -> QueryRouter<SearchIndex> {
    QueryRouter::new(seeded_index(), vec!["label".into(), "text".into()])
}

#[test]
fn identifier_query_finds_exactly_its_document() {
    let router = seeded_router();
    // The single-letter segment is a stop word to the analyzer; a tokenized
    // query could not tell A-005 from B-005. Exact substring can.
    assert_eq!(router.search("KCDC_A-005").unwrap(), SearchOutcome::Matches(vec![1]));
    assert_eq!(router.search("KCDC_B-005").unwrap(), SearchOutcome::Matches(vec![2]));
}

#[test]
fn identifier_query_case_insensitive() {
    let router = seeded_router();
    assert_eq!(router.search("kcdc_a-005").unwrap(), SearchOutcome::Matches(vec![1]));
}

#[test]
fn partial_identifier_routes_like_full_identifier() {
    let router = seeded_router();
    // Prefix and fragment forms get the same strategy as the full id, so
    // substrings of identifiers behave consistently.
    assert_eq!(router.search("KCDC_A").unwrap(), SearchOutcome::Matches(vec![1]));
    assert_eq!(router.search("A-005").unwrap(), SearchOutcome::Matches(vec![1]));
    assert_eq!(router.search("B-005").unwrap(), SearchOutcome::Matches(vec![2]));
}

#[test]
fn percent_encoded_shelf_mark_found() {
    let router = seeded_router();
    // "#" must be percent-encoded by URL clients; normalization restores it
    // and the delimiter rule routes to exact substring.
    assert_eq!(router.search("%23/10/9/4").unwrap(), SearchOutcome::Matches(vec![3]));
    // Already-decoded body-transport input takes the same path
    assert_eq!(router.search("#/10/9/4").unwrap(), SearchOutcome::Matches(vec![3]));
}

#[test]
fn hybrid_query_finds_proper_noun_record() {
    let router = seeded_router();
    assert_eq!(
        router.search("Kundeling archives ID 108").unwrap(),
        SearchOutcome::Matches(vec![3])
    );
}

#[test]
fn hybrid_union_rescues_inflection_miss() {
    let router = seeded_router();
    // "collections" appears only as "collection" in the document: the
    // verbatim side misses, the stemmed full-text side carries the union.
    assert_eq!(
        router.search("Kundeling collections").unwrap(),
        SearchOutcome::Matches(vec![3])
    );
}

#[test]
fn plain_query_uses_tokenized_search() {
    let router = seeded_router();
    assert_eq!(router.search("ritual manual").unwrap(), SearchOutcome::Matches(vec![1, 2]));
}

#[test]
fn empty_query_returns_empty_outcome() {
    let router = seeded_router();
    assert_eq!(router.search("").unwrap(), SearchOutcome::EmptyQuery);
    assert_eq!(router.search("   ").unwrap(), SearchOutcome::EmptyQuery);
    assert_eq!(router.search("%20").unwrap(), SearchOutcome::EmptyQuery);
}

#[test]
fn cjk_query_falls_back_to_verbatim_matching() {
    let router = seeded_router();
    // The English analyzer cannot segment CJK; the router sends it to
    // per-word verbatim matching, which finds the substring.
    assert_eq!(router.search("學生").unwrap(), SearchOutcome::Matches(vec![4]));
    assert_eq!(router.search("學生生活").unwrap(), SearchOutcome::Matches(vec![4]));
}

#[test]
fn single_field_restriction() {
    let router = seeded_router();
    // "photographs" lives in the text field; a label-only search misses it
    let all = router.search_filtered("photographs", None, true).unwrap();
    assert_eq!(all, SearchOutcome::Matches(vec![4]));
    let label_only = router.search_filtered("photographs", None, false).unwrap();
    assert_eq!(label_only, SearchOutcome::Matches(vec![]));
}

#[test]
fn unknown_language_token_is_rejected() {
    let router = seeded_router();
    let err = router.search_filtered("anything", Some("klingon"), true).unwrap_err();
    assert!(matches!(err, SearchError::InvalidConfig(_)));
}

#[test]
fn language_mismatch_is_rejected_not_rebound() {
    let router = seeded_router();
    // The index was built with the english analyzer; a german-bound query
    // must error rather than silently execute with different tokenization.
    let err = router.search_filtered("ritual manual", Some("german"), true).unwrap_err();
    assert!(matches!(err, SearchError::InvalidConfig(_)));
}

#[test]
fn on_disk_index_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let english = LanguageConfig::resolve(None).unwrap();
    let index =
        SearchIndex::open_or_create(temp_dir.path(), &["label", "text"], english).unwrap();
    index
        .add_document(7, &[("label", "KCDC_C-005"), ("text", "Third variant")])
        .unwrap();
    index.commit().unwrap();

    let router = QueryRouter::new(index, vec!["label".into(), "text".into()]);
    assert_eq!(router.search("KCDC_C-005").unwrap(), SearchOutcome::Matches(vec![7]));
    assert_eq!(router.search("KCDC_A-005").unwrap(), SearchOutcome::Matches(vec![]));
}
