use seeker_core::query::{intersect, union, DocSet};
use seeker_core::tokenizer::{Normalizer, PlainNormalizer};
use seeker_core::{DocId, EngineConfig, NormalizerKind, Query, QueryResult, SearchEngine};
use std::collections::BTreeSet;

fn scenario() -> SearchEngine {
    let engine = SearchEngine::new(EngineConfig::default().with_normalizer(NormalizerKind::Plain));
    engine.build(vec![
        ("doc1".into(), "cat sat".into()),
        ("doc2".into(), "dog sat down".into()),
        ("doc3".into(), "cat dog".into()),
    ]);
    engine
}

fn set(ids: &[&str]) -> DocSet {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn inverted_index_matches_expected_postings() {
    let engine = scenario();
    let snap = engine.snapshot().unwrap();
    let inv = &snap.indexes().inverted;
    assert_eq!(inv.len(), 4);
    assert_eq!(inv.positions("cat", "doc1"), Some(&[0][..]));
    assert_eq!(inv.positions("cat", "doc3"), Some(&[0][..]));
    assert_eq!(inv.positions("sat", "doc1"), Some(&[1][..]));
    assert_eq!(inv.positions("sat", "doc2"), Some(&[1][..]));
    assert_eq!(inv.positions("dog", "doc2"), Some(&[0][..]));
    assert_eq!(inv.positions("dog", "doc3"), Some(&[1][..]));
    assert_eq!(inv.positions("down", "doc2"), Some(&[2][..]));
    assert_eq!(inv.documents("cat"), set(&["doc1", "doc3"]));
}

#[test]
fn boolean_scenarios() {
    let engine = scenario();
    assert_eq!(engine.boolean("cat AND dog").unwrap(), set(&["doc3"]));
    assert_eq!(engine.boolean("cat OR dog").unwrap(), set(&["doc1", "doc2", "doc3"]));
    assert_eq!(engine.boolean("NOT sat").unwrap(), set(&["doc3"]));
}

#[test]
fn biword_scenario() {
    assert_eq!(scenario().biword("cat dog").unwrap(), set(&["doc3"]));
}

#[test]
fn proximity_scenario() {
    let hits = scenario().proximity("sat dog", 1).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits["doc2"], vec![0]);
}

#[test]
fn every_term_lists_exactly_the_documents_containing_it() {
    let docs: Vec<(DocId, String)> = vec![
        ("a".into(), "the quick brown fox jumps over the lazy dog".into()),
        ("b".into(), "a quick brown dog outpaces a quick red fox".into()),
        ("c".into(), "lorem ipsum dolor sit amet".into()),
        ("d".into(), "".into()),
    ];
    let engine = SearchEngine::new(EngineConfig::default().with_normalizer(NormalizerKind::Plain));
    engine.build(docs.clone());
    let snap = engine.snapshot().unwrap();
    let inv = &snap.indexes().inverted;

    for (term, postings) in inv.iter() {
        let expected: BTreeSet<DocId> = docs
            .iter()
            .filter(|(_, text)| PlainNormalizer.normalize(text).contains(term))
            .map(|(id, _)| id.clone())
            .collect();
        let actual: BTreeSet<DocId> = postings.keys().cloned().collect();
        assert_eq!(actual, expected, "term {term}");
        for positions in postings.values() {
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
    assert_eq!(snap.indexes().documents.len(), 4);
}

#[test]
fn biword_pairs_are_exactly_the_adjacent_occurrences() {
    let engine = SearchEngine::new(EngineConfig::default().with_normalizer(NormalizerKind::Plain));
    engine.build(vec![
        ("a".into(), "new york city".into()),
        ("b".into(), "york new".into()),
        ("c".into(), "new jersey and york".into()),
        ("d".into(), "brand new york bagels".into()),
    ]);
    assert_eq!(engine.biword("new york").unwrap(), set(&["a", "d"]));
    assert_eq!(engine.biword("york new").unwrap(), set(&["b"]));
}

#[test]
fn set_algebra_properties() {
    let engine = scenario();
    let snap = engine.snapshot().unwrap();
    let idx = snap.indexes();
    let cat = idx.inverted.documents("cat");
    let sat = idx.inverted.documents("sat");

    assert_eq!(intersect(&cat, &sat), intersect(&sat, &cat));
    assert_eq!(union(&cat, &sat), union(&sat, &cat));
    assert_eq!(idx.documents.complement(&idx.documents.complement(&cat)), cat);
    assert_eq!(union(&cat, &DocSet::new()), cat);

    assert_eq!(engine.boolean("cat AND sat").unwrap(), engine.boolean("sat AND cat").unwrap());
    assert_eq!(engine.boolean("cat OR sat").unwrap(), engine.boolean("sat OR cat").unwrap());
}

#[test]
fn ranking_is_deterministic() {
    let build = || {
        let engine = SearchEngine::new(EngineConfig::default());
        engine.build(
            (0..40)
                .map(|i| (format!("doc{i:02}.txt"), format!("search engines rank documents {}", "index ".repeat(i % 4))))
                .chain(std::iter::once(("misc.txt".to_string(), "unrelated text about gardening".to_string())))
                .collect(),
        );
        engine
    };
    let first = build().rank("ranking search index").unwrap();
    let second = build().rank("ranking search index").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 10);
    for pair in first.windows(2) {
        assert!(pair[0].score > pair[1].score || (pair[0].score == pair[1].score && pair[0].doc_id < pair[1].doc_id));
    }
}

#[test]
fn ranked_query_without_known_terms_is_empty() {
    let engine = scenario();
    assert!(engine.rank("zebra").unwrap().is_empty());
    assert!(engine.rank("").unwrap().is_empty());
}

#[test]
fn execute_dispatches_by_mode() {
    let engine = scenario();
    let q = Query::from_mode("phonetic", "cet", None, None).unwrap();
    match engine.execute(&q).unwrap() {
        QueryResult::Phonetic(m) => {
            assert_eq!(m.documents, set(&["doc1", "doc3"]));
            assert!(m.expansions["cet"].contains("cat"));
        }
        other => panic!("unexpected result {other:?}"),
    }

    let q = Query::from_mode("ranked", "down", None, Some(1)).unwrap();
    let result = engine.execute(&q).unwrap();
    assert_eq!(result.doc_ids(), vec!["doc2"]);

    let q = Query::from_mode("proximity", "cat", Some(3), None).unwrap();
    assert!(engine.execute(&q).unwrap_err().is_client_error());
}
