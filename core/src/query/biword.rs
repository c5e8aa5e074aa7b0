use super::DocSet;
use crate::error::{Result, SearchError};
use crate::index::{biword_key, BiwordIndex};
use crate::tokenizer::Normalizer;

/// Documents containing every adjacent pair of the normalized query.
///
/// Exact for two-term phrases. For longer phrases the pairs are not checked to
/// line up at consecutive offsets, so a document may match with the pairs
/// scattered.
pub fn evaluate_biword(query: &str, normalizer: &dyn Normalizer, index: &BiwordIndex) -> Result<DocSet> {
    let terms = normalizer.normalize(query);
    if terms.len() < 2 {
        return Err(SearchError::usage(format!(
            "phrase query needs at least two terms, got {}",
            terms.len()
        )));
    }

    let mut pairs = terms.windows(2).map(|pair| biword_key(&pair[0], &pair[1]));
    let mut result = match pairs.next() {
        Some(first) => index.documents(&first),
        None => return Ok(DocSet::new()),
    };
    for key in pairs {
        if result.is_empty() {
            break;
        }
        let docs = index.documents(&key);
        result.retain(|doc| docs.contains(doc));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::tokenizer::PlainNormalizer;
    use std::sync::Arc;

    fn index() -> BiwordIndex {
        IndexBuilder::new(Arc::new(PlainNormalizer))
            .build([
                ("doc1", "cat sat"),
                ("doc2", "dog sat down"),
                ("doc3", "cat dog"),
                ("doc4", "dog cat sat"),
                ("doc5", "cat sat then sat down"),
            ])
            .biwords
    }

    fn run(query: &str) -> Vec<String> {
        evaluate_biword(query, &PlainNormalizer, &index()).unwrap().into_iter().collect()
    }

    #[test]
    fn two_term_phrase_requires_adjacency() {
        assert_eq!(run("cat dog"), vec!["doc3"]);
        assert_eq!(run("dog cat"), vec!["doc4"]);
        assert_eq!(run("Cat, SAT!"), vec!["doc1", "doc4", "doc5"]);
    }

    #[test]
    fn longer_phrase_intersects_every_pair() {
        assert_eq!(run("cat sat down"), vec!["doc5"]);
        assert!(run("cat dog sat").is_empty());
    }

    #[test]
    fn missing_pair_empties_the_result() {
        assert!(run("sat cat").is_empty());
    }

    #[test]
    fn single_term_is_a_usage_error() {
        let err = evaluate_biword("cat", &PlainNormalizer, &index()).unwrap_err();
        assert!(matches!(err, SearchError::Usage(_)));
    }
}
