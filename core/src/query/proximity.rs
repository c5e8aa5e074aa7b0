use crate::error::{Result, SearchError};
use crate::index::{DocId, InvertedIndex};
use crate::tokenizer::Normalizer;
use std::collections::BTreeMap;

/// Per document, one distance (words in between) for each qualifying position of the first term.
pub type ProximityHits = BTreeMap<DocId, Vec<usize>>;

/// Match documents where two terms occur with at most `window` words between them.
///
/// A bare `and` is dropped from the normalized query, so `x AND y` works.
/// For every position of the first term, the first position of the second term
/// within the window is recorded; documents with no recorded distance are left out.
/// When both terms are the same, a position is never paired with itself, so
/// every distance is at least zero.
pub fn evaluate_proximity(
    query: &str,
    normalizer: &dyn Normalizer,
    index: &InvertedIndex,
    window: usize,
) -> Result<ProximityHits> {
    let terms: Vec<String> = normalizer
        .normalize(query)
        .into_iter()
        .filter(|t| t != "and")
        .collect();
    let [first, second] = terms.as_slice() else {
        return Err(SearchError::usage(format!(
            "proximity query needs exactly two terms, got {}",
            terms.len()
        )));
    };

    let mut hits = ProximityHits::new();
    let (Some(docs1), Some(docs2)) = (index.postings(first), index.postings(second)) else {
        return Ok(hits);
    };

    for (doc, positions1) in docs1 {
        let Some(positions2) = docs2.get(doc) else {
            continue;
        };
        let distances: Vec<usize> = positions1
            .iter()
            .filter_map(|&p1| {
                positions2
                    .iter()
                    .filter(|&&p2| p2 != p1)
                    .map(|&p2| p1.abs_diff(p2) - 1)
                    .find(|&distance| distance <= window)
            })
            .collect();
        if !distances.is_empty() {
            hits.insert(doc.clone(), distances);
        }
    }
    Ok(hits)
}
