use super::{is_keyword, DocSet};
use crate::index::{InvertedIndex, PhoneticIndex, Term};
use crate::soundex::soundex;
use crate::tokenizer::Normalizer;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhoneticMatch {
    pub documents: DocSet,
    /// Normalized query token -> indexed terms sharing its Soundex code.
    pub expansions: BTreeMap<String, BTreeSet<Term>>,
}

/// Each query token matches every document holding a term with the same
/// Soundex code; tokens are combined conjunctively. Boolean keywords are dropped.
pub fn evaluate_phonetic(
    query: &str,
    normalizer: &dyn Normalizer,
    phonetic: &PhoneticIndex,
    index: &InvertedIndex,
) -> PhoneticMatch {
    let tokens: Vec<String> = query
        .split_whitespace()
        .filter(|tok| !is_keyword(tok))
        .flat_map(|tok| normalizer.normalize(tok))
        .collect();

    let mut expansions = BTreeMap::new();
    let mut documents: Option<DocSet> = None;
    for token in tokens {
        let terms: BTreeSet<Term> = soundex(&token)
            .map(|code| phonetic.terms(&code).cloned().collect())
            .unwrap_or_default();
        let mut matched = DocSet::new();
        for term in &terms {
            matched.extend(index.documents(term));
        }
        documents = Some(match documents {
            None => matched,
            Some(acc) => acc.intersection(&matched).cloned().collect(),
        });
        expansions.insert(token, terms);
    }

    PhoneticMatch { documents: documents.unwrap_or_default(), expansions }
}
