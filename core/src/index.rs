use crate::soundex::soundex;
use crate::tokenizer::Normalizer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

pub type Term = String;
/// Documents are identified by their file name (relative path for nested corpora).
pub type DocId = String;
pub type PhoneticCode = String;

/// Zero-based positions of a term within one document, strictly increasing.
pub type Positions = Vec<usize>;
pub type DocPostings = BTreeMap<DocId, Positions>;

/// Key -> document -> positions. Backs both the term index and the biword index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingMap {
    postings: HashMap<String, DocPostings>,
}

pub type InvertedIndex = PostingMap;
pub type BiwordIndex = PostingMap;

/// The key under which an adjacent pair is stored in a [`BiwordIndex`].
pub fn biword_key(first: &str, second: &str) -> String {
    format!("{first} {second}")
}

impl PostingMap {
    fn record(&mut self, key: &str, doc: &str, position: usize) {
        self.postings
            .entry(key.to_string())
            .or_default()
            .entry(doc.to_string())
            .or_default()
            .push(position);
    }

    pub fn postings(&self, key: &str) -> Option<&DocPostings> {
        self.postings.get(key)
    }

    pub fn positions(&self, key: &str, doc: &str) -> Option<&[usize]> {
        self.postings.get(key)?.get(doc).map(Vec::as_slice)
    }

    /// Documents containing `key`; empty when the key is unknown.
    pub fn documents(&self, key: &str) -> BTreeSet<DocId> {
        self.postings
            .get(key)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn document_frequency(&self, key: &str) -> usize {
        self.postings.get(key).map_or(0, BTreeMap::len)
    }

    pub fn term_frequency(&self, key: &str, doc: &str) -> usize {
        self.positions(key, doc).map_or(0, <[usize]>::len)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.postings.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DocPostings)> {
        self.postings.iter()
    }

    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    fn merge(&mut self, other: PostingMap) {
        for (key, docs) in other.postings {
            let mine = self.postings.entry(key).or_default();
            for (doc, positions) in docs {
                merge_positions(mine.entry(doc).or_default(), positions);
            }
        }
    }
}

// A document is normally indexed by exactly one partial build, so this is a plain move;
// overlapping inputs still end up sorted and duplicate free.
fn merge_positions(into: &mut Positions, other: Positions) {
    if into.is_empty() {
        *into = other;
        return;
    }
    into.extend(other);
    into.sort_unstable();
    into.dedup();
}

/// Soundex code -> term -> document -> positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneticIndex {
    codes: HashMap<PhoneticCode, BTreeMap<Term, DocPostings>>,
}

impl PhoneticIndex {
    fn record(&mut self, code: PhoneticCode, term: &str, doc: &str, position: usize) {
        self.codes
            .entry(code)
            .or_default()
            .entry(term.to_string())
            .or_default()
            .entry(doc.to_string())
            .or_default()
            .push(position);
    }

    pub fn terms(&self, code: &str) -> impl Iterator<Item = &Term> {
        self.codes.get(code).into_iter().flat_map(BTreeMap::keys)
    }

    pub fn entries(&self, code: &str) -> Option<&BTreeMap<Term, DocPostings>> {
        self.codes.get(code)
    }

    pub fn len(&self) -> usize { self.codes.len() }

    pub fn is_empty(&self) -> bool { self.codes.is_empty() }

    fn merge(&mut self, other: PhoneticIndex) {
        for (code, terms) in other.codes {
            let mine = self.codes.entry(code).or_default();
            for (term, docs) in terms {
                let my_docs = mine.entry(term).or_default();
                for (doc, positions) in docs {
                    merge_positions(my_docs.entry(doc).or_default(), positions);
                }
            }
        }
    }
}

/// Every document known at build time; the universe for negation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCollection {
    docs: BTreeSet<DocId>,
}

impl DocumentCollection {
    pub fn contains(&self, doc: &str) -> bool { self.docs.contains(doc) }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// All documents not in `docs`.
    pub fn complement(&self, docs: &BTreeSet<DocId>) -> BTreeSet<DocId> {
        self.docs.difference(docs).cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
    pub biwords: usize,
    pub phonetic_codes: usize,
}

/// The three indexes plus the document universe, produced together in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Indexes {
    pub inverted: InvertedIndex,
    pub biwords: BiwordIndex,
    pub phonetic: PhoneticIndex,
    pub documents: DocumentCollection,
}

impl Indexes {
    /// Scan one document's term sequence left to right.
    fn add_document(&mut self, doc: &str, terms: &[String]) {
        for (position, term) in terms.iter().enumerate() {
            self.inverted.record(term, doc, position);
            if let Some(next) = terms.get(position + 1) {
                self.biwords.record(&biword_key(term, next), doc, position);
            }
            if let Some(code) = soundex(term) {
                self.phonetic.record(code, term, doc, position);
            }
        }
        self.documents.docs.insert(doc.to_string());
    }

    /// Union of two partial builds. Commutative and associative.
    pub fn merge(mut self, other: Indexes) -> Indexes {
        self.inverted.merge(other.inverted);
        self.biwords.merge(other.biwords);
        self.phonetic.merge(other.phonetic);
        self.documents.docs.extend(other.documents.docs);
        self
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.documents.len(),
            terms: self.inverted.len(),
            biwords: self.biwords.len(),
            phonetic_codes: self.phonetic.len(),
        }
    }
}

pub struct IndexBuilder {
    normalizer: Arc<dyn Normalizer>,
}

impl IndexBuilder {
    pub fn new(normalizer: Arc<dyn Normalizer>) -> Self {
        Self { normalizer }
    }

    pub fn build<I, D, T>(&self, documents: I) -> Indexes
    where
        I: IntoIterator<Item = (D, T)>,
        D: AsRef<str>,
        T: AsRef<str>,
    {
        let mut indexes = Indexes::default();
        for (doc, text) in documents {
            let terms = self.normalizer.normalize(text.as_ref());
            indexes.add_document(doc.as_ref(), &terms);
        }
        tracing::info!(stats = ?indexes.stats(), "built indexes");
        indexes
    }

    /// Same result as [`IndexBuilder::build`], with documents scanned on the rayon pool.
    pub fn build_parallel(&self, documents: &[(DocId, String)]) -> Indexes {
        let normalizer = &self.normalizer;
        let indexes = documents
            .par_iter()
            .fold(Indexes::default, |mut acc, (doc, text)| {
                let terms = normalizer.normalize(text);
                acc.add_document(doc, &terms);
                acc
            })
            .reduce(Indexes::default, Indexes::merge);
        tracing::info!(stats = ?indexes.stats(), "built indexes in parallel");
        indexes
    }
}
