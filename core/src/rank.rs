//! Vector-space ranking with SMART weighting schemes (default `lnc.ltc`).
//!
//! A scheme names three components per side: term frequency (`n` raw count,
//! `l` = 1 + log10 tf), document frequency (`n` none, `t` = log10 N/df) and
//! normalization (`n` none, `c` cosine). Document norms are fixed when the
//! [`Ranker`] is created; a score is divided by both norms exactly once.

use crate::error::SearchError;
use crate::index::{DocId, DocumentCollection, InvertedIndex, Term};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Also the upper bound on the length of any ranked result.
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TfWeight {
    Natural,
    Logarithmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfWeight {
    None,
    Idf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    None,
    Cosine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermWeighting {
    pub tf: TfWeight,
    pub df: DfWeight,
    pub norm: Normalization,
}

impl TermWeighting {
    pub const LNC: TermWeighting =
        TermWeighting { tf: TfWeight::Logarithmic, df: DfWeight::None, norm: Normalization::Cosine };
    pub const LTC: TermWeighting =
        TermWeighting { tf: TfWeight::Logarithmic, df: DfWeight::Idf, norm: Normalization::Cosine };

    fn tf_weight(&self, tf: usize) -> f64 {
        if tf == 0 {
            return 0.0;
        }
        match self.tf {
            TfWeight::Natural => tf as f64,
            TfWeight::Logarithmic => 1.0 + (tf as f64).log10(),
        }
    }

    fn df_weight(&self, num_docs: usize, df: usize) -> f64 {
        match self.df {
            DfWeight::None => 1.0,
            DfWeight::Idf => idf(num_docs, df),
        }
    }

    fn weight(&self, tf: usize, num_docs: usize, df: usize) -> f64 {
        self.tf_weight(tf) * self.df_weight(num_docs, df)
    }
}

/// `log10(N / df)`, or 0 when either count is zero.
pub fn idf(num_docs: usize, df: usize) -> f64 {
    if num_docs == 0 || df == 0 {
        return 0.0;
    }
    (num_docs as f64 / df as f64).log10()
}

impl FromStr for TermWeighting {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SearchError::InvalidScheme(s.to_string());
        let letters: Vec<char> = s.chars().map(|c| c.to_ascii_lowercase()).collect();
        let [tf, df, norm] = letters.as_slice() else {
            return Err(invalid());
        };
        let tf = match tf {
            'n' => TfWeight::Natural,
            'l' => TfWeight::Logarithmic,
            _ => return Err(invalid()),
        };
        let df = match df {
            'n' => DfWeight::None,
            't' => DfWeight::Idf,
            _ => return Err(invalid()),
        };
        let norm = match norm {
            'n' => Normalization::None,
            'c' => Normalization::Cosine,
            _ => return Err(invalid()),
        };
        Ok(TermWeighting { tf, df, norm })
    }
}

impl fmt::Display for TermWeighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tf = match self.tf {
            TfWeight::Natural => 'n',
            TfWeight::Logarithmic => 'l',
        };
        let df = match self.df {
            DfWeight::None => 'n',
            DfWeight::Idf => 't',
        };
        let norm = match self.norm {
            Normalization::None => 'n',
            Normalization::Cosine => 'c',
        };
        write!(f, "{tf}{df}{norm}")
    }
}

/// Document-side and query-side weighting, written `ddd.qqq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeightingScheme {
    pub document: TermWeighting,
    pub query: TermWeighting,
}

impl Default for WeightingScheme {
    fn default() -> Self {
        WeightingScheme { document: TermWeighting::LNC, query: TermWeighting::LTC }
    }
}

impl FromStr for WeightingScheme {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (document, query) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| SearchError::InvalidScheme(s.to_string()))?;
        Ok(WeightingScheme { document: document.parse()?, query: query.parse()? })
    }
}

impl fmt::Display for WeightingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.document, self.query)
    }
}

impl TryFrom<String> for WeightingScheme {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeightingScheme> for String {
    fn from(scheme: WeightingScheme) -> Self {
        scheme.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Scores queries against one built inverted index.
#[derive(Debug, Clone)]
pub struct Ranker {
    scheme: WeightingScheme,
    top_k: usize,
    num_docs: usize,
    doc_norms: HashMap<DocId, f64>,
}

impl Ranker {
    pub fn new(index: &InvertedIndex, documents: &DocumentCollection, scheme: WeightingScheme, top_k: usize) -> Self {
        let num_docs = documents.len();
        let mut doc_norms: HashMap<DocId, f64> = HashMap::new();
        if scheme.document.norm == Normalization::Cosine {
            for (_term, docs) in index.iter() {
                let df = docs.len();
                for (doc, positions) in docs {
                    let w = scheme.document.weight(positions.len(), num_docs, df);
                    *doc_norms.entry(doc.clone()).or_insert(0.0) += w * w;
                }
            }
            for norm in doc_norms.values_mut() {
                *norm = norm.sqrt();
            }
        }
        Self { scheme, top_k, num_docs, doc_norms }
    }

    pub fn scheme(&self) -> WeightingScheme { self.scheme }

    pub fn top_k(&self) -> usize { self.top_k }

    /// Euclidean length of a document's weight vector, if it was normalized.
    pub fn doc_norm(&self, doc: &str) -> Option<f64> {
        self.doc_norms.get(doc).copied()
    }

    /// Query-side weights for the terms that exist in the index, plus the query norm.
    pub fn query_weights(&self, terms: &[Term], index: &InvertedIndex) -> (BTreeMap<Term, f64>, f64) {
        let mut tf: BTreeMap<&str, usize> = BTreeMap::new();
        for term in terms {
            *tf.entry(term.as_str()).or_insert(0) += 1;
        }

        let mut weights = BTreeMap::new();
        for (term, count) in tf {
            let df = index.document_frequency(term);
            if df == 0 {
                continue;
            }
            let w = self.scheme.query.weight(count, self.num_docs, df);
            if w > 0.0 {
                weights.insert(term.to_string(), w);
            }
        }

        let norm = match self.scheme.query.norm {
            Normalization::Cosine => weights.values().map(|w| w * w).sum::<f64>().sqrt(),
            Normalization::None => 1.0,
        };
        (weights, norm)
    }

    /// Highest scoring documents first, ties by ascending id, at most `top_k`
    /// (or the ranker default), never more than [`DEFAULT_TOP_K`].
    pub fn rank(&self, terms: &[Term], index: &InvertedIndex, top_k: Option<usize>) -> Vec<ScoredDoc> {
        let (weights, q_norm) = self.query_weights(terms, index);
        if weights.is_empty() || q_norm == 0.0 {
            return Vec::new();
        }

        let mut scores: HashMap<&str, f64> = HashMap::new();
        for (term, q_w) in &weights {
            let Some(docs) = index.postings(term) else {
                continue;
            };
            let df = docs.len();
            for (doc, positions) in docs {
                let d_w = self.scheme.document.weight(positions.len(), self.num_docs, df);
                *scores.entry(doc.as_str()).or_insert(0.0) += d_w * q_w;
            }
        }

        let mut ranked: Vec<ScoredDoc> = scores
            .into_iter()
            .filter_map(|(doc, dot)| {
                let d_norm = match self.scheme.document.norm {
                    Normalization::Cosine => self.doc_norms.get(doc).copied().unwrap_or(0.0),
                    Normalization::None => 1.0,
                };
                if d_norm == 0.0 {
                    return None;
                }
                let score = dot / (d_norm * q_norm);
                (score > 0.0).then(|| ScoredDoc { doc_id: doc.to_string(), score })
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id)));
        ranked.truncate(top_k.unwrap_or(self.top_k).clamp(1, DEFAULT_TOP_K));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBuilder, Indexes};
    use crate::tokenizer::PlainNormalizer;
    use std::sync::Arc;

    const EPS: f64 = 1e-9;

    fn terms(q: &str) -> Vec<String> {
        q.split_whitespace().map(str::to_string).collect()
    }

    fn build(docs: &[(&str, &str)]) -> Indexes {
        IndexBuilder::new(Arc::new(PlainNormalizer)).build(docs.iter().copied())
    }

    #[test]
    fn parses_and_prints_schemes() {
        let s: WeightingScheme = "lnc.ltc".parse().unwrap();
        assert_eq!(s, WeightingScheme::default());
        assert_eq!("LTC.ltc".parse::<WeightingScheme>().unwrap().to_string(), "ltc.ltc");
        assert!("lnc".parse::<WeightingScheme>().is_err());
        assert!("xnc.ltc".parse::<WeightingScheme>().is_err());
        assert!("lncc.ltc".parse::<WeightingScheme>().is_err());
    }

    #[test]
    fn idf_handles_zero_counts() {
        assert_eq!(idf(0, 0), 0.0);
        assert_eq!(idf(10, 0), 0.0);
        assert!((idf(100, 10) - 1.0).abs() < EPS);
    }

    #[test]
    fn lnc_ltc_by_hand() {
        // N = 3; "apple" df=1, "banana" df=2
        let idx = build(&[("d1", "apple apple banana"), ("d2", "banana cherry"), ("d3", "cherry")]);
        let ranker = Ranker::new(&idx.inverted, &idx.documents, WeightingScheme::default(), 10);

        let w_apple = 1.0 + 2f64.log10();
        let d1_norm = (w_apple * w_apple + 1.0).sqrt();
        assert!((ranker.doc_norm("d1").unwrap() - d1_norm).abs() < EPS);

        let q_apple = idf(3, 1);
        let q_banana = idf(3, 2);
        let q_norm = (q_apple * q_apple + q_banana * q_banana).sqrt();

        let ranked = ranker.rank(&terms("apple banana"), &idx.inverted, None);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].doc_id, "d1");
        let expected_d1 = (w_apple * q_apple + 1.0 * q_banana) / (d1_norm * q_norm);
        assert!((ranked[0].score - expected_d1).abs() < EPS);
        let expected_d2 = (1.0 * q_banana) / (2f64.sqrt() * q_norm);
        assert_eq!(ranked[1].doc_id, "d2");
        assert!((ranked[1].score - expected_d2).abs() < EPS);
    }

    #[test]
    fn ties_break_by_doc_id() {
        let idx = build(&[("c", "fox"), ("a", "fox"), ("b", "fox"), ("z", "hen")]);
        let ranker = Ranker::new(&idx.inverted, &idx.documents, WeightingScheme::default(), 10);
        let ranked = ranker.rank(&terms("fox"), &idx.inverted, None);
        let ids: Vec<_> = ranked.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(ranked.iter().all(|r| (r.score - 1.0).abs() < EPS));
    }

    #[test]
    fn truncates_to_top_k() {
        let docs: Vec<(String, String)> = (0..25).map(|i| (format!("doc{i:02}"), format!("term filler{i}"))).collect();
        let mut all = docs.clone();
        all.push(("other".into(), "unrelated".into()));
        let idx = IndexBuilder::new(Arc::new(PlainNormalizer)).build(all);
        let ranker = Ranker::new(&idx.inverted, &idx.documents, WeightingScheme::default(), DEFAULT_TOP_K);
        assert_eq!(ranker.rank(&terms("term"), &idx.inverted, None).len(), 10);
        assert_eq!(ranker.rank(&terms("term"), &idx.inverted, Some(3)).len(), 3);
        assert_eq!(ranker.rank(&terms("term"), &idx.inverted, Some(50)).len(), DEFAULT_TOP_K);
        let wide = Ranker::new(&idx.inverted, &idx.documents, WeightingScheme::default(), 40);
        assert_eq!(wide.rank(&terms("term"), &idx.inverted, None).len(), DEFAULT_TOP_K);
    }

    #[test]
    fn unknown_or_ubiquitous_terms_rank_nothing() {
        let idx = build(&[("a", "same words"), ("b", "same thing")]);
        let ranker = Ranker::new(&idx.inverted, &idx.documents, WeightingScheme::default(), 10);
        assert!(ranker.rank(&terms("missing"), &idx.inverted, None).is_empty());
        // df == N gives idf 0
        assert!(ranker.rank(&terms("same"), &idx.inverted, None).is_empty());
        assert!(ranker.rank(&[], &idx.inverted, None).is_empty());
    }

    #[test]
    fn ltc_documents_weight_by_idf() {
        let idx = build(&[("a", "rare common"), ("b", "common common"), ("c", "common")]);
        let scheme: WeightingScheme = "ltc.ltc".parse().unwrap();
        let ranker = Ranker::new(&idx.inverted, &idx.documents, scheme, 10);
        // "common" has idf 0 so "a" is represented by "rare" alone
        assert!((ranker.doc_norm("a").unwrap() - idf(3, 1)).abs() < EPS);
        let ranked = ranker.rank(&terms("rare"), &idx.inverted, None);
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].score - 1.0).abs() < EPS);
    }

    #[test]
    fn query_term_repetition_uses_log_tf() {
        let idx = build(&[("a", "red"), ("b", "blue"), ("c", "green")]);
        let ranker = Ranker::new(&idx.inverted, &idx.documents, WeightingScheme::default(), 10);
        let (weights, _) = ranker.query_weights(&terms("red red blue"), &idx.inverted);
        let expected = (1.0 + 2f64.log10()) * idf(3, 1);
        assert!((weights["red"] - expected).abs() < EPS);
        assert!((weights["blue"] - idf(3, 1)).abs() < EPS);
    }
}
