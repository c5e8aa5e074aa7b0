use crate::config::EngineConfig;
use crate::error::{Result, SearchError};
use crate::index::{DocId, IndexBuilder, IndexStats, Indexes};
use crate::query::{
    evaluate_biword, evaluate_boolean, evaluate_phonetic, evaluate_proximity, DocSet, PhoneticMatch, ProximityHits,
};
use crate::rank::{Ranker, ScoredDoc};
use crate::tokenizer::Normalizer;
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Boolean,
    Biword,
    Proximity,
    Phonetic,
    Ranked,
}

impl FromStr for QueryMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(QueryMode::Boolean),
            "biword" | "phrase" => Ok(QueryMode::Biword),
            "proximity" | "near" => Ok(QueryMode::Proximity),
            "phonetic" | "soundex" => Ok(QueryMode::Phonetic),
            "ranked" | "rank" | "vsm" => Ok(QueryMode::Ranked),
            other => Err(SearchError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryMode::Boolean => "boolean",
            QueryMode::Biword => "biword",
            QueryMode::Proximity => "proximity",
            QueryMode::Phonetic => "phonetic",
            QueryMode::Ranked => "ranked",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Boolean(String),
    Biword(String),
    Proximity { text: String, window: usize },
    Phonetic(String),
    Ranked { text: String, top_k: Option<usize> },
}

impl Query {
    /// Build a query from a mode name and its parameters.
    pub fn from_mode(mode: &str, text: &str, window: Option<usize>, top_k: Option<usize>) -> Result<Query> {
        let text = text.to_string();
        Ok(match mode.parse::<QueryMode>()? {
            QueryMode::Boolean => Query::Boolean(text),
            QueryMode::Biword => Query::Biword(text),
            QueryMode::Proximity => {
                let window = window.ok_or_else(|| SearchError::usage("proximity query needs a window size"))?;
                Query::Proximity { text, window }
            }
            QueryMode::Phonetic => Query::Phonetic(text),
            QueryMode::Ranked => Query::Ranked { text, top_k },
        })
    }

    pub fn mode(&self) -> QueryMode {
        match self {
            Query::Boolean(_) => QueryMode::Boolean,
            Query::Biword(_) => QueryMode::Biword,
            Query::Proximity { .. } => QueryMode::Proximity,
            Query::Phonetic(_) => QueryMode::Phonetic,
            Query::Ranked { .. } => QueryMode::Ranked,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Query::Boolean(t) | Query::Biword(t) | Query::Phonetic(t) => t,
            Query::Proximity { text, .. } | Query::Ranked { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "hits", rename_all = "snake_case")]
pub enum QueryResult {
    Documents(DocSet),
    Proximity(ProximityHits),
    Phonetic(PhoneticMatch),
    Ranked(Vec<ScoredDoc>),
}

impl QueryResult {
    /// Matching documents, in rank order for ranked results and id order otherwise.
    pub fn doc_ids(&self) -> Vec<&DocId> {
        match self {
            QueryResult::Documents(docs) => docs.iter().collect(),
            QueryResult::Proximity(hits) => hits.keys().collect(),
            QueryResult::Phonetic(m) => m.documents.iter().collect(),
            QueryResult::Ranked(ranked) => ranked.iter().map(|r| &r.doc_id).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryResult::Documents(docs) => docs.len(),
            QueryResult::Proximity(hits) => hits.len(),
            QueryResult::Phonetic(m) => m.documents.len(),
            QueryResult::Ranked(ranked) => ranked.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Immutable indexes plus the ranker derived from them.
pub struct Snapshot {
    indexes: Indexes,
    ranker: Ranker,
}

impl Snapshot {
    pub fn new(indexes: Indexes, config: &EngineConfig) -> Self {
        let ranker = Ranker::new(&indexes.inverted, &indexes.documents, config.scheme, config.top_k);
        Self { indexes, ranker }
    }

    pub fn indexes(&self) -> &Indexes { &self.indexes }

    pub fn ranker(&self) -> &Ranker { &self.ranker }

    pub fn stats(&self) -> IndexStats { self.indexes.stats() }

    pub fn execute(&self, normalizer: &dyn Normalizer, query: &Query) -> Result<QueryResult> {
        let idx = &self.indexes;
        Ok(match query {
            Query::Boolean(text) => {
                QueryResult::Documents(evaluate_boolean(text, normalizer, &idx.inverted, &idx.documents))
            }
            Query::Biword(text) => QueryResult::Documents(evaluate_biword(text, normalizer, &idx.biwords)?),
            Query::Proximity { text, window } => {
                QueryResult::Proximity(evaluate_proximity(text, normalizer, &idx.inverted, *window)?)
            }
            Query::Phonetic(text) => {
                QueryResult::Phonetic(evaluate_phonetic(text, normalizer, &idx.phonetic, &idx.inverted))
            }
            Query::Ranked { text, top_k } => {
                let terms = normalizer.normalize(text);
                QueryResult::Ranked(self.ranker.rank(&terms, &idx.inverted, *top_k))
            }
        })
    }
}

/// Owns the current snapshot. Queries before the first [`SearchEngine::build`] fail with
/// [`SearchError::NotReady`]; a rebuild swaps in a whole new snapshot.
pub struct SearchEngine {
    config: EngineConfig,
    normalizer: Arc<dyn Normalizer>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        let normalizer = config.normalizer.build();
        Self::with_normalizer(config, normalizer)
    }

    pub fn with_normalizer(config: EngineConfig, normalizer: Arc<dyn Normalizer>) -> Self {
        Self { config, normalizer, snapshot: RwLock::new(None) }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn normalizer(&self) -> &dyn Normalizer { self.normalizer.as_ref() }

    pub fn build(&self, documents: Vec<(DocId, String)>) -> IndexStats {
        let start = Instant::now();
        let builder = IndexBuilder::new(self.normalizer.clone());
        let indexes = if self.config.parallel_build {
            builder.build_parallel(&documents)
        } else {
            builder.build(documents)
        };
        let snapshot = Arc::new(Snapshot::new(indexes, &self.config));
        let stats = snapshot.stats();
        *self.snapshot.write() = Some(snapshot);
        tracing::info!(?stats, scheme = %self.config.scheme, took_ms = start.elapsed().as_millis() as u64, "index ready");
        stats
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.read().is_some()
    }

    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.snapshot.read().clone().ok_or(SearchError::NotReady)
    }

    pub fn stats(&self) -> Result<IndexStats> {
        Ok(self.snapshot()?.stats())
    }

    pub fn execute(&self, query: &Query) -> Result<QueryResult> {
        let snapshot = self.snapshot()?;
        let start = Instant::now();
        let result = snapshot.execute(self.normalizer.as_ref(), query);
        match &result {
            Ok(r) => tracing::debug!(mode = %query.mode(), query = query.text(), hits = r.len(), took_us = start.elapsed().as_micros() as u64, "query evaluated"),
            Err(e) => tracing::debug!(mode = %query.mode(), query = query.text(), error = %e, "query rejected"),
        }
        result
    }

    pub fn boolean(&self, text: &str) -> Result<DocSet> {
        let snap = self.snapshot()?;
        let idx = snap.indexes();
        Ok(evaluate_boolean(text, self.normalizer(), &idx.inverted, &idx.documents))
    }

    pub fn biword(&self, text: &str) -> Result<DocSet> {
        evaluate_biword(text, self.normalizer(), &self.snapshot()?.indexes().biwords)
    }

    pub fn proximity(&self, text: &str, window: usize) -> Result<ProximityHits> {
        evaluate_proximity(text, self.normalizer(), &self.snapshot()?.indexes().inverted, window)
    }

    pub fn phonetic(&self, text: &str) -> Result<PhoneticMatch> {
        let snap = self.snapshot()?;
        let idx = snap.indexes();
        Ok(evaluate_phonetic(text, self.normalizer(), &idx.phonetic, &idx.inverted))
    }

    pub fn rank(&self, text: &str) -> Result<Vec<ScoredDoc>> {
        let snap = self.snapshot()?;
        let terms = self.normalizer.normalize(text);
        Ok(snap.ranker().rank(&terms, &snap.indexes().inverted, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::NormalizerKind;

    fn engine() -> SearchEngine {
        SearchEngine::new(EngineConfig::default().with_normalizer(NormalizerKind::Plain))
    }

    fn docs() -> Vec<(DocId, String)> {
        vec![("doc1".into(), "cat sat".into()), ("doc2".into(), "dog sat down".into())]
    }

    #[test]
    fn queries_fail_until_built() {
        let engine = engine();
        assert!(!engine.is_ready());
        assert!(matches!(engine.boolean("cat"), Err(SearchError::NotReady)));
        assert!(matches!(engine.stats(), Err(SearchError::NotReady)));

        engine.build(docs());
        assert!(engine.is_ready());
        assert_eq!(engine.boolean("cat").unwrap().len(), 1);
    }

    #[test]
    fn rebuild_replaces_the_snapshot() {
        let engine = engine();
        engine.build(docs());
        let old = engine.snapshot().unwrap();
        engine.build(vec![("only".into(), "bird".into())]);
        assert_eq!(engine.stats().unwrap().documents, 1);
        // readers holding the old snapshot keep a consistent view
        assert_eq!(old.stats().documents, 2);
    }

    #[test]
    fn parses_modes_and_aliases() {
        assert_eq!("PHRASE".parse::<QueryMode>().unwrap(), QueryMode::Biword);
        assert_eq!("soundex".parse::<QueryMode>().unwrap(), QueryMode::Phonetic);
        assert!(matches!("fuzzy".parse::<QueryMode>(), Err(SearchError::UnknownMode(_))));
    }

    #[test]
    fn proximity_mode_requires_window() {
        let err = Query::from_mode("proximity", "cat dog", None, None).unwrap_err();
        assert!(matches!(err, SearchError::Usage(_)));
        let q = Query::from_mode("proximity", "cat dog", Some(2), None).unwrap();
        assert_eq!(q, Query::Proximity { text: "cat dog".into(), window: 2 });
    }

    #[test]
    fn result_serializes_with_kind_tag() {
        let engine = engine();
        engine.build(docs());
        let result = engine.execute(&Query::Boolean("sat".into())).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "documents");
        assert_eq!(json["hits"], serde_json::json!(["doc1", "doc2"]));
    }
}
