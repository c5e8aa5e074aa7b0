pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod query;
pub mod rank;
pub mod soundex;
pub mod tokenizer;

pub use config::EngineConfig;
pub use engine::{Query, QueryMode, QueryResult, SearchEngine, Snapshot};
pub use error::{Result, SearchError};
pub use index::{DocId, DocumentCollection, IndexBuilder, IndexStats, Indexes, Term};
pub use rank::{ScoredDoc, WeightingScheme};
pub use tokenizer::{EnglishNormalizer, Normalizer, NormalizerKind, PlainNormalizer};
