use crate::error::{Result, SearchError};
use crate::rank::{WeightingScheme, DEFAULT_TOP_K};
use crate::tokenizer::NormalizerKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub normalizer: NormalizerKind,
    /// SMART notation, e.g. `lnc.ltc`
    pub scheme: WeightingScheme,
    pub top_k: usize,
    /// Scan documents on the rayon pool while building.
    pub parallel_build: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerKind::default(),
            scheme: WeightingScheme::default(),
            top_k: DEFAULT_TOP_K,
            parallel_build: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self { Self::default() }

    pub fn with_normalizer(mut self, normalizer: NormalizerKind) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_scheme(mut self, scheme: WeightingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_parallel_build(mut self, parallel: bool) -> Self {
        self.parallel_build = parallel;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json).map_err(|e| SearchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 || self.top_k > DEFAULT_TOP_K {
            return Err(SearchError::Config(format!("top_k must be between 1 and {DEFAULT_TOP_K}")));
        }
        Ok(())
    }
}
