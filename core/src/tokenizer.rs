use crate::error::SearchError;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Turns raw text into the ordered sequence of terms that gets indexed.
///
/// Implementations must be deterministic and must never yield empty terms.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Vec<String>;
}

/// NFKC, lowercase, stopword removal and Snowball English stemming.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishNormalizer;

/// NFKC and lowercase only; every word is kept verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainNormalizer;

impl Normalizer for EnglishNormalizer {
    fn normalize(&self, text: &str) -> Vec<String> {
        words(text)
            .into_iter()
            .filter(|w| !is_stopword(w))
            .filter_map(|w| strip_punctuation(&STEMMER.stem(&w)))
            .collect()
    }
}

impl Normalizer for PlainNormalizer {
    fn normalize(&self, text: &str) -> Vec<String> {
        words(text).into_iter().filter_map(|w| strip_punctuation(&w)).collect()
    }
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn words(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

// Apostrophes survive the word regex so that stopwords like "don't" match; they are not part of a term.
fn strip_punctuation(token: &str) -> Option<String> {
    let cleaned: String = token.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Tokenize text with the default English pipeline.
pub fn tokenize(text: &str) -> Vec<String> {
    EnglishNormalizer.normalize(text)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizerKind {
    #[default]
    English,
    Plain,
}

impl NormalizerKind {
    pub fn build(self) -> Arc<dyn Normalizer> {
        match self {
            NormalizerKind::English => Arc::new(EnglishNormalizer),
            NormalizerKind::Plain => Arc::new(PlainNormalizer),
        }
    }
}

impl FromStr for NormalizerKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" => Ok(NormalizerKind::English),
            "plain" => Ok(NormalizerKind::Plain),
            other => Err(SearchError::InvalidNormalizer(other.to_string())),
        }
    }
}

impl fmt::Display for NormalizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizerKind::English => f.write_str("english"),
            NormalizerKind::Plain => f.write_str("plain"),
        }
    }
}
