//! Reading a directory of text files into `(DocId, text)` pairs.

use crate::error::{Result, SearchError};
use crate::index::DocId;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// Extensions (without the dot) of files to index.
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self { extensions: vec!["txt".to_string()], recursive: false }
    }
}

#[derive(Debug, Default)]
pub struct Corpus {
    /// Sorted by id.
    pub documents: Vec<(DocId, String)>,
    /// Files that matched but could not be read, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

pub fn load_corpus<P: AsRef<Path>>(root: P, options: &CorpusOptions) -> Result<Corpus> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(SearchError::Corpus(format!("{} is not a directory", root.display())));
    }

    let mut walker = WalkDir::new(root).min_depth(1);
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    let mut corpus = Corpus::default();
    for entry in walker.into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable corpus entry");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !has_extension(path, &options.extensions) {
            continue;
        }
        let Some(doc_id) = doc_id_for(root, path) else {
            continue;
        };
        match fs::read(path) {
            Ok(bytes) => corpus.documents.push((doc_id, String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable document");
                corpus.skipped.push((path.to_path_buf(), e.to_string()));
            }
        }
    }
    corpus.documents.sort_by(|a, b| a.0.cmp(&b.0));
    tracing::info!(documents = corpus.documents.len(), skipped = corpus.skipped.len(), root = %root.display(), "loaded corpus");
    Ok(corpus)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

fn doc_id_for(root: &Path, path: &Path) -> Option<DocId> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}
