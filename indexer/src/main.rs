use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use seeker_core::corpus::{load_corpus, CorpusOptions};
use seeker_core::{
    EngineConfig, IndexStats, NormalizerKind, Query, QueryResult, SearchEngine, SearchError, WeightingScheme,
};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build positional, biword and phonetic indexes over a text corpus and query them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Corpus directory
    #[arg(long)]
    corpus: PathBuf,
    /// Descend into subdirectories
    #[arg(long, default_value_t = false)]
    recursive: bool,
    /// File extensions to index
    #[arg(long = "ext", default_values_t = vec!["txt".to_string()])]
    extensions: Vec<String>,
    /// Engine configuration file (JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Text normalizer: english or plain
    #[arg(long, env = "SEEKER_NORMALIZER")]
    normalizer: Option<NormalizerKind>,
    /// Weighting scheme in SMART notation, e.g. lnc.ltc
    #[arg(long, env = "SEEKER_SCHEME")]
    scheme: Option<WeightingScheme>,
    /// Scan documents in parallel while building
    #[arg(long, env = "SEEKER_PARALLEL", default_value_t = false)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the indexes and print a JSON report
    Build {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Write the report here instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Build the indexes and run one query
    Query {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// boolean, biword, proximity, phonetic or ranked
        #[arg(long, default_value = "boolean")]
        mode: String,
        /// Maximum number of words between the two proximity terms
        #[arg(long)]
        window: Option<usize>,
        /// Number of ranked results
        #[arg(long, env = "SEEKER_TOP_K")]
        top_k: Option<usize>,
        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        query: String,
    },
}

#[derive(Serialize)]
struct BuildReport {
    corpus: String,
    created_at: String,
    normalizer: String,
    scheme: String,
    #[serde(flatten)]
    stats: IndexStats,
    skipped: Vec<String>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { corpus, report } => build_report(&corpus, report),
        Commands::Query { corpus, mode, window, top_k, json, query } => {
            run_query(&corpus, &mode, &query, window, top_k, json)
        }
    }
}

fn engine_config(args: &CorpusArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(normalizer) = args.normalizer {
        config = config.with_normalizer(normalizer);
    }
    if let Some(scheme) = args.scheme {
        config = config.with_scheme(scheme);
    }
    if args.parallel {
        config = config.with_parallel_build(true);
    }
    Ok(config)
}

fn load_engine(args: &CorpusArgs) -> Result<(SearchEngine, IndexStats, Vec<String>)> {
    let config = engine_config(args)?;
    let options = CorpusOptions { extensions: args.extensions.clone(), recursive: args.recursive };
    let corpus = load_corpus(&args.corpus, &options)?;
    let skipped = corpus.skipped.iter().map(|(path, _)| path.display().to_string()).collect();
    let engine = SearchEngine::new(config);
    let stats = engine.build(corpus.documents);
    Ok((engine, stats, skipped))
}

fn build_report(args: &CorpusArgs, report: Option<PathBuf>) -> Result<()> {
    let (engine, stats, skipped) = load_engine(args)?;
    let report_doc = BuildReport {
        corpus: args.corpus.display().to_string(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        normalizer: engine.config().normalizer.to_string(),
        scheme: engine.config().scheme.to_string(),
        stats,
        skipped,
    };
    let json = serde_json::to_string_pretty(&report_doc)?;
    match report {
        Some(path) => {
            fs::write(&path, json)?;
            tracing::info!(path = %path.display(), "wrote build report");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_query(args: &CorpusArgs, mode: &str, text: &str, window: Option<usize>, top_k: Option<usize>, json: bool) -> Result<()> {
    let query = Query::from_mode(mode, text, window, top_k)?;
    let (engine, stats, _) = load_engine(args)?;
    tracing::info!(?stats, "index built");

    let result = match engine.execute(&query) {
        Ok(result) => Some(result),
        Err(e @ SearchError::Usage(_)) => {
            eprintln!("Error: {e}");
            None
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    match result {
        Some(result) if !result.is_empty() => print_result(&result),
        _ => println!("No documents match the query."),
    }
    Ok(())
}

fn print_result(result: &QueryResult) {
    match result {
        QueryResult::Documents(docs) => {
            let ids: Vec<&str> = docs.iter().map(String::as_str).collect();
            println!("Documents matching the query: {}", ids.join(", "));
        }
        QueryResult::Proximity(hits) => {
            for (doc, distances) in hits {
                println!("Document: {doc}, Words between: {distances:?}");
            }
        }
        QueryResult::Phonetic(m) => {
            for (token, terms) in &m.expansions {
                let terms: Vec<&str> = terms.iter().map(String::as_str).collect();
                println!("{token} ~ {}", terms.join(", "));
            }
            let ids: Vec<&str> = m.documents.iter().map(String::as_str).collect();
            println!("Documents matching the query: {}", ids.join(", "));
        }
        QueryResult::Ranked(ranked) => {
            for (rank, hit) in ranked.iter().enumerate() {
                println!("{}. ('{}', {:.6})", rank + 1, hit.doc_id, hit.score);
            }
        }
    }
}
