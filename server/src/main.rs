use anyhow::Result;
use clap::Parser;
use seeker_core::corpus::CorpusOptions;
use seeker_core::{EngineConfig, NormalizerKind, SearchEngine, WeightingScheme};
use server::{build_app, resolve_config, spawn_index_build, ConfigOverrides};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus directory
    #[arg(long, default_value = "./corpus")]
    corpus: PathBuf,
    /// Descend into subdirectories
    #[arg(long, default_value_t = false)]
    recursive: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Engine configuration file (JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, env = "SEEKER_NORMALIZER")]
    normalizer: Option<NormalizerKind>,
    #[arg(long, env = "SEEKER_SCHEME")]
    scheme: Option<WeightingScheme>,
    #[arg(long, env = "SEEKER_TOP_K")]
    top_k: Option<usize>,
    #[arg(long, env = "SEEKER_PARALLEL", default_value_t = false)]
    parallel: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let base = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let overrides = ConfigOverrides {
        normalizer: args.normalizer,
        scheme: args.scheme,
        top_k: args.top_k,
        parallel: args.parallel,
    };
    let config = resolve_config(base, &overrides)?;

    let engine = Arc::new(SearchEngine::new(config));
    let options = CorpusOptions { recursive: args.recursive, ..CorpusOptions::default() };
    spawn_index_build(engine.clone(), args.corpus.clone(), options);

    let app = build_app(engine);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
