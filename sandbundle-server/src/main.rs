use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use sandbundle_rs::{initialize_engine_with, BundlerConfig, ShimRegistry};
use sandbundle_server::{
    load_shim_file, router, ServerOptions, DEFAULT_MAX_BODY_BYTES, DEFAULT_TIMEOUT_SECS,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// sandbundle-server: builds in-memory JS/JSX/TS projects into one sandboxed script
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Address to bind
    #[clap(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[clap(short, long, default_value_t = 8787)]
    pub port: u16,

    /// JSON file of additional shims: {"<specifier>": {"source": "...", "globals": ["..."]}}
    #[clap(long)]
    pub shims: Option<String>,

    /// Global the bundle attaches its exported value to
    #[clap(long)]
    pub global_name: Option<String>,

    /// Log output format
    #[clap(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Maximum request body size in bytes
    #[clap(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Args = Args::parse();
    init_logging(args.log_format)?;

    let shims = match &args.shims {
        Some(path) => load_shim_file(path)?,
        None => ShimRegistry::builtin(),
    };
    initialize_engine_with(shims)?;

    let mut config = BundlerConfig::default();
    if let Some(global_name) = args.global_name {
        config.global_name = global_name;
    }
    let options = ServerOptions {
        config,
        timeout: Duration::from_secs(args.timeout_secs),
        max_body_bytes: args.max_body_bytes,
    };

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("sandbundle-server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(&options))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Routes `log` records from the bundler into the tracing subscriber.
fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
    }
    .map_err(|err| anyhow!("Failed to install log subscriber: {}", err))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
