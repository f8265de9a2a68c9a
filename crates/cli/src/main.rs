mod cli;
mod report;

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use linkrank_compute::{self_check, ComputeEngine};
use linkrank_core::config::{load_dotenv, RankConfig};
use linkrank_core::Config;
use linkrank_ingest::{CorpusLoader, LinkExtractor};
use linkrank_storage::source_from_config;

use crate::cli::{AnalyzeArgs, CliArgs, Command, OutputFormat};
use crate::report::{render_self_check, AnalysisReport};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    }
    .context("invalid configuration")?;

    match args.command {
        Command::Analyze(analyze) => run_analyze(config, &analyze).await,
        Command::Verify => run_verify(),
    }
}

async fn run_analyze(mut config: Config, args: &AnalyzeArgs) -> Result<()> {
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;
    config.log_summary();

    let start = Instant::now();
    let source = source_from_config(&config.corpus, &config.aws).context("failed to open corpus source")?;
    let extractor = LinkExtractor::new(&config.corpus.extension)
        .with_context(|| format!("invalid document extension '{}'", config.corpus.extension))?;

    let outcome = CorpusLoader::new(source, extractor)
        .with_config(&config.loader)
        .load()
        .await
        .with_context(|| format!("failed to load corpus from {}", config.corpus.describe()))?;

    let analysis = if outcome.graph.is_empty() {
        warn!("No pages loaded. Aborting PageRank.");
        None
    } else {
        let engine = ComputeEngine::run_all(&outcome.graph, &config.rank, config.report.top_k)
            .context("analysis failed")?;
        Some(engine)
    };

    let report = AnalysisReport::new(
        config.corpus.describe(),
        config.rank,
        outcome.summary,
        analysis,
        start.elapsed().as_secs_f64(),
    );
    match args.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", report.to_json().context("failed to serialize report")?),
    }

    info!("Done in {:.2}s", report.timing.total_secs);
    Ok(())
}

fn run_verify() -> Result<()> {
    info!("Running self-check");
    let check = self_check(&RankConfig::default()).context("self-check could not run")?;
    print!("{}", render_self_check(&check));

    if !check.passed() {
        bail!("self-check failed: {}", check.failures.join("; "));
    }
    Ok(())
}
