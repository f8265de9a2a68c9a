use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use linkrank_core::config::{CorpusProvider, DanglingPolicy};
use linkrank_core::Config;

/// Web-graph PageRank over a corpus of linked HTML documents.
///
/// Settings come from the environment (and `.env`); flags override them
/// for a single run.
#[derive(Parser, Debug)]
#[command(name = "linkrank", version, about = "Web-graph degree statistics and PageRank")]
pub struct CliArgs {
    /// Config profile; keys are read as {PROFILE}_{KEY} before {KEY}
    #[arg(long, env = "LINKRANK_PROFILE", global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a corpus, report degree statistics and rank pages
    Analyze(AnalyzeArgs),
    /// Rank a fixed three-page graph and check the expected order
    Verify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Local directory holding the documents
    #[arg(long, conflicts_with = "bucket")]
    pub dir: Option<PathBuf>,

    /// Object-storage bucket holding the documents
    #[arg(long)]
    pub bucket: Option<String>,

    /// Key prefix inside the bucket
    #[arg(long, requires = "bucket")]
    pub prefix: Option<String>,

    /// Object-storage provider: s3 or gcs
    #[arg(long, requires = "bucket")]
    pub provider: Option<CorpusProvider>,

    /// Document extension, without the dot
    #[arg(long)]
    pub extension: Option<String>,

    /// Documents fetched and parsed concurrently
    #[arg(long)]
    pub workers: Option<usize>,

    /// Damping factor, strictly between 0 and 1
    #[arg(long)]
    pub damping: Option<f64>,

    /// Relative change below which PageRank stops
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Hard cap on PageRank passes
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Treatment of pages without outgoing links: leak or redistribute
    #[arg(long)]
    pub dangling: Option<DanglingPolicy>,

    /// Number of top-ranked pages to report
    #[arg(long)]
    pub top_k: Option<usize>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl AnalyzeArgs {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.dir {
            config.corpus.data_dir = Some(dir.clone());
            config.corpus.bucket = None;
        }
        if let Some(bucket) = &self.bucket {
            config.corpus.bucket = Some(bucket.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.corpus.prefix = prefix.clone();
        }
        if let Some(provider) = self.provider {
            config.corpus.provider = provider;
        }
        if let Some(extension) = &self.extension {
            config.corpus.extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(workers) = self.workers {
            config.loader.workers = workers;
        }
        if let Some(damping) = self.damping {
            config.rank.damping = damping;
        }
        if let Some(tolerance) = self.tolerance {
            config.rank.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.rank.max_iterations = max_iterations;
        }
        if let Some(dangling) = self.dangling {
            config.rank.dangling = dangling;
        }
        if let Some(top_k) = self.top_k {
            config.report.top_k = top_k;
        }
    }
}
