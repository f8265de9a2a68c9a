use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LinkrankError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

/// Parse a profiled env var; a missing key yields `default`, a present key
/// that does not parse is a config error.
fn profiled_env_parse<T: FromStr>(profile: &str, key: &str, default: T) -> Result<T, LinkrankError> {
    match profiled_env_opt(profile, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| LinkrankError::Config(format!("{key}: cannot parse '{raw}'"))),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub corpus: CorpusConfig,
    pub aws: AwsConfig,
    pub loader: LoaderConfig,
    pub rank: RankConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `LINKRANK_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, LinkrankError> {
        let profile = env_or("LINKRANK_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    /// Fails on the first key that is set but does not parse.
    pub fn for_profile(profile: &str) -> Result<Self, LinkrankError> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Ok(Self {
            profile: p.to_string(),
            corpus: CorpusConfig::from_env_profiled(p)?,
            aws: AwsConfig::from_env_profiled(p),
            loader: LoaderConfig::from_env_profiled(p)?,
            rank: RankConfig::from_env_profiled(p)?,
            report: ReportConfig::from_env_profiled(p)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject parameter combinations no run can use.
    pub fn validate(&self) -> Result<(), LinkrankError> {
        self.rank.validate()?;
        if self.loader.workers == 0 {
            return Err(LinkrankError::Config("loader workers must be at least 1".into()));
        }
        if self.corpus.extension.is_empty() {
            return Err(LinkrankError::Config("document extension must not be empty".into()));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  corpus:  {}", self.corpus.describe());
        tracing::info!(
            "  loader:  workers={}, progress_interval={}",
            self.loader.workers,
            self.loader.progress_interval
        );
        tracing::info!(
            "  rank:    damping={}, tolerance={}, max_iterations={}, dangling={}",
            self.rank.damping,
            self.rank.tolerance,
            self.rank.max_iterations,
            self.rank.dangling
        );
        tracing::info!("  report:  top_k={}", self.report.top_k);
        if self.corpus.bucket.is_some() && self.corpus.provider == CorpusProvider::S3 {
            tracing::info!(
                "  aws:     region={}, credentials={}",
                self.aws.region,
                if self.aws.has_credentials() { "static" } else { "ambient" }
            );
        }
    }
}

// ── Corpus source ─────────────────────────────────────────────

/// Object-storage provider hosting a bucket corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusProvider {
    S3,
    Gcs,
}

impl fmt::Display for CorpusProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusProvider::S3 => write!(f, "s3"),
            CorpusProvider::Gcs => write!(f, "gcs"),
        }
    }
}

impl FromStr for CorpusProvider {
    type Err = LinkrankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" | "aws" => Ok(CorpusProvider::S3),
            "gcs" | "gs" | "gcp" => Ok(CorpusProvider::Gcs),
            other => Err(LinkrankError::Config(format!("unknown corpus provider: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Local directory holding the documents.
    pub data_dir: Option<PathBuf>,
    /// Bucket holding the documents; takes precedence over `data_dir` when both are set.
    pub bucket: Option<String>,
    pub prefix: String,
    pub provider: CorpusProvider,
    /// Document extension without the leading dot.
    pub extension: String,
}

impl CorpusConfig {
    fn from_env_profiled(p: &str) -> Result<Self, LinkrankError> {
        Ok(Self {
            data_dir: profiled_env_opt(p, "CORPUS_DIR").map(PathBuf::from),
            bucket: profiled_env_opt(p, "CORPUS_BUCKET"),
            prefix: profiled_env_or(p, "CORPUS_PREFIX", ""),
            provider: profiled_env_parse(p, "CORPUS_PROVIDER", CorpusProvider::S3)?,
            extension: profiled_env_or(p, "CORPUS_EXTENSION", "html")
                .trim_start_matches('.')
                .to_string(),
        })
    }

    pub fn describe(&self) -> String {
        match (&self.bucket, &self.data_dir) {
            (Some(bucket), _) => format!("{}://{}/{} (*.{})", self.provider, bucket, self.prefix, self.extension),
            (None, Some(dir)) => format!("dir {} (*.{})", dir.display(), self.extension),
            (None, None) => "(not configured)".to_string(),
        }
    }
}

// ── AWS / S3 ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            region: profiled_env_or(p, "AWS_REGION", "us-east-1"),
            access_key_id: profiled_env_opt(p, "AWS_ACCESS_KEY_ID"),
            secret_access_key: profiled_env_opt(p, "AWS_SECRET_ACCESS_KEY"),
            session_token: profiled_env_opt(p, "AWS_SESSION_TOKEN"),
            endpoint_url: profiled_env_opt(p, "AWS_ENDPOINT_URL"),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

// ── Loader ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Maximum number of documents fetched and parsed at once.
    pub workers: usize,
    /// Log a progress line every this many processed entries (0 disables).
    pub progress_interval: usize,
}

impl LoaderConfig {
    fn from_env_profiled(p: &str) -> Result<Self, LinkrankError> {
        Ok(Self {
            workers: profiled_env_parse(p, "LOADER_WORKERS", 100)?,
            progress_interval: profiled_env_parse(p, "LOADER_PROGRESS_INTERVAL", 5000)?,
        })
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            workers: 100,
            progress_interval: 5000,
        }
    }
}

// ── PageRank ──────────────────────────────────────────────────

/// How rank held by pages without outgoing links is treated each pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Dangling pages contribute nothing; total mass decays below 1.0.
    #[default]
    Leak,
    /// Dangling mass is spread uniformly over every page; total mass stays at 1.0.
    Redistribute,
}

impl fmt::Display for DanglingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DanglingPolicy::Leak => write!(f, "leak"),
            DanglingPolicy::Redistribute => write!(f, "redistribute"),
        }
    }
}

impl FromStr for DanglingPolicy {
    type Err = LinkrankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leak" => Ok(DanglingPolicy::Leak),
            "redistribute" => Ok(DanglingPolicy::Redistribute),
            other => Err(LinkrankError::Config(format!("unknown dangling policy: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankConfig {
    pub damping: f64,
    /// Relative L1 change below which iteration stops.
    pub tolerance: f64,
    pub max_iterations: usize,
    pub dangling: DanglingPolicy,
}

impl RankConfig {
    fn from_env_profiled(p: &str) -> Result<Self, LinkrankError> {
        let defaults = Self::default();
        Ok(Self {
            damping: profiled_env_parse(p, "PAGERANK_DAMPING", defaults.damping)?,
            tolerance: profiled_env_parse(p, "PAGERANK_TOLERANCE", defaults.tolerance)?,
            max_iterations: profiled_env_parse(p, "PAGERANK_MAX_ITERATIONS", defaults.max_iterations)?,
            dangling: profiled_env_parse(p, "PAGERANK_DANGLING", defaults.dangling)?,
        })
    }

    pub fn validate(&self) -> Result<(), LinkrankError> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(LinkrankError::Config(format!(
                "damping must lie strictly between 0 and 1, got {}",
                self.damping
            )));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(LinkrankError::Config(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(LinkrankError::Config("max_iterations must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 0.005,
            max_iterations: 100,
            dangling: DanglingPolicy::Leak,
        }
    }
}

// ── Report ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub top_k: usize,
}

impl ReportConfig {
    fn from_env_profiled(p: &str) -> Result<Self, LinkrankError> {
        Ok(Self {
            top_k: profiled_env_parse(p, "REPORT_TOP_K", 5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_defaults_validate() {
        let rank = RankConfig::default();
        assert_eq!(rank.damping, 0.85);
        assert_eq!(rank.tolerance, 0.005);
        assert_eq!(rank.max_iterations, 100);
        assert_eq!(rank.dangling, DanglingPolicy::Leak);
        assert!(rank.validate().is_ok());
    }

    #[test]
    fn rank_rejects_bad_parameters() {
        let bad_damping = RankConfig { damping: 1.0, ..RankConfig::default() };
        assert!(bad_damping.validate().is_err());

        let bad_tol = RankConfig { tolerance: 0.0, ..RankConfig::default() };
        assert!(bad_tol.validate().is_err());

        let bad_cap = RankConfig { max_iterations: 0, ..RankConfig::default() };
        assert!(bad_cap.validate().is_err());
    }

    #[test]
    fn dangling_policy_parses() {
        assert_eq!("leak".parse::<DanglingPolicy>().unwrap(), DanglingPolicy::Leak);
        assert_eq!(
            " Redistribute ".parse::<DanglingPolicy>().unwrap(),
            DanglingPolicy::Redistribute
        );
        assert!("spread".parse::<DanglingPolicy>().is_err());
    }

    #[test]
    fn provider_parses_aliases() {
        assert_eq!("aws".parse::<CorpusProvider>().unwrap(), CorpusProvider::S3);
        assert_eq!("gs".parse::<CorpusProvider>().unwrap(), CorpusProvider::Gcs);
        assert!("azure".parse::<CorpusProvider>().is_err());
    }

    #[test]
    fn profiled_values_override_plain_keys() {
        env::set_var("LRCFGA_PAGERANK_DAMPING", "0.9");
        env::set_var("LRCFGA_LOADER_WORKERS", "8");
        env::set_var("LRCFGA_PAGERANK_DANGLING", "redistribute");

        let config = Config::for_profile("lrcfga").unwrap();
        assert_eq!(config.profile, "LRCFGA");
        assert_eq!(config.rank.damping, 0.9);
        assert_eq!(config.loader.workers, 8);
        assert_eq!(config.rank.dangling, DanglingPolicy::Redistribute);
    }

    #[test]
    fn unparsable_values_are_rejected() {
        for (key, value) in [
            ("LRCFGB_PAGERANK_DAMPING", "0,9"),
            ("LRCFGC_PAGERANK_DANGLING", "redistribut"),
            ("LRCFGD_LOADER_WORKERS", "-4"),
            ("LRCFGE_CORPUS_PROVIDER", "azure"),
        ] {
            env::set_var(key, value);
            let profile = &key[..6];
            let err = Config::for_profile(profile).unwrap_err();
            let message = err.to_string();
            assert!(message.contains(&key[7..]), "{message}");
            assert!(message.contains(value), "{message}");
        }
    }

    #[test]
    fn corpus_describe_prefers_bucket() {
        let corpus = CorpusConfig {
            data_dir: Some(PathBuf::from("data")),
            bucket: Some("pages".into()),
            prefix: "crawl".into(),
            provider: CorpusProvider::Gcs,
            extension: "html".into(),
        };
        assert_eq!(corpus.describe(), "gcs://pages/crawl (*.html)");
    }
}
