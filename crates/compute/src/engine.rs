use std::time::Instant;

use linkrank_core::config::RankConfig;
use linkrank_graph::{GraphStats, GraphStore};
use serde::Serialize;
use tracing::info;

use crate::algorithms::degree::{compute_stats, DegreeStats};
use crate::algorithms::pagerank::{run_pagerank_observed, IterationStats, PageRankOutcome, TraceRecorder};
use crate::algorithms::ranking::{top_k, RankedPage};
use crate::error::ComputeError;

/// Every analysis over one loaded graph, computed once.
#[derive(Debug, Clone, Serialize)]
pub struct ComputeEngine {
    pub graph: GraphStats,
    pub degrees: Option<DegreeStats>,
    pub pagerank: PageRankOutcome,
    pub trace: Vec<IterationStats>,
    pub top_pages: Vec<RankedPage>,
    pub stats_secs: f64,
    pub pagerank_secs: f64,
}

impl ComputeEngine {
    /// Run degree statistics, PageRank and top-K ranking against `graph`.
    pub fn run_all(graph: &GraphStore, rank: &RankConfig, k: usize) -> Result<Self, ComputeError> {
        if graph.is_empty() {
            return Err(ComputeError::EmptyGraph);
        }
        let start = Instant::now();

        info!("Computing degree statistics...");
        let stats_start = Instant::now();
        let degrees = compute_stats(graph);
        let stats_secs = stats_start.elapsed().as_secs_f64();

        info!("Running PageRank...");
        let pr_start = Instant::now();
        let mut recorder = TraceRecorder::default();
        let pagerank = run_pagerank_observed(graph, rank, &mut recorder)?;
        let pagerank_secs = pr_start.elapsed().as_secs_f64();
        info!("  PageRank done in {:.1}s", pagerank_secs);

        let top_pages = top_k(&pagerank.scores, k);
        info!("Compute complete in {:.1}s", start.elapsed().as_secs_f64());

        Ok(Self {
            graph: graph.stats(),
            degrees,
            pagerank,
            trace: recorder.iterations,
            top_pages,
            stats_secs,
            pagerank_secs,
        })
    }
}
