use std::collections::HashMap;

use indexmap::IndexMap;
use linkrank_core::config::{DanglingPolicy, RankConfig};
use linkrank_core::PageId;
use linkrank_graph::GraphStore;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ComputeError;

/// PageRank score per page, in page-universe order.
pub type ScoreVector = IndexMap<PageId, f64>;

/// Diagnostics for one completed pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationStats {
    pub iteration: usize,
    /// Sum of the new scores.
    pub total_mass: f64,
    /// L1 distance between the new and previous score vectors.
    pub delta: f64,
    /// `100 * delta / total_mass`, with a zero mass treated as 1.
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Converged,
    IterationCap,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageRankOutcome {
    pub scores: ScoreVector,
    pub iterations: usize,
    pub termination: Termination,
    pub final_mass: f64,
}

impl PageRankOutcome {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Receives per-pass diagnostics while PageRank runs.
pub trait IterationObserver {
    fn on_iteration(&mut self, stats: &IterationStats);
}

impl<F: FnMut(&IterationStats)> IterationObserver for F {
    fn on_iteration(&mut self, stats: &IterationStats) {
        self(stats)
    }
}

/// Keeps every pass for later reporting.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    pub iterations: Vec<IterationStats>,
}

impl IterationObserver for TraceRecorder {
    fn on_iteration(&mut self, stats: &IterationStats) {
        debug!(
            iteration = stats.iteration,
            total_mass = stats.total_mass,
            delta = stats.delta,
            change_percent = stats.change_percent,
            "PageRank pass"
        );
        self.iterations.push(*stats);
    }
}

/// Run PageRank to convergence, logging each pass at debug level.
pub fn run_pagerank(graph: &GraphStore, config: &RankConfig) -> Result<PageRankOutcome, ComputeError> {
    let mut recorder = TraceRecorder::default();
    run_pagerank_observed(graph, config, &mut recorder)
}

/// Run PageRank, reporting every pass to `observer`.
///
/// Each pass computes, for every page `p`:
///
/// ```text
/// new[p] = (1 - d) / N + d * Σ_{s links to p} score[s] / out_degree[s]
/// ```
///
/// from the previous vector only. Pages with no outgoing links pass nothing
/// on under [`DanglingPolicy::Leak`], so total mass decays whenever they
/// hold rank; [`DanglingPolicy::Redistribute`] spreads their mass evenly
/// instead. Iteration stops once the relative L1 change drops below
/// `100 * tolerance` percent, or after `max_iterations` passes.
pub fn run_pagerank_observed(
    graph: &GraphStore,
    config: &RankConfig,
    observer: &mut dyn IterationObserver,
) -> Result<PageRankOutcome, ComputeError> {
    config
        .validate()
        .map_err(|e| ComputeError::InvalidConfig(e.to_string()))?;

    let n = graph.page_count();
    if n == 0 {
        return Err(ComputeError::EmptyGraph);
    }
    info!("Starting PageRank (N={})", n);

    let pages: Vec<&PageId> = graph.pages().collect();
    let index: HashMap<&str, usize> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| (page.as_str(), i))
        .collect();
    let out_degree: Vec<usize> = graph.out_degrees().map(|(_, d)| d).collect();

    // Reverse links as dense indices; every source is part of the universe.
    let incoming: Vec<Vec<usize>> = pages
        .iter()
        .map(|page| {
            graph
                .links_to(page.as_str())
                .iter()
                .filter_map(|source| index.get(source.as_str()).copied())
                .collect()
        })
        .collect();
    let dangling: Vec<usize> = (0..n).filter(|&i| out_degree[i] == 0).collect();

    let damping = config.damping;
    let n_f = n as f64;
    let base = (1.0 - damping) / n_f;
    let threshold = 100.0 * config.tolerance;

    let mut scores = vec![1.0 / n_f; n];
    let mut iteration = 0;

    let termination = loop {
        iteration += 1;

        let dangling_share = match config.dangling {
            DanglingPolicy::Leak => 0.0,
            DanglingPolicy::Redistribute => {
                damping * dangling.iter().map(|&i| scores[i]).sum::<f64>() / n_f
            }
        };

        let next: Vec<f64> = incoming
            .par_iter()
            .map(|sources| {
                let inflow: f64 = sources
                    .iter()
                    .filter(|&&s| out_degree[s] > 0)
                    .map(|&s| scores[s] / out_degree[s] as f64)
                    .sum();
                base + damping * inflow + dangling_share
            })
            .collect();

        let delta: f64 = next.iter().zip(&scores).map(|(new, old)| (new - old).abs()).sum();
        let total_mass: f64 = next.iter().sum();
        let denominator = if total_mass == 0.0 { 1.0 } else { total_mass };
        let change_percent = 100.0 * delta / denominator;

        observer.on_iteration(&IterationStats {
            iteration,
            total_mass,
            delta,
            change_percent,
        });

        scores = next;

        if change_percent < threshold {
            break Termination::Converged;
        }
        if iteration >= config.max_iterations {
            break Termination::IterationCap;
        }
    };

    let final_mass: f64 = scores.iter().sum();
    match termination {
        Termination::Converged => info!(
            "PageRank converged after {} iterations (total mass {:.4})",
            iteration, final_mass
        ),
        Termination::IterationCap => info!(
            "PageRank stopped at the {} iteration cap without converging (total mass {:.4})",
            iteration, final_mass
        ),
    }

    let scores: ScoreVector = pages.into_iter().cloned().zip(scores).collect();
    Ok(PageRankOutcome {
        scores,
        iterations: iteration,
        termination,
        final_mass,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> GraphStore {
        // A -> B, C ; B -> C ; C -> A
        GraphStore::from_adjacency([("A", vec!["B", "C"]), ("B", vec!["C"]), ("C", vec!["A"])])
    }

    /// Three pages feeding one page with no outgoing links.
    fn star_into_dangling() -> GraphStore {
        GraphStore::from_adjacency([("A", vec!["D"]), ("B", vec!["D"]), ("C", vec!["D"])])
    }

    /// Ten-page ring with one chord; converges slowly under high damping.
    fn slow_ring() -> GraphStore {
        let mut adjacency: Vec<(String, Vec<String>)> = (0..10)
            .map(|i| (i.to_string(), vec![((i + 1) % 10).to_string()]))
            .collect();
        adjacency[0].1.push("5".to_string());
        GraphStore::from_adjacency(adjacency)
    }

    #[test]
    fn triangle_ranks_c_over_a_over_b() {
        let outcome = run_pagerank(&triangle(), &RankConfig::default()).unwrap();
        let pr = &outcome.scores;

        assert_eq!(pr.len(), 3);
        assert!(pr["C"] > pr["A"], "C should outrank A: {pr:?}");
        assert!(pr["A"] > pr["B"], "A should outrank B: {pr:?}");
        assert!(outcome.converged());

        let total: f64 = pr.values().sum();
        assert!((total - 1.0).abs() < RankConfig::default().tolerance, "mass drifted: {total}");
    }

    #[test]
    fn dangling_page_leaks_mass() {
        let mut trace = TraceRecorder::default();
        let outcome =
            run_pagerank_observed(&star_into_dangling(), &RankConfig::default(), &mut trace).unwrap();

        let first = trace.iterations[0];
        assert!((first.total_mass - 0.7875).abs() < 1e-12);
        for pair in trace.iterations.windows(2) {
            if pair[1].delta > 0.0 {
                assert!(
                    pair[1].total_mass < pair[0].total_mass,
                    "mass should shrink while D holds rank: {:?}",
                    trace.iterations
                );
            }
        }
        assert!(outcome.final_mass < 0.25);
        assert!(outcome.scores["D"] > outcome.scores["A"]);
    }

    #[test]
    fn redistribution_conserves_mass() {
        let config = RankConfig {
            dangling: DanglingPolicy::Redistribute,
            ..RankConfig::default()
        };
        let mut masses = Vec::new();
        let outcome = run_pagerank_observed(&star_into_dangling(), &config, &mut |s: &IterationStats| {
            masses.push(s.total_mass)
        })
        .unwrap();

        assert!(masses.iter().all(|m| (m - 1.0).abs() < 1e-9), "{masses:?}");
        assert!(outcome.scores["D"] > outcome.scores["A"]);
    }

    #[test]
    fn empty_graph_fails_fast() {
        let err = run_pagerank(&GraphStore::new(), &RankConfig::default()).unwrap_err();
        assert!(matches!(err, ComputeError::EmptyGraph));
    }

    #[test]
    fn invalid_damping_is_rejected() {
        let config = RankConfig {
            damping: 1.5,
            ..RankConfig::default()
        };
        let err = run_pagerank(&triangle(), &config).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig(_)));
    }

    #[test]
    fn stops_at_iteration_cap() {
        let config = RankConfig {
            damping: 0.99,
            tolerance: 1e-6,
            ..RankConfig::default()
        };
        let mut trace = TraceRecorder::default();
        let outcome = run_pagerank_observed(&slow_ring(), &config, &mut trace).unwrap();

        assert_eq!(outcome.iterations, 100);
        assert_eq!(outcome.termination, Termination::IterationCap);
        assert_eq!(trace.iterations.len(), 100);
        assert!(trace.iterations.last().unwrap().change_percent >= 100.0 * config.tolerance);
    }

    #[test]
    fn configurable_cap() {
        let config = RankConfig {
            tolerance: 1e-9,
            max_iterations: 3,
            ..RankConfig::default()
        };
        let outcome = run_pagerank(&triangle(), &config).unwrap();
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.termination, Termination::IterationCap);
    }

    #[test]
    fn single_isolated_page() {
        let g = GraphStore::from_adjacency([("X", Vec::<&str>::new())]);
        let outcome = run_pagerank(&g, &RankConfig::default()).unwrap();

        assert!(outcome.converged());
        assert_eq!(outcome.iterations, 2);
        assert!((outcome.scores["X"] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn first_pass_uses_only_previous_scores() {
        let config = RankConfig {
            max_iterations: 1,
            ..RankConfig::default()
        };
        let outcome = run_pagerank(&triangle(), &config).unwrap();
        let pr = &outcome.scores;

        let third = 1.0 / 3.0;
        assert!((pr["A"] - (0.05 + 0.85 * third)).abs() < 1e-12);
        assert!((pr["B"] - (0.05 + 0.85 * third / 2.0)).abs() < 1e-12);
        assert!((pr["C"] - (0.05 + 0.85 * (third / 2.0 + third))).abs() < 1e-12);
    }
}
