use linkrank_core::config::RankConfig;
use linkrank_graph::GraphStore;
use tracing::info;

use crate::algorithms::pagerank::{run_pagerank, ScoreVector};
use crate::error::ComputeError;

/// Allowed drift of total mass on the reference graph, which has no dangling pages.
const MASS_SLACK: f64 = 0.01;

/// Result of ranking the reference graph `A -> {B, C}, B -> {C}, C -> {A}`.
#[derive(Debug, Clone)]
pub struct SelfCheck {
    pub scores: ScoreVector,
    pub total_mass: f64,
    pub failures: Vec<String>,
}

impl SelfCheck {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rank the reference graph and check mass conservation and the expected
/// order `C > A > B`.
pub fn self_check(config: &RankConfig) -> Result<SelfCheck, ComputeError> {
    let graph = GraphStore::from_adjacency([("A", vec!["B", "C"]), ("B", vec!["C"]), ("C", vec!["A"])]);
    info!("Self-check graph: A->[B,C], B->[C], C->[A]");

    let outcome = run_pagerank(&graph, config)?;
    let scores = outcome.scores;
    let total_mass: f64 = scores.values().sum();
    let score = |page: &str| scores.get(page).copied().unwrap_or(0.0);

    let mut failures = Vec::new();
    if (total_mass - 1.0).abs() >= MASS_SLACK {
        failures.push(format!("total probability mass lost: sum is {total_mass:.6}"));
    }
    if score("C") <= score("A") {
        failures.push("C should rank above A (it receives links from both A and B)".to_string());
    }
    if score("A") <= score("B") {
        failures.push("A should rank above B (B receives only half of A)".to_string());
    }

    Ok(SelfCheck {
        scores,
        total_mass,
        failures,
    })
}
