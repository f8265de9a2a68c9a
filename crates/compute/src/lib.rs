pub mod algorithms;
pub mod engine;
pub mod error;
pub mod verify;

pub use algorithms::degree::{compute_stats, DegreeReport, DegreeStats, Percentile};
pub use algorithms::pagerank::{
    run_pagerank, run_pagerank_observed, IterationObserver, IterationStats, PageRankOutcome,
    ScoreVector, Termination, TraceRecorder,
};
pub use algorithms::ranking::{top_k, RankedPage};
pub use engine::ComputeEngine;
pub use error::ComputeError;
pub use verify::{self_check, SelfCheck};

