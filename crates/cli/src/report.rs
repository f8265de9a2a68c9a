//! Human-readable and JSON rendering of one analysis run.

use std::fmt;

use chrono::{DateTime, Utc};
use linkrank_compute::{ComputeEngine, DegreeReport, SelfCheck, Termination};
use linkrank_core::config::RankConfig;
use linkrank_ingest::LoadSummary;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Timing {
    /// Listing, fetching, parsing and merging.
    pub load_secs: f64,
    pub stats_secs: f64,
    pub pagerank_secs: f64,
    pub total_secs: f64,
}

/// Everything one `analyze` run produced. `analysis` is absent when the
/// corpus yielded no pages.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub rank: RankConfig,
    pub load: LoadSummary,
    pub analysis: Option<ComputeEngine>,
    pub timing: Timing,
}

impl AnalysisReport {
    pub fn new(
        source: String,
        rank: RankConfig,
        load: LoadSummary,
        analysis: Option<ComputeEngine>,
        total_secs: f64,
    ) -> Self {
        let (stats_secs, pagerank_secs) = analysis
            .as_ref()
            .map(|a| (a.stats_secs, a.pagerank_secs))
            .unwrap_or((0.0, 0.0));
        let timing = Timing {
            load_secs: load.elapsed_secs,
            stats_secs,
            pagerank_secs,
            total_secs,
        };
        Self {
            generated_at: Utc::now(),
            source,
            rank,
            load,
            analysis,
            timing,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn write_degree_report(f: &mut fmt::Formatter<'_>, label: &str, report: &DegreeReport) -> fmt::Result {
    let quintiles: Vec<String> = report.percentiles.iter().map(|p| format!("{:.2}", p.value)).collect();
    writeln!(f)?;
    writeln!(f, " {label} Statistics ")?;
    writeln!(f, "Average: {:.2}", report.mean)?;
    writeln!(f, "Median:  {}", report.median)?;
    writeln!(f, "Max:     {}", report.max)?;
    writeln!(f, "Min:     {}", report.min)?;
    writeln!(f, "Quintiles (0%, 20%, 40%, 60%, 80%, 100%): [{}]", quintiles.join(", "))
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let load = &self.load;
        writeln!(f, "Corpus: {}", self.source)?;
        writeln!(
            f,
            "Entries listed: {}, loaded: {}, failed: {}, skipped: {}, replaced: {}",
            load.entries_listed,
            load.documents_loaded,
            load.documents_failed,
            load.entries_skipped,
            load.documents_replaced
        )?;

        let Some(analysis) = &self.analysis else {
            writeln!(f)?;
            writeln!(f, "No pages loaded. Aborting PageRank.")?;
            return write_timing(f, &self.timing);
        };

        let graph = &analysis.graph;
        writeln!(
            f,
            "Graph: {} pages ({} crawled, {} dangling), {} links",
            graph.page_count, graph.crawled_count, graph.dangling_count, graph.link_count
        )?;

        if let Some(degrees) = &analysis.degrees {
            write_degree_report(f, "In-Degree", &degrees.in_degree)?;
            write_degree_report(f, "Out-Degree", &degrees.out_degree)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            " Starting PageRank (N={}, damping={}, tolerance={}, dangling={}) ",
            graph.page_count, self.rank.damping, self.rank.tolerance, self.rank.dangling
        )?;
        for pass in &analysis.trace {
            writeln!(
                f,
                "Iteration {}: Total Mass={:.4}, Delta={:.6} ({:.4}%)",
                pass.iteration, pass.total_mass, pass.delta, pass.change_percent
            )?;
        }
        let outcome = &analysis.pagerank;
        match outcome.termination {
            Termination::Converged => {
                writeln!(f, "Convergence reached after {} iterations.", outcome.iterations)?
            }
            Termination::IterationCap => writeln!(
                f,
                "Max iterations ({}) reached before convergence; scores are the last pass.",
                outcome.iterations
            )?,
        }

        writeln!(f)?;
        writeln!(f, " Top {} Pages by PageRank ", analysis.top_pages.len())?;
        for ranked in &analysis.top_pages {
            writeln!(f, "{}. {}: {:.8}", ranked.rank, ranked.page, ranked.score)?;
        }

        write_timing(f, &self.timing)
    }
}

fn write_timing(f: &mut fmt::Formatter<'_>, timing: &Timing) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "PERFORMANCE TIMING REPORT")?;
    writeln!(f, "I/O & Graph Construction: {:.2} seconds", timing.load_secs)?;
    writeln!(f, "Degree Statistics:        {:.2} seconds", timing.stats_secs)?;
    writeln!(f, "PageRank Computation:     {:.2} seconds", timing.pagerank_secs)?;
    writeln!(f, "Total Execution Time:     {:.2} seconds", timing.total_secs)
}

/// Text rendering of a self-check run.
pub fn render_self_check(check: &SelfCheck) -> String {
    let mut out = String::from("Test Graph: A->[B,C], B->[C], C->[A]\n");
    let scores: Vec<String> = check
        .scores
        .iter()
        .map(|(page, score)| format!("{page}={score:.6}"))
        .collect();
    out.push_str(&format!("Final PR Scores: {}\n", scores.join(", ")));
    out.push_str(&format!("Total mass: {:.6}\n", check.total_mass));
    if check.passed() {
        out.push_str("TEST PASSED: Graph logic and rank order verified.\n");
    } else {
        for failure in &check.failures {
            out.push_str(&format!("  - {failure}\n"));
        }
        out.push_str("TEST FAILED\n");
    }
    out
}
