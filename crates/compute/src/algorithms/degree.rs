use serde::Serialize;
use linkrank_graph::GraphStore;

/// Percentile ranks reported for every degree distribution.
pub const QUINTILE_RANKS: [f64; 6] = [0.0, 20.0, 40.0, 60.0, 80.0, 100.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentile {
    pub rank: f64,
    pub value: f64,
}

/// Summary of one degree distribution over the page universe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeReport {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub max: usize,
    pub min: usize,
    pub percentiles: Vec<Percentile>,
}

impl DegreeReport {
    /// Summarize `values`; `None` when there are none.
    pub fn from_values(values: &[usize]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        sorted.sort_by(f64::total_cmp);

        let sum: f64 = sorted.iter().sum();
        let percentiles = QUINTILE_RANKS
            .iter()
            .map(|&rank| Percentile {
                rank,
                value: percentile(&sorted, rank),
            })
            .collect();

        Some(Self {
            count: values.len(),
            mean: sum / values.len() as f64,
            median: percentile(&sorted, 50.0),
            max: values.iter().copied().max().unwrap_or(0),
            min: values.iter().copied().min().unwrap_or(0),
            percentiles,
        })
    }
}

/// In- and out-degree summaries for one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeStats {
    pub in_degree: DegreeReport,
    pub out_degree: DegreeReport,
}

/// Degree statistics over the page universe, or `None` for an empty graph.
///
/// In-degree counts link occurrences recorded in the reverse index.
pub fn compute_stats(graph: &GraphStore) -> Option<DegreeStats> {
    let in_values: Vec<usize> = graph.pages().map(|p| graph.in_degree(p.as_str())).collect();
    let out_values: Vec<usize> = graph.out_degrees().map(|(_, d)| d).collect();

    Some(DegreeStats {
        in_degree: DegreeReport::from_values(&in_values)?,
        out_degree: DegreeReport::from_values(&out_values)?,
    })
}

/// Linear-interpolation percentile of an ascending slice, `p` in `[0, 100]`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let position = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let fraction = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}
