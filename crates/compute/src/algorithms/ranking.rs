use linkrank_core::PageId;
use serde::Serialize;

use super::pagerank::ScoreVector;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPage {
    /// 1-based position.
    pub rank: usize,
    pub page: PageId,
    pub score: f64,
}

/// The `k` highest-scoring pages, best first. Equal scores are ordered by
/// PageId ascending so the result never depends on map iteration order.
pub fn top_k(scores: &ScoreVector, k: usize) -> Vec<RankedPage> {
    let mut entries: Vec<(&PageId, f64)> = scores.iter().map(|(page, &score)| (page, score)).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    entries
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, (page, score))| RankedPage {
            rank: i + 1,
            page: page.clone(),
            score,
        })
        .collect()
}
