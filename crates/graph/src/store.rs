use std::collections::HashMap;

use indexmap::IndexMap;
use linkrank_core::PageId;
use serde::Serialize;
use tracing::warn;

/// Links parsed out of one document: the unit merged into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub page: PageId,
    /// Outgoing links in document order, duplicates and self-links kept.
    pub targets: Vec<PageId>,
}

impl PageLinks {
    pub fn new(page: impl Into<PageId>, targets: Vec<PageId>) -> Self {
        Self {
            page: page.into(),
            targets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub page_count: usize,
    /// Pages that were loaded as documents (as opposed to link targets only).
    pub crawled_count: usize,
    pub link_count: usize,
    pub dangling_count: usize,
}

/// Directed page graph.
///
/// `out_degree` holds the canonical page universe: every crawled page plus
/// every page that is only ever a link target (with a zero entry). `reverse`
/// is kept as the exact inverse of `forward`, one entry per link occurrence.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    forward: HashMap<PageId, Vec<PageId>>,
    reverse: HashMap<PageId, Vec<PageId>>,
    out_degree: IndexMap<PageId, usize>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(page, targets)` pairs, merged in order.
    pub fn from_adjacency<P, I>(adjacency: I) -> Self
    where
        P: Into<PageId>,
        I: IntoIterator<Item = (P, Vec<P>)>,
    {
        let mut graph = Self::new();
        for (page, targets) in adjacency {
            let targets = targets.into_iter().map(Into::into).collect();
            graph.merge(PageLinks::new(page, targets));
        }
        graph
    }

    /// Merge one document's links.
    ///
    /// A page merged a second time replaces its earlier links; the reverse
    /// entries contributed by the earlier merge are retracted first. Returns
    /// `true` when such a replacement happened.
    pub fn merge(&mut self, links: PageLinks) -> bool {
        let PageLinks { page, targets } = links;

        let replaced = match self.forward.remove(&page) {
            Some(previous) => {
                warn!(page = %page, "page loaded twice, keeping the later document");
                self.retract(&page, &previous);
                true
            }
            None => false,
        };

        self.out_degree.insert(page.clone(), targets.len());

        for target in &targets {
            self.reverse
                .entry(target.clone())
                .or_default()
                .push(page.clone());
            if !self.out_degree.contains_key(target) {
                self.out_degree.insert(target.clone(), 0);
            }
        }

        self.forward.insert(page, targets);
        replaced
    }

    /// Remove the reverse entries `source` contributed through `targets`.
    fn retract(&mut self, source: &PageId, targets: &[PageId]) {
        for target in targets {
            let now_empty = match self.reverse.get_mut(target) {
                Some(sources) => {
                    if let Some(pos) = sources.iter().position(|s| s == source) {
                        sources.swap_remove(pos);
                    }
                    sources.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.reverse.remove(target);
                // A target admitted only by the retracted links leaves the universe.
                if target != source && !self.forward.contains_key(target) {
                    self.out_degree.shift_remove(target);
                }
            }
        }
    }

    /// Put the page universe and every reverse list in PageId order, making
    /// the store independent of the order documents were merged in.
    pub fn finalize(&mut self) {
        self.out_degree.sort_keys();
        for sources in self.reverse.values_mut() {
            sources.sort();
        }
    }

    /// Pages in the canonical universe.
    pub fn pages(&self) -> impl Iterator<Item = &PageId> {
        self.out_degree.keys()
    }

    pub fn out_degrees(&self) -> impl Iterator<Item = (&PageId, usize)> {
        self.out_degree.iter().map(|(page, &deg)| (page, deg))
    }

    pub fn page_count(&self) -> usize {
        self.out_degree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out_degree.is_empty()
    }

    pub fn contains(&self, page: &str) -> bool {
        self.out_degree.contains_key(page)
    }

    /// Whether the page was loaded as a document rather than only linked to.
    pub fn is_crawled(&self, page: &str) -> bool {
        self.forward.contains_key(page)
    }

    pub fn out_degree(&self, page: &str) -> Option<usize> {
        self.out_degree.get(page).copied()
    }

    /// Number of link occurrences pointing at `page`.
    pub fn in_degree(&self, page: &str) -> usize {
        self.reverse.get(page).map_or(0, Vec::len)
    }

    /// Outgoing links of a crawled page, as parsed.
    pub fn links_from(&self, page: &str) -> Option<&[PageId]> {
        self.forward.get(page).map(Vec::as_slice)
    }

    /// Sources linking to `page`, one entry per link occurrence.
    pub fn links_to(&self, page: &str) -> &[PageId] {
        self.reverse.get(page).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn link_count(&self) -> usize {
        self.forward.values().map(Vec::len).sum()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            page_count: self.out_degree.len(),
            crawled_count: self.forward.len(),
            link_count: self.link_count(),
            dangling_count: self.out_degree.values().filter(|&&d| d == 0).count(),
        }
    }
}
