//! End-to-end directory loads checked against the structural graph properties:
//! out-degree totals match the parsed links and reverse links invert forward links.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use linkrank_graph::GraphStore;
use linkrank_ingest::{CorpusLoader, LinkExtractor};
use linkrank_storage::DirectorySource;

// ============================================================================
// Test Helpers
// ============================================================================

fn write_page(dir: &Path, id: u32, links: &[u32]) {
    let mut body = format!("<html><body><h1>Page {id}</h1>\n");
    for link in links {
        body.push_str(&format!("<p>see <a href=\"{link}.html\">{link}</a></p>\n"));
    }
    body.push_str("</body></html>\n");
    std::fs::write(dir.join(format!("{id}.html")), body).unwrap();
}

async fn load_dir(dir: &Path, workers: usize) -> GraphStore {
    let source = Arc::new(DirectorySource::new(dir));
    let extractor = LinkExtractor::new("html").unwrap();
    CorpusLoader::new(source, extractor)
        .with_workers(workers)
        .with_progress_interval(10)
        .load()
        .await
        .unwrap()
        .graph
}

fn link_multiset_forward(g: &GraphStore) -> HashMap<(String, String), usize> {
    let mut edges = HashMap::new();
    for page in g.pages() {
        for target in g.links_from(page.as_str()).unwrap_or(&[]) {
            *edges.entry((page.to_string(), target.to_string())).or_insert(0) += 1;
        }
    }
    edges
}

fn link_multiset_reverse(g: &GraphStore) -> HashMap<(String, String), usize> {
    let mut edges = HashMap::new();
    for page in g.pages() {
        for source in g.links_to(page.as_str()) {
            *edges.entry((source.to_string(), page.to_string())).or_insert(0) += 1;
        }
    }
    edges
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn directory_corpus_satisfies_graph_properties() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();

    for id in 0..30u32 {
        let links: Vec<u32> = (1..=(id % 5)).map(|k| (id * k + 3) % 35).collect();
        write_page(dir, id, &links);
    }
    // self-link and duplicate links survive verbatim
    write_page(dir, 30, &[30, 2, 2]);
    // junk that must be tolerated or ignored
    std::fs::write(dir.join("31.html"), [0xffu8, 0xfe, 0x00, 0x01]).unwrap();
    std::fs::write(dir.join("robots.txt"), "User-agent: *").unwrap();

    let graph = load_dir(dir, 8).await;

    let out_sum: usize = graph.out_degrees().map(|(_, d)| d).sum();
    assert_eq!(out_sum, graph.link_count());
    assert_eq!(link_multiset_forward(&graph), link_multiset_reverse(&graph));

    assert_eq!(graph.out_degree("30.html"), Some(3));
    assert_eq!(graph.out_degree("31.html"), Some(0));
    assert!(graph.is_crawled("31.html"));
    assert!(!graph.contains("robots.txt"));

    // every page that is only a target sits in the universe with out-degree 0
    for page in graph.pages() {
        if !graph.is_crawled(page.as_str()) {
            assert_eq!(graph.out_degree(page.as_str()), Some(0));
            assert!(graph.in_degree(page.as_str()) > 0);
        }
    }
}

#[tokio::test]
async fn reloading_the_same_corpus_is_stable() {
    let tmp = tempfile::tempdir().unwrap();
    for id in 0..12u32 {
        write_page(tmp.path(), id, &[(id + 1) % 12, (id + 5) % 12]);
    }

    let first = load_dir(tmp.path(), 1).await;
    let second = load_dir(tmp.path(), 6).await;

    assert_eq!(
        first.out_degrees().collect::<Vec<_>>(),
        second.out_degrees().collect::<Vec<_>>()
    );
    assert_eq!(link_multiset_forward(&first), link_multiset_forward(&second));
    assert_eq!(first.stats(), second.stats());
}
