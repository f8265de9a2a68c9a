use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComputeError {
    /// PageRank divides by the page count, so it refuses an empty graph.
    #[error("graph has no pages")]
    EmptyGraph,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
