pub mod degree;
pub mod pagerank;
pub mod ranking;
