pub mod links;
pub mod loader;

pub use links::LinkExtractor;
pub use loader::{CorpusLoader, LoadOutcome, LoadSummary};
