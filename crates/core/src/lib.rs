pub mod config;
pub mod error;
pub mod page;

pub use config::Config;
pub use error::*;
pub use page::*;
