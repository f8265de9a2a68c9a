use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkrankError {
    #[error("Invalid configuration: {0}")]
    Config(String),
}
