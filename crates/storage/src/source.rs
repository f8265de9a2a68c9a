use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageError;

/// Where corpus documents come from.
///
/// Implementations only enumerate and read entries; filtering by extension,
/// link extraction and graph assembly happen in the loader.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    /// Names of every entry at the source. Fails with
    /// [`StorageError::SourceUnavailable`] when the source cannot be listed.
    async fn list_entries(&self) -> Result<Vec<String>, StorageError>;

    /// Raw content of one listed entry.
    async fn fetch_content(&self, name: &str) -> Result<Bytes, StorageError>;
}
