pub mod backend;
pub mod error;
pub mod local;
pub mod source;

use std::sync::Arc;

use linkrank_core::config::{AwsConfig, CorpusConfig, CorpusProvider};

pub use backend::ObjectStoreSource;
pub use error::StorageError;
pub use local::DirectorySource;
pub use source::CorpusSource;

/// Select the corpus source named by config. A bucket takes precedence
/// over a local directory.
pub fn source_from_config(
    corpus: &CorpusConfig,
    aws: &AwsConfig,
) -> Result<Arc<dyn CorpusSource>, StorageError> {
    match (&corpus.bucket, &corpus.data_dir) {
        (Some(bucket), _) => {
            let source = match corpus.provider {
                CorpusProvider::S3 => ObjectStoreSource::s3(bucket, &corpus.prefix, aws)?,
                CorpusProvider::Gcs => ObjectStoreSource::gcs(bucket, &corpus.prefix)?,
            };
            Ok(Arc::new(source))
        }
        (None, Some(dir)) => Ok(Arc::new(DirectorySource::new(dir))),
        (None, None) => Err(StorageError::NotConfigured(
            "set CORPUS_DIR or CORPUS_BUCKET (or pass --dir / --bucket)".into(),
        )),
    }
}
