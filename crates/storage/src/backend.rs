use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path;
use object_store::ObjectStore;
use tracing::info;

use linkrank_core::config::AwsConfig;

use crate::error::StorageError;
use crate::source::CorpusSource;

/// Documents stored as objects under a bucket prefix.
pub struct ObjectStoreSource {
    store: Arc<dyn ObjectStore>,
    location: String,
    prefix: String,
}

impl ObjectStoreSource {
    /// Wrap any object store. `location` is only used for logging.
    pub fn new(store: Arc<dyn ObjectStore>, location: impl Into<String>, prefix: &str) -> Self {
        Self {
            store,
            location: location.into(),
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    /// S3 (or S3-compatible endpoint) bucket.
    pub fn s3(bucket: &str, prefix: &str, aws: &AwsConfig) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::new().with_region(&aws.region);

        if let Some(ref key) = aws.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(ref secret) = aws.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(ref token) = aws.session_token {
            builder = builder.with_token(token);
        }

        match aws.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
            Some(endpoint) => {
                // object_store requires absolute endpoint URLs
                let endpoint_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
                    endpoint.to_string()
                } else {
                    format!("https://{}", endpoint)
                };
                builder = builder
                    .with_bucket_name(bucket)
                    .with_allow_http(endpoint_url.starts_with("http://"))
                    .with_endpoint(endpoint_url);
            }
            None => {
                builder = builder.with_url(format!("s3://{}", bucket));
            }
        }

        let store = builder.build()?;
        info!(
            "Corpus: S3 bucket s3://{}/{} (region: {})",
            bucket,
            prefix.trim_matches('/'),
            aws.region
        );
        Ok(Self::new(Arc::new(store), format!("s3://{bucket}"), prefix))
    }

    /// Google Cloud Storage bucket; credentials come from the standard
    /// `GOOGLE_*` environment (service account file or key).
    pub fn gcs(bucket: &str, prefix: &str) -> Result<Self, StorageError> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()?;
        info!("Corpus: GCS bucket gs://{}/{}", bucket, prefix.trim_matches('/'));
        Ok(Self::new(Arc::new(store), format!("gs://{bucket}"), prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[async_trait]
impl CorpusSource for ObjectStoreSource {
    fn describe(&self) -> String {
        if self.prefix.is_empty() {
            self.location.clone()
        } else {
            format!("{}/{}", self.location, self.prefix)
        }
    }

    async fn list_entries(&self) -> Result<Vec<String>, StorageError> {
        let prefix = (!self.prefix.is_empty()).then(|| Path::from(self.prefix.as_str()));
        let mut stream = self.store.list(prefix.as_ref());

        let mut names = Vec::new();
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| StorageError::SourceUnavailable(format!("listing {}: {e}", self.describe())))?
        {
            names.push(meta.location.to_string());
        }

        info!("Listed {} objects under {}", names.len(), self.describe());
        Ok(names)
    }

    async fn fetch_content(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = Path::parse(name).map_err(|e| StorageError::InvalidEntry(format!("{name}: {e}")))?;
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| StorageError::fetch(name, e))?;
        result.bytes().await.map_err(|e| StorageError::fetch(name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    async fn seeded_store() -> Arc<dyn ObjectStore> {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        for (key, body) in [
            ("data/1.html", "<a href=\"2.html\">"),
            ("data/2.html", ""),
            ("logs/forbidden.txt", "x"),
        ] {
            store
                .put(&Path::from(key), Bytes::from(body).into())
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn lists_only_under_prefix() {
        let source = ObjectStoreSource::new(seeded_store().await, "memory://", "/data/");
        assert_eq!(source.prefix(), "data");

        let mut names = source.list_entries().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["data/1.html", "data/2.html"]);
    }

    #[tokio::test]
    async fn empty_prefix_lists_everything() {
        let source = ObjectStoreSource::new(seeded_store().await, "memory://", "");
        assert_eq!(source.list_entries().await.unwrap().len(), 3);
        assert_eq!(source.describe(), "memory://");
    }

    #[tokio::test]
    async fn fetch_returns_object_bytes() {
        let source = ObjectStoreSource::new(seeded_store().await, "memory://", "data");

        let content = source.fetch_content("data/1.html").await.unwrap();
        assert_eq!(&content[..], b"<a href=\"2.html\">");

        let err = source.fetch_content("data/missing.html").await.unwrap_err();
        assert!(matches!(err, StorageError::Fetch { .. }), "got {err:?}");
    }
}
