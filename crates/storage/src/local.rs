use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::StorageError;
use crate::source::CorpusSource;

/// Documents stored as files directly inside one local directory.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl CorpusSource for DirectorySource {
    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }

    async fn list_entries(&self) -> Result<Vec<String>, StorageError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || list_directory(&root))
            .await
            .map_err(|e| StorageError::Other(format!("directory listing task failed: {e}")))?
    }

    async fn fetch_content(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = self.root.join(name);
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::fetch(name, e))?;
        Ok(Bytes::from(data))
    }
}

/// List regular files at the top level of `root`, sorted by name.
fn list_directory(root: &Path) -> Result<Vec<String>, StorageError> {
    if !root.is_dir() {
        return Err(StorageError::SourceUnavailable(format!(
            "directory '{}' not found",
            root.display()
        )));
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(StorageError::SourceUnavailable(format!(
                    "cannot read directory '{}': {e}",
                    root.display()
                )));
            }
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_string()),
            None => warn!(path = %entry.path().display(), "skipping entry with non-UTF-8 name"),
        }
    }

    names.sort();
    info!("Found {} files in {}", names.len(), root.display());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_top_level_files_only() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("2.html"), "b").unwrap();
        std::fs::write(tmp.path().join("1.html"), "a").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "c").unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();
        std::fs::write(tmp.path().join("nested").join("3.html"), "d").unwrap();

        let source = DirectorySource::new(tmp.path());
        let names = source.list_entries().await.unwrap();

        assert_eq!(names, vec!["1.html", "2.html", "notes.txt"]);
    }

    #[tokio::test]
    async fn missing_directory_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(tmp.path().join("does-not-exist"));

        let err = source.list_entries().await.unwrap_err();
        assert!(matches!(err, StorageError::SourceUnavailable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn fetch_reads_bytes_and_reports_missing_entries() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("1.html"), b"<a href=\"2.html\">").unwrap();
        let source = DirectorySource::new(tmp.path());

        let content = source.fetch_content("1.html").await.unwrap();
        assert_eq!(&content[..], b"<a href=\"2.html\">");

        let err = source.fetch_content("9.html").await.unwrap_err();
        assert!(matches!(err, StorageError::Fetch { ref entry, .. } if entry == "9.html"));
    }
}
