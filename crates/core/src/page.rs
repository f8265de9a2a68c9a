use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identifier of a page, derived from its document's base filename
/// (for example `42.html`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a PageId from a storage entry name such as `data/42.html`.
    ///
    /// Returns `None` for directory markers (names ending in `/`) and empty names.
    pub fn from_entry_name(name: &str) -> Option<Self> {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        if base.is_empty() {
            return None;
        }
        Some(Self(base.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for PageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_name_reduces_to_base_filename() {
        assert_eq!(PageId::from_entry_name("data/42.html").unwrap().as_str(), "42.html");
        assert_eq!(PageId::from_entry_name("42.html").unwrap().as_str(), "42.html");
        assert_eq!(PageId::from_entry_name("a/b/c/7.html").unwrap().as_str(), "7.html");
    }

    #[test]
    fn directory_marker_has_no_page_id() {
        assert!(PageId::from_entry_name("data/").is_none());
        assert!(PageId::from_entry_name("").is_none());
    }

    #[test]
    fn lookup_by_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(PageId::from("1.html"), 3usize);
        assert_eq!(map.get("1.html"), Some(&3));
    }
}
