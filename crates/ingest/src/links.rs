use linkrank_core::PageId;
use regex::Regex;

/// Pulls `href="<digits>.<ext>"` references out of a document.
///
/// Matching is case-insensitive and accepts single or double quotes with
/// optional whitespace around `=`. Each match yields `<digits>.<ext>` in
/// document order; duplicates are kept.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
    extension: String,
    suffix: String,
}

impl LinkExtractor {
    /// Extractor for documents named `<digits>.<extension>`.
    pub fn new(extension: &str) -> Result<Self, regex::Error> {
        let extension = extension.trim_start_matches('.').to_string();
        let pattern = Regex::new(&format!(
            r#"(?i)href\s*=\s*["'](\d+)\.{}["']"#,
            regex::escape(&extension)
        ))?;
        Ok(Self {
            pattern,
            suffix: format!(".{extension}"),
            extension,
        })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether a storage entry name looks like a corpus document.
    pub fn is_document(&self, name: &str) -> bool {
        name.ends_with(&self.suffix) && !name.ends_with('/')
    }

    /// Lazily iterate the linked PageIds in `content`. Calling again on the
    /// same text restarts from the beginning.
    pub fn links<'a>(&'a self, content: &'a str) -> impl Iterator<Item = PageId> + 'a {
        self.pattern
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(move |digits| PageId::new(format!("{}{}", digits.as_str(), self.suffix)))
    }

    /// Decode raw bytes (invalid UTF-8 is replaced, never rejected) and
    /// collect every link.
    pub fn extract(&self, raw: &[u8]) -> Vec<PageId> {
        let text = String::from_utf8_lossy(raw);
        self.links(&text).collect()
    }
}
