//! In-memory sink, used by tests and library callers that post-process pages themselves

use crate::output::traits::{OutputResult, Sink};
use std::collections::HashSet;
use std::io;
use std::sync::Mutex;

/// Keeps saved pages and the manifest in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pages: Mutex<Vec<(String, String)>>,
    manifest: Mutex<Option<Vec<String>>>,
    failing: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink whose `save` fails for the given URLs
    pub fn failing_on<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Saved `(url, html)` pairs in save order
    pub fn pages(&self) -> Vec<(String, String)> {
        self.pages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// URLs of saved pages in save order
    pub fn saved_urls(&self) -> Vec<String> {
        self.pages().into_iter().map(|(url, _)| url).collect()
    }

    /// The manifest, or `None` if the crawl never finished
    pub fn manifest_urls(&self) -> Option<Vec<String>> {
        self.manifest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Sink for MemorySink {
    fn save(&self, url: &str, html: &str) -> OutputResult<()> {
        if self.failing.contains(url) {
            return Err(io::Error::new(io::ErrorKind::Other, format!("refusing to save {}", url)).into());
        }

        self.pages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((url.to_string(), html.to_string()));
        Ok(())
    }

    fn manifest(&self, visited: &[String]) -> OutputResult<()> {
        *self
            .manifest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(visited.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_pages_and_manifest() {
        let sink = MemorySink::new();
        assert!(sink.manifest_urls().is_none());

        sink.save("https://example.com/", "<html></html>").unwrap();
        sink.manifest(&["https://example.com/".to_string()]).unwrap();

        assert_eq!(sink.saved_urls(), vec!["https://example.com/".to_string()]);
        assert_eq!(
            sink.manifest_urls(),
            Some(vec!["https://example.com/".to_string()])
        );
    }

    #[test]
    fn test_failing_urls() {
        let sink = MemorySink::failing_on(["https://example.com/bad"]);
        assert!(sink.save("https://example.com/bad", "x").is_err());
        assert!(sink.save("https://example.com/good", "x").is_ok());
        assert_eq!(sink.saved_urls().len(), 1);
    }
}
