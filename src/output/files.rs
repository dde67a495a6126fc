//! Filesystem sink: one HTML file per page plus a CSV manifest
//!
//! Page files are content-addressed by URL: the name is the first 128 bits of the
//! SHA-256 digest of the URL, hex encoded, so the same URL always maps to the same file.

use crate::config::OutputConfig;
use crate::output::traits::{OutputResult, Sink};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Header of the single manifest column
pub const MANIFEST_HEADER: &str = "URL";

/// Returns the 32 hex character file key for a URL
///
/// # Example
///
/// ```
/// use wavecrawl::output::page_key;
///
/// let key = page_key("https://example.com/");
/// assert_eq!(key.len(), 32);
/// assert_eq!(key, page_key("https://example.com/"));
/// ```
pub fn page_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..16])
}

/// Writes pages to `<pages_dir>/<key>.html` and the manifest to a CSV file
#[derive(Debug, Clone)]
pub struct FileSink {
    pages_dir: PathBuf,
    manifest_path: PathBuf,
}

impl FileSink {
    /// Creates a sink, creating the pages directory if needed
    ///
    /// # Arguments
    ///
    /// * `pages_dir` - Directory receiving one file per page
    /// * `manifest_path` - CSV file written when the crawl finishes
    pub fn create(pages_dir: impl AsRef<Path>, manifest_path: impl AsRef<Path>) -> OutputResult<Self> {
        let pages_dir = pages_dir.as_ref().to_path_buf();
        fs::create_dir_all(&pages_dir)?;

        Ok(Self {
            pages_dir,
            manifest_path: manifest_path.as_ref().to_path_buf(),
        })
    }

    pub fn from_config(config: &OutputConfig) -> OutputResult<Self> {
        Self::create(&config.pages_dir, &config.manifest_path)
    }

    /// Path the page for `url` is written to
    pub fn page_path(&self, url: &str) -> PathBuf {
        self.pages_dir.join(format!("{}.html", page_key(url)))
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }
}

impl Sink for FileSink {
    fn save(&self, url: &str, html: &str) -> OutputResult<()> {
        let path = self.page_path(url);
        fs::write(&path, html)?;
        tracing::debug!("Saved {} to {}", url, path.display());
        Ok(())
    }

    fn manifest(&self, visited: &[String]) -> OutputResult<()> {
        if let Some(parent) = self.manifest_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.manifest_path)?;
        writer.write_record([MANIFEST_HEADER])?;
        for url in visited {
            writer.write_record([url.as_str()])?;
        }
        writer.flush()?;

        tracing::info!(
            "Wrote manifest of {} URLs to {}",
            visited.len(),
            self.manifest_path.display()
        );
        Ok(())
    }
}
