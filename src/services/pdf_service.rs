use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Turns an uploaded document into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the text of every page in document order. A document with no
    /// recoverable text yields an empty string rather than an error.
    async fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Extracts text by shelling out to poppler's `pdftotext`.
#[derive(Clone, Debug)]
pub struct PdftotextExtractor {
    binary: String,
}

impl PdftotextExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl TextExtractor for PdftotextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .output()
            .await
            .map_err(|e| {
                tracing::error!("Failed to run {} on {}: {}", self.binary, path.display(), e);
                anyhow::anyhow!("Failed to run {}: {}", self.binary, e)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("{} failed: {}", self.binary, stderr.trim());
            return Err(anyhow::anyhow!("{} could not read the PDF document", self.binary).into());
        }

        Ok(join_pages(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// `pdftotext` separates pages with form feeds.
fn join_pages(raw: &str) -> String {
    raw.split('\u{000C}')
        .map(str::trim_end)
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
