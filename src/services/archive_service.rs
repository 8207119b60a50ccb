use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use std::path::{Path, PathBuf};

/// Keeps a copy of the most recently accepted quiz on disk for debugging.
/// Each save overwrites the previous file.
#[derive(Clone, Debug, Default)]
pub struct QuizArchive {
    path: Option<PathBuf>,
}

impl QuizArchive {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn save(&self, quiz: &Quiz) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let body = serde_json::to_string_pretty(quiz)?;
        tokio::fs::write(path, body)
            .await
            .map_err(|e| Error::Persistence(format!("{}: {}", path.display(), e)))
    }

    /// Like [`save`](Self::save), but failures are only logged.
    pub async fn save_best_effort(&self, quiz: &Quiz) {
        match self.save(quiz).await {
            Ok(()) => {
                if let Some(path) = &self.path {
                    tracing::debug!(path = %path.display(), "Archived generated quiz");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not archive generated quiz"),
        }
    }
}
