//! A [`Page`] replayed from saved markup.
//!
//! Each frame is the page as rendered after one more load-more click, so a
//! directory `orders/00.html`, `orders/01.html`, ... replays a full
//! pagination session.

use std::path::Path;

use crate::error::ScraperError;
use crate::pagination::{find_load_more, LoadMoreControl, Page};

#[derive(Debug, Clone)]
pub struct SnapshotPage {
    frames: Vec<String>,
    current: usize,
}

impl SnapshotPage {
    /// # Errors
    ///
    /// Returns [`ScraperError::PageUnavailable`] when `frames` is empty.
    pub fn new(frames: Vec<String>) -> Result<Self, ScraperError> {
        if frames.is_empty() {
            return Err(ScraperError::PageUnavailable {
                reason: "no page snapshots".to_string(),
            });
        }
        Ok(Self { frames, current: 0 })
    }

    #[must_use]
    pub fn single(html: impl Into<String>) -> Self {
        Self {
            frames: vec![html.into()],
            current: 0,
        }
    }

    /// Loads one `.html` file, or every `.html`/`.htm` file of a directory
    /// in file-name order.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::PageUnavailable`] when the path does not exist
    /// or holds no snapshot, and [`ScraperError::Io`] on read failures.
    pub async fn load(path: &Path) -> Result<Self, ScraperError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| ScraperError::PageUnavailable {
                reason: format!("{}: {e}", path.display()),
            })?;

        if meta.is_file() {
            return Ok(Self::single(read_frame(path).await?));
        }

        let mut entries = tokio::fs::read_dir(path)
            .await
            .map_err(|e| io_error(path, e))?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(path, e))? {
            let file = entry.path();
            let is_html = file
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
                });
            if is_html {
                files.push(file);
            }
        }
        files.sort();

        let mut frames = Vec::with_capacity(files.len());
        for file in &files {
            frames.push(read_frame(file).await?);
        }
        tracing::debug!(path = %path.display(), frames = frames.len(), "snapshots loaded");

        Self::new(frames).map_err(|_| ScraperError::PageUnavailable {
            reason: format!("{} holds no .html snapshots", path.display()),
        })
    }

    /// Index of the frame currently shown.
    #[must_use]
    pub fn current_frame(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

async fn read_frame(path: &Path) -> Result<String, ScraperError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> ScraperError {
    ScraperError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl Page for SnapshotPage {
    async fn content(&self) -> Result<String, ScraperError> {
        Ok(self.frames[self.current].clone())
    }

    async fn click(&mut self, control: &LoadMoreControl) -> Result<(), ScraperError> {
        let rendered = find_load_more(&self.frames[self.current], &control.label);
        if rendered.as_ref() != Some(control) {
            return Err(ScraperError::ClickFailed {
                label: control.label.clone(),
                reason: "control is not rendered in the current snapshot".to_string(),
            });
        }
        if self.current + 1 >= self.frames.len() {
            return Err(ScraperError::ClickFailed {
                label: control.label.clone(),
                reason: "no snapshot recorded after this click".to_string(),
            });
        }
        self.current += 1;
        Ok(())
    }
}
