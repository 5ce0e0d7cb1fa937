use std::future::Future;
use std::path::PathBuf;

use crate::error::ScraperError;
use crate::pagination::Page;
use crate::snapshot::SnapshotPage;

/// Supplies the page a request should run against.
///
/// Failing to produce a page means the extraction logic cannot reach it,
/// and should surface as [`ScraperError::PageUnavailable`].
pub trait PageSource: Send + Sync {
    type Page: Page;

    fn orders_page(&self) -> impl Future<Output = Result<Self::Page, ScraperError>> + Send;

    fn playlist_page(&self) -> impl Future<Output = Result<Self::Page, ScraperError>> + Send;
}

/// Replays saved snapshots from `<root>/orders` and `<root>/playlist`.
///
/// Each may be a directory of frames or a single `.html` file next to it
/// (`<root>/orders.html`).
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn open(&self, name: &str) -> Result<SnapshotPage, ScraperError> {
        let dir = self.root.join(name);
        if tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return SnapshotPage::load(&dir).await;
        }
        SnapshotPage::load(&self.root.join(format!("{name}.html")))
            .await
            .map_err(|e| match e {
                ScraperError::PageUnavailable { .. } => ScraperError::PageUnavailable {
                    reason: format!("no {name} snapshot under {}", self.root.display()),
                },
                other => other,
            })
    }
}

impl PageSource for DirectorySource {
    type Page = SnapshotPage;

    async fn orders_page(&self) -> Result<SnapshotPage, ScraperError> {
        self.open("orders").await
    }

    async fn playlist_page(&self) -> Result<SnapshotPage, ScraperError> {
        self.open("playlist").await
    }
}
