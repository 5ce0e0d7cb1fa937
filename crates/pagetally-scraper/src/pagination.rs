//! "Show more" pagination over a live page.
//!
//! The driver reads the page, clicks the load-more control if it is still
//! rendered, waits a fixed settle delay for the new rows to appear, and
//! repeats. It stops the first time the control is absent. A failed read or
//! click also ends the loop; whatever has loaded so far is then parsed as
//! usual.

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use scraper::{Html, Selector};

use crate::dom::text_content;
use crate::error::ScraperError;

static BUTTON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("button").expect("valid button selector"));

/// A rendered page that can be read and clicked.
///
/// Futures are `Send` so a page can be driven from a multi-threaded runtime.
pub trait Page: Send {
    /// Current markup of the page.
    fn content(&self) -> impl Future<Output = Result<String, ScraperError>> + Send;

    /// Triggers `control` as a user click would.
    fn click(
        &mut self,
        control: &LoadMoreControl,
    ) -> impl Future<Output = Result<(), ScraperError>> + Send;
}

/// A load-more button located in a page snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMoreControl {
    /// Position among all `<button>` elements, in document order.
    pub index: usize,
    pub label: String,
}

/// Finds the first `<button>` whose trimmed text equals `label`.
#[must_use]
pub fn find_load_more(html: &str, label: &str) -> Option<LoadMoreControl> {
    let doc = Html::parse_document(html);
    doc.select(&BUTTON)
        .enumerate()
        .find(|(_, button)| text_content(*button).trim() == label)
        .map(|(index, _)| LoadMoreControl {
            index,
            label: label.to_owned(),
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The control is no longer rendered; every page is loaded.
    ControlGone,
    /// The configured click cap was reached.
    ClickLimit,
    /// Reading or clicking failed; the message is kept for logging.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationOutcome {
    pub clicks: usize,
    pub stop: StopReason,
}

#[derive(Debug, Clone)]
pub struct PaginationDriver {
    label: String,
    settle: Duration,
    max_clicks: Option<usize>,
}

impl PaginationDriver {
    /// `settle` is waited after every click. `max_clicks = None` keeps going
    /// until the control disappears.
    #[must_use]
    pub fn new(label: impl Into<String>, settle: Duration, max_clicks: Option<usize>) -> Self {
        Self {
            label: label.into(),
            settle,
            max_clicks,
        }
    }

    /// Clicks the load-more control until it is gone.
    ///
    /// Never returns an error; failures end the loop and are reported in
    /// [`PaginationOutcome::stop`].
    pub async fn load_all<P: Page>(&self, page: &mut P) -> PaginationOutcome {
        let mut clicks = 0usize;

        let stop = loop {
            if self.max_clicks.is_some_and(|max| clicks >= max) {
                tracing::warn!(clicks, "pagination click limit reached");
                break StopReason::ClickLimit;
            }

            let html = match page.content().await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!(error = %e, clicks, "could not read page; stopping pagination");
                    break StopReason::Failed(e.to_string());
                }
            };

            let Some(control) = find_load_more(&html, &self.label) else {
                break StopReason::ControlGone;
            };

            if let Err(e) = page.click(&control).await {
                tracing::warn!(error = %e, clicks, "load-more click failed; stopping pagination");
                break StopReason::Failed(e.to_string());
            }
            clicks += 1;
            tracing::debug!(clicks, settle_ms = self.settle.as_millis(), "load-more clicked");

            tokio::time::sleep(self.settle).await;
        };

        tracing::info!(clicks, stop = ?stop, "pagination finished");
        PaginationOutcome { clicks, stop }
    }
}
