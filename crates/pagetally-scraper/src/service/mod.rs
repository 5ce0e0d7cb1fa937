//! Request dispatch: routes each [`Request`] to the extraction logic and
//! owns the state shared between requests.

mod cache;
mod source;

use std::time::Duration;

use pagetally_core::{
    chunk_count, chunk_hints, chunk_message, AggregateResult, AppConfig, CoreError,
};
use pagetally_store::{get_json, put_json, BlobStore};
use tokio::sync::{broadcast, Mutex, RwLock};

pub use cache::ResultCache;
pub use source::{DirectorySource, PageSource};

use crate::error::ScraperError;
use crate::orders::{OrderExtractor, OrderSelectors};
use crate::pagination::{Page, PaginationDriver};
use crate::playlist::{PlaylistExtractor, PlaylistSelectors};
use crate::protocol::{Request, Response, ScrapeStatus, StatusMessage};

/// Blob key of the last successful order scrape.
pub const ORDER_HISTORY_KEY: &str = "orderHistory";

const INVALID_CHUNK_SIZE: &str = "Please enter a valid chunk size.";
const DURATION_TOO_LARGE: &str = "Duration is too large to split into chunks.";
const STATUS_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub show_more_label: String,
    pub pagination_settle: Duration,
    pub pagination_max_clicks: Option<usize>,
    pub playlist_settle: Duration,
    pub order_selectors: OrderSelectors,
    pub playlist_selectors: PlaylistSelectors,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            show_more_label: "Show more".to_string(),
            pagination_settle: Duration::from_millis(1500),
            pagination_max_clicks: None,
            playlist_settle: Duration::from_millis(1000),
            order_selectors: OrderSelectors::default(),
            playlist_selectors: PlaylistSelectors::default(),
        }
    }
}

impl DispatcherSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let order_selectors = OrderSelectors {
            delimiters: config.order_delimiters.clone(),
            ..OrderSelectors::default()
        };
        Self {
            show_more_label: config.show_more_label.clone(),
            pagination_settle: Duration::from_millis(config.pagination_settle_ms),
            pagination_max_clicks: config.pagination_max_clicks,
            playlist_settle: Duration::from_millis(config.playlist_settle_ms),
            order_selectors,
            playlist_selectors: PlaylistSelectors::default(),
        }
    }
}

pub struct Dispatcher<S, B> {
    source: S,
    store: B,
    cache: ResultCache,
    status_tx: broadcast::Sender<StatusMessage>,
    last_status: RwLock<Option<ScrapeStatus>>,
    /// Held for the whole of a scrape so two scrapes never interleave.
    scrape_lock: Mutex<()>,
    orders: OrderExtractor,
    playlist: PlaylistExtractor,
    pagination: PaginationDriver,
    playlist_settle: Duration,
}

impl<S, B> std::fmt::Debug for Dispatcher<S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pagination", &self.pagination)
            .field("playlist_settle", &self.playlist_settle)
            .finish_non_exhaustive()
    }
}

impl<S: PageSource, B: BlobStore> Dispatcher<S, B> {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] when a configured selector
    /// does not parse.
    pub fn new(source: S, store: B, settings: &DispatcherSettings) -> Result<Self, ScraperError> {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Ok(Self {
            source,
            store,
            cache: ResultCache::new(),
            status_tx,
            last_status: RwLock::new(None),
            scrape_lock: Mutex::new(()),
            orders: OrderExtractor::new(&settings.order_selectors)?,
            playlist: PlaylistExtractor::new(&settings.playlist_selectors)?,
            pagination: PaginationDriver::new(
                settings.show_more_label.clone(),
                settings.pagination_settle,
                settings.pagination_max_clicks,
            ),
            playlist_settle: settings.playlist_settle,
        })
    }

    /// Status messages pushed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusMessage> {
        self.status_tx.subscribe()
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub async fn latest_result(&self) -> Option<AggregateResult> {
        self.cache.get().await.map(|shared| (*shared).clone())
    }

    pub async fn handle(&self, request: Request) -> Response {
        tracing::debug!(?request, "handling request");
        match request {
            Request::Ping => Response::Ready,
            Request::StartScraping => self.start_scraping().await,
            Request::GetPlaylistTime => self.playlist_time().await,
            Request::GetResults => self.results().await,
            Request::GetScrapingStatus => Response::Status(*self.last_status.read().await),
            Request::CalculateChunks {
                time_object,
                chunk_minutes,
            } => match chunk_count(&time_object, chunk_minutes) {
                Ok(chunks) => Response::Chunks {
                    chunks,
                    chunk_minutes,
                    message: chunk_message(chunks, chunk_minutes),
                },
                Err(CoreError::InvalidChunkSize(_)) => Response::failure(INVALID_CHUNK_SIZE),
                Err(CoreError::DurationOverflow) => {
                    tracing::warn!(?time_object, "chunk request duration overflows");
                    Response::failure(DURATION_TOO_LARGE)
                }
            },
        }
    }

    async fn push_status(&self, message: StatusMessage) {
        *self.last_status.write().await = Some(message.status);
        // No subscribers is not an error.
        let _ = self.status_tx.send(message);
    }

    async fn start_scraping(&self) -> Response {
        let _guard = self.scrape_lock.lock().await;
        self.push_status(StatusMessage::progress(ScrapeStatus::LoadingOrders))
            .await;

        let mut page = match self.source.orders_page().await {
            Ok(page) => page,
            Err(e) => return self.abort_scrape(&e).await,
        };

        self.pagination.load_all(&mut page).await;

        self.push_status(StatusMessage::progress(ScrapeStatus::AnalyzingOrders))
            .await;

        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => return self.abort_scrape(&e).await,
        };
        let result = self.orders.extract(&html);

        if let Some(error) = &result.error {
            tracing::warn!(error = %error, "order scrape found nothing to keep");
            return Response::Orders(result);
        }

        let shared = self.cache.replace(result).await;
        if let Err(e) = put_json(&self.store, ORDER_HISTORY_KEY, shared.as_ref()).await {
            tracing::error!(error = %e, "failed to persist order history");
        }
        tracing::info!(
            orders = shared.order_count(),
            restaurants = shared.restaurants.len(),
            total = %shared.total,
            "order scrape complete"
        );
        Response::Orders((*shared).clone())
    }

    async fn abort_scrape(&self, error: &ScraperError) -> Response {
        tracing::error!(error = %error, "order scrape aborted");
        let message = error.user_message();
        self.push_status(StatusMessage::error(message.clone())).await;
        Response::failure(message)
    }

    async fn playlist_time(&self) -> Response {
        tokio::time::sleep(self.playlist_settle).await;

        let measured = match self.source.playlist_page().await {
            Ok(page) => match page.content().await {
                Ok(html) => self.playlist.measure(&html),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        match measured {
            Ok(total) => {
                tracing::info!(total = %total.compact(), "playlist measured");
                Response::PlaylistTime {
                    formatted: total.to_string(),
                    time_object: total,
                    chunk_hints: chunk_hints(&total),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "playlist measurement failed");
                Response::failure(e.user_message())
            }
        }
    }

    async fn results(&self) -> Response {
        if let Some(cached) = self.cache.get().await {
            return Response::Results(Some((*cached).clone()));
        }
        match get_json::<AggregateResult, _>(&self.store, ORDER_HISTORY_KEY).await {
            Ok(stored) => Response::Results(stored),
            Err(e) => {
                tracing::error!(error = %e, "failed to read stored order history");
                Response::Results(None)
            }
        }
    }
}
