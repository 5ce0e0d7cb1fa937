pub mod dom;
pub mod error;
pub mod orders;
pub mod pagination;
pub mod playlist;
pub mod protocol;
pub mod service;
pub mod snapshot;

pub use error::ScraperError;
pub use orders::{OrderExtractor, OrderSelectors};
pub use pagination::{
    find_load_more, LoadMoreControl, Page, PaginationDriver, PaginationOutcome, StopReason,
};
pub use playlist::{PlaylistExtractor, PlaylistSelectors};
pub use protocol::{Request, Response, ScrapeStatus, StatusMessage};
pub use service::{
    DirectorySource, Dispatcher, DispatcherSettings, PageSource, ResultCache, ORDER_HISTORY_KEY,
};
pub use snapshot::SnapshotPage;
