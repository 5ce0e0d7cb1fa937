//! Messages exchanged between a client (popup, CLI, HTTP caller) and the
//! extraction logic.
//!
//! Requests are tagged by `action`. Responses serialize to the bare shapes
//! clients already understand, e.g. `{"ready":true}` or
//! `{"success":false,"message":"..."}`.

use pagetally_core::{AggregateResult, ChunkHint, Duration};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Readiness probe.
    Ping,
    /// Load every order page, then extract and aggregate.
    StartScraping,
    /// Measure the playlist on the current page.
    GetPlaylistTime,
    /// Last successful order scrape, from memory or the blob store.
    GetResults,
    GetScrapingStatus,
    #[serde(rename_all = "camelCase")]
    CalculateChunks {
        time_object: Duration,
        chunk_minutes: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ready,
    Orders(AggregateResult),
    PlaylistTime {
        formatted: String,
        time_object: Duration,
        chunk_hints: Vec<ChunkHint>,
    },
    Chunks {
        chunks: u64,
        chunk_minutes: i64,
        message: String,
    },
    Results(Option<AggregateResult>),
    Status(Option<ScrapeStatus>),
    Failure {
        message: String,
    },
}

impl Response {
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure { .. })
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::Ready => map.serialize_entry("ready", &true)?,
            Self::Orders(data) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
            }
            Self::PlaylistTime {
                formatted,
                time_object,
                chunk_hints,
            } => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("formatted", formatted)?;
                map.serialize_entry("timeObject", time_object)?;
                map.serialize_entry("chunkHints", chunk_hints)?;
            }
            Self::Chunks {
                chunks,
                chunk_minutes,
                message,
            } => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("chunks", chunks)?;
                map.serialize_entry("chunkMinutes", chunk_minutes)?;
                map.serialize_entry("message", message)?;
            }
            Self::Results(data) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
            }
            Self::Status(status) => map.serialize_entry("status", status)?,
            Self::Failure { message } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("message", message)?;
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrapeStatus {
    LoadingOrders,
    AnalyzingOrders,
    Error,
}

/// Progress pushed to listeners while a scrape runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename = "scrapingStatus")]
pub struct StatusMessage {
    pub status: ScrapeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusMessage {
    #[must_use]
    pub fn progress(status: ScrapeStatus) -> Self {
        Self {
            status,
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ScrapeStatus::Error,
            error: Some(message.into()),
        }
    }
}
