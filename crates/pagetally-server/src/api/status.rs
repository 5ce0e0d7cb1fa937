use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use super::AppState;

/// Streams every status message pushed after the client connects.
pub(super) async fn status_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.dispatcher.subscribe()).filter_map(|received| {
        let event = match received {
            Ok(message) => match Event::default().event("scrapingStatus").json_data(&message) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode status event");
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "status stream subscriber lagged");
                None
            }
        };
        std::future::ready(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
