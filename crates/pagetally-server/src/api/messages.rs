use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use pagetally_scraper::{Request, Response};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

/// Dispatches one protocol message.
///
/// Extraction failures are reported in-band (`success:false`); only bodies
/// that are not a valid message are rejected at the HTTP level.
pub(super) async fn post_message(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<Request>, JsonRejection>,
) -> Result<Json<Response>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(
            request_id = %req_id.0,
            error = %rejection.body_text(),
            "rejected malformed message"
        );
        ApiError::new(req_id.0.clone(), "bad_request", rejection.body_text())
    })?;

    let response = state.dispatcher.handle(request).await;
    if !response.is_success() {
        tracing::debug!(request_id = %req_id.0, "message handled with failure reply");
    }
    Ok(Json(response))
}
