mod messages;
mod status;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use pagetally_scraper::{DirectorySource, Dispatcher};
use pagetally_store::FileBlobStore;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

pub type ServiceDispatcher = Dispatcher<DirectorySource, FileBlobStore>;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ServiceDispatcher>,
}

impl AppState {
    #[must_use]
    pub fn new(dispatcher: ServiceDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/messages", post(messages::post_message))
        .route("/api/v1/status/stream", get(status::status_stream))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use futures::StreamExt;
    use pagetally_scraper::DispatcherSettings;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Scratch {
        root: PathBuf,
    }

    impl Scratch {
        fn new() -> Self {
            let root =
                std::env::temp_dir().join(format!("pagetally-server-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(root.join("pages")).expect("create scratch dir");
            Self { root }
        }

        fn write_page(&self, name: &str, html: &str) {
            std::fs::write(self.root.join("pages").join(name), html).expect("write page");
        }

        fn app(&self) -> (Router, AppState) {
            let settings = DispatcherSettings {
                pagination_settle: Duration::ZERO,
                playlist_settle: Duration::ZERO,
                ..DispatcherSettings::default()
            };
            let dispatcher = Dispatcher::new(
                DirectorySource::new(self.root.join("pages")),
                FileBlobStore::new(self.root.join("data")),
                &settings,
            )
            .expect("dispatcher");
            let state = AppState::new(dispatcher);
            (build_app(state.clone()), state)
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }

    fn message(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/messages")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    const ORDERS_PAGE: &str = r#"<html><body><main>
        <div><a href="/store/r1">R1</a><p>2 items for $10.00 • Mar 4 at 7:12 PM</p></div>
        <div><a href="/store/r2">R2</a><p>1 item for $4.25 • Mar 2 at 6:00 PM</p></div>
    </main></body></html>"#;

    #[tokio::test]
    async fn health_returns_envelope_and_echoes_request_id() {
        let scratch = Scratch::new();
        let (app, _) = scratch.app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header(REQUEST_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()),
            Some("req-123")
        );
        let json = json_body(response).await;
        assert_eq!(json["data"], json!({"status": "ok"}));
        assert_eq!(json["meta"]["request_id"], json!("req-123"));
    }

    #[tokio::test]
    async fn generates_request_id_when_absent() {
        let scratch = Scratch::new();
        let (app, _) = scratch.app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("request id header");
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn ping_message_replies_ready() {
        let scratch = Scratch::new();
        let (app, _) = scratch.app();
        let response = app
            .oneshot(message(r#"{"action":"ping"}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"ready": true}));
    }

    #[tokio::test]
    async fn scrape_message_returns_aggregate_and_persists() {
        let scratch = Scratch::new();
        scratch.write_page("orders.html", ORDERS_PAGE);
        let (app, _) = scratch.app();

        let response = app
            .clone()
            .oneshot(message(r#"{"action":"startScraping"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], json!(true));
        assert_eq!(json["data"]["total"], json!(14.25));
        assert_eq!(json["data"]["restaurants"]["R1"]["visits"], json!(1));
        assert_eq!(json["data"]["orders"][1]["price"], json!("4.25"));

        assert!(scratch.root.join("data").join("orderHistory.json").is_file());

        let response = app
            .oneshot(message(r#"{"action":"getResults"}"#))
            .await
            .expect("response");
        let results = json_body(response).await;
        assert_eq!(results["data"]["orders"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn missing_page_is_reported_in_band() {
        let scratch = Scratch::new();
        let (app, _) = scratch.app();
        let response = app
            .oneshot(message(r#"{"action":"startScraping"}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "success": false,
                "message": "Could not connect to page. Please reload and try again."
            })
        );
    }

    #[tokio::test]
    async fn malformed_message_is_bad_request() {
        let scratch = Scratch::new();
        let (app, _) = scratch.app();
        let response = app
            .oneshot(message(r#"{"action":"launchRockets"}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], json!("bad_request"));
    }

    #[tokio::test]
    async fn status_stream_delivers_scrape_progress() {
        let scratch = Scratch::new();
        let (app, state) = scratch.app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/status/stream")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("text/event-stream")
        );

        state
            .dispatcher
            .handle(pagetally_scraper::Request::StartScraping)
            .await;

        let mut body = response.into_body().into_data_stream();
        let first = body.next().await.expect("event").expect("event bytes");
        let text = String::from_utf8(first.to_vec()).expect("utf-8");
        assert!(text.contains("event: scrapingStatus"), "got {text}");
        assert!(text.contains(r#""status":"loading-orders""#), "got {text}");
    }
}
