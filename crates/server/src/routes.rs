use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::{health::CheckService, storage::FileCheckStore};

use crate::errors::JsonApiError;

pub mod checks;

/// Registry service backed by the file store.
pub type Registry = CheckService<FileCheckStore>;

#[derive(Clone)]
pub struct ServerState {
    pub checks: Arc<Registry>,
}

impl ServerState {
    pub fn new(store: Arc<FileCheckStore>) -> Self {
        Self { checks: Arc::new(CheckService::new(store)) }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn route_not_found() -> JsonApiError {
    JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("route not found".into()))
}

/// Build the application router: check registry under `/api/health`, liveness at `/healthz`.
pub fn build_router(state: ServerState) -> Router {
    let checks_api = Router::new()
        .route("/checks", get(checks::list_checks).post(checks::create_check))
        .route("/checks/:id", get(checks::get_check).delete(checks::delete_check));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api/health", checks_api)
        .fallback(route_not_found)
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(CatchPanicLayer::new())
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
