//! HTTP server mode for REST API access to the story feed

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::pagination::{Cursor, PageAssembler};
use crate::types::ItemId;

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    assembler: Arc<PageAssembler>,
}

/// Query string of `/api/stories`
///
/// `pageSize` falls back to the assembler's configured default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoriesQuery {
    start_after_id: Option<ItemId>,
    current_head: Option<ItemId>,
    next_head: Option<ItemId>,
    search_query: Option<String>,
    page_size: Option<usize>,
}

impl StoriesQuery {
    fn into_cursor(self, default_page_size: usize) -> Cursor {
        Cursor {
            start_after_id: self.start_after_id,
            current_head: self.current_head,
            next_head: self.next_head,
            search_query: self.search_query,
            page_size: self.page_size.unwrap_or(default_page_size),
        }
    }
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Build the API router
pub fn router(assembler: Arc<PageAssembler>) -> Router {
    let state = AppState { assembler };

    // The feed UI is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/stories", get(get_stories))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
///
/// Expired cache entries are purged every `purge_interval` while serving.
pub async fn serve(
    assembler: Arc<PageAssembler>,
    port: u16,
    purge_interval: Duration,
) -> Result<()> {
    let purge_task = assembler.cache().clone().spawn_purge_task(purge_interval);
    let app = router(assembler);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    let served = axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")));
    purge_task.abort();
    served
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// One page of stories for the cursor in the query string
async fn get_stories(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<StoriesQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(rejection.body_text())),
            )
                .into_response();
        }
    };

    let cursor = query.into_cursor(state.assembler.default_page_size());
    match state.assembler.get_page(&cursor).await {
        Ok(page) => (StatusCode::OK, Json(ApiResponse::success(page))).into_response(),
        Err(e) => {
            let status = error_status(&e);
            if status.is_server_error() {
                warn!(error = %e, "Failed to assemble page");
            }
            (status, Json(ApiResponse::<()>::error(e.to_string()))).into_response()
        }
    }
}

/// HTTP status for a failed page request
fn error_status(err: &Error) -> StatusCode {
    if matches!(err, Error::InvalidCursor { .. }) {
        StatusCode::BAD_REQUEST
    } else if err.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
