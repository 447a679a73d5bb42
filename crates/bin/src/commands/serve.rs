//! Serve command - runs the docstash HTTP server.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path as UrlPath, Request, State},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tokio::signal::unix::{SignalKind, signal};

use docstash::{
    Doc, DocStore, Error, Path, Value,
    backend::{Gateway, InMemory, JsonFile},
    doc::PathError,
    store::{StoreError, UpdateKind},
};

use super::health::{HEALTH_PATH, HealthReport};
use crate::cli::ServeArgs;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<DocStore>,
}

/// Run the docstash server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let gateway: Arc<dyn Gateway> = if args.ephemeral {
        tracing::warn!("Running with an in-memory document; nothing will be saved to disk");
        Arc::new(InMemory::new())
    } else {
        Arc::new(JsonFile::new(&args.data_file))
    };
    let store = Arc::new(DocStore::open(gateway).await?);

    let app = router(store);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tracing::info!("Listening on {local_addr}");
    println!("docstash running at http://localhost:{}", local_addr.port());
    println!();
    println!("Available endpoints:");
    println!("  GET    /            - Whole document");
    println!("  POST   /            - Merge a mapping into the root");
    println!("  GET    /a/b         - Value at a path");
    println!("  PATCH  /a/b         - Set or merge a mapping at a path (POST also accepted)");
    println!("  DELETE /a/b         - Remove the entry at a path");
    println!("  GET    {HEALTH_PATH}     - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}

/// Builds the HTTP routes over `store`.
///
/// Only `GET` on the health route is taken by the health check; every other
/// method on it addresses the document key of the same name.
pub(crate) fn router(store: Arc<DocStore>) -> Router {
    Router::new()
        .route(
            "/",
            get(handle_read_all)
                .post(handle_write)
                .delete(handle_delete_root),
        )
        .route(
            HEALTH_PATH,
            get(handle_health)
                .post(handle_update_health_key)
                .patch(handle_update_health_key)
                .delete(handle_delete_health_key),
        )
        .route(
            "/{*path}",
            get(handle_get_path)
                .post(handle_update_path)
                .patch(handle_update_path)
                .delete(handle_delete_path),
        )
        .method_not_allowed_fallback(handle_method_not_allowed)
        .with_state(AppState { store })
}

// ============================================================================
// Responses
// ============================================================================

/// Serializes `T` as the response body with the given status.
struct JsonReply<T>(StatusCode, T);

impl<T: Serialize> JsonReply<T> {
    fn ok(body: T) -> Self {
        Self(StatusCode::OK, body)
    }
}

impl<T: Serialize> IntoResponse for JsonReply<T> {
    fn into_response(self) -> Response {
        let Self(status, body) = self;
        match serde_json::to_vec(&body) {
            Ok(bytes) => {
                let content_type = [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)];
                (status, content_type, bytes).into_response()
            }
            Err(e) => {
                tracing::error!("Failed to encode response body: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(Serialize)]
struct WriteResponse {
    status: &'static str,
    size: usize,
}

#[derive(Serialize)]
struct PathResponse {
    status: &'static str,
    path: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// An error response: a status code and an `{"error": ...}` body.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::Path(_) => Self::new(StatusCode::BAD_REQUEST, "missing key"),
            Error::Store(StoreError::MalformedInput { .. }) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid JSON")
            }
            Error::Store(mismatch @ StoreError::ShapeMismatch { .. }) => {
                Self::new(StatusCode::BAD_REQUEST, mismatch.to_string())
            }
            Error::Store(StoreError::KeyNotFound { .. }) => {
                Self::new(StatusCode::NOT_FOUND, "key not found")
            }
            Error::Store(StoreError::PathNotFound { .. }) => {
                Self::new(StatusCode::NOT_FOUND, "path not found")
            }
            Error::Backend(_) => Self::internal("failed to persist document"),
            other => {
                tracing::error!("Unhandled error from {}: {other}", other.module());
                Self::internal("internal error")
            }
        }
    }
}

impl From<PathError> for ApiError {
    fn from(err: PathError) -> Self {
        Error::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
        };
        JsonReply(self.status, body).into_response()
    }
}

type ApiResult<T> = Result<JsonReply<T>, ApiError>;

// ============================================================================
// Extractors
// ============================================================================

/// The store path named by the decoded wildcard capture.
struct DocPath(Path);

impl<S: Send + Sync> FromRequestParts<S> for DocPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let UrlPath(raw) = UrlPath::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("Rejected request path: {rejection}");
                ApiError::new(StatusCode::BAD_REQUEST, "invalid path")
            })?;
        Ok(Self(Path::parse(&raw)?))
    }
}

/// A request body parsed as any JSON value.
struct JsonBody(Value);

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))?;
        Ok(Self(Value::from_json_slice(&body)?))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for GET / - the whole document
async fn handle_read_all(State(state): State<AppState>) -> JsonReply<Doc> {
    JsonReply::ok(state.store.read_all().await)
}

/// Handler for POST / - merge a mapping, or store any other value under a generated key
async fn handle_write(
    State(state): State<AppState>,
    JsonBody(value): JsonBody,
) -> ApiResult<WriteResponse> {
    let size = state.store.merge_at_root(value).await?;
    Ok(JsonReply::ok(WriteResponse { status: "ok", size }))
}

/// Handler for DELETE / - there is no key to delete
async fn handle_delete_root() -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "missing key")
}

/// Handler for GET /a/b - the value at a path
async fn handle_get_path(
    State(state): State<AppState>,
    DocPath(path): DocPath,
) -> ApiResult<Value> {
    Ok(JsonReply::ok(state.store.get_at_path(&path).await?))
}

/// Handler for PATCH or POST /a/b - set or shallow-merge a mapping at a path
async fn handle_update_path(
    State(state): State<AppState>,
    DocPath(path): DocPath,
    JsonBody(value): JsonBody,
) -> ApiResult<PathResponse> {
    update_at(&state, &path, value).await
}

/// Handler for DELETE /a/b - remove the entry at a path
async fn handle_delete_path(
    State(state): State<AppState>,
    DocPath(path): DocPath,
) -> ApiResult<PathResponse> {
    delete_at(&state, &path).await
}

/// Handler for PATCH or POST /_health - the document key, not the health check
async fn handle_update_health_key(
    State(state): State<AppState>,
    JsonBody(value): JsonBody,
) -> ApiResult<PathResponse> {
    update_at(&state, &Path::parse(HEALTH_PATH)?, value).await
}

/// Handler for DELETE /_health - the document key, not the health check
async fn handle_delete_health_key(State(state): State<AppState>) -> ApiResult<PathResponse> {
    delete_at(&state, &Path::parse(HEALTH_PATH)?).await
}

/// Handler for GET /_health
async fn handle_health(State(state): State<AppState>) -> JsonReply<HealthReport> {
    JsonReply::ok(HealthReport::healthy(state.store.len().await))
}

/// Fallback for a known route hit with an unsupported method
async fn handle_method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

async fn update_at(state: &AppState, path: &Path, value: Value) -> ApiResult<PathResponse> {
    let updated = state.store.set_or_merge_at_path(path, value).await?;
    let status = match updated.kind {
        UpdateKind::Created => "updated",
        UpdateKind::Merged => "partial update",
    };
    Ok(JsonReply::ok(PathResponse {
        status,
        path: updated.path,
    }))
}

async fn delete_at(state: &AppState, path: &Path) -> ApiResult<PathResponse> {
    let removed = state.store.delete_at_path(path).await?;
    Ok(JsonReply::ok(PathResponse {
        status: "deleted",
        path: removed,
    }))
}
