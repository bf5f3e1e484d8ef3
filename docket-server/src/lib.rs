//! HTTP API for Docket.
//!
//! Exposes `POST /api/products`, which runs the creation pipeline on the
//! JSON body and answers with the stored document or the mapped error.

mod product;

pub use product::Product;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use docket_codec::{Codec, CodecResult};
use docket_pipeline::{Pipeline, PipelineConfig};
use docket_query::{Database, LocalErrorKind, QueryError, TransportErrorKind};
use docket_types::WireValue;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state of the HTTP API.
pub struct AppState {
    pipeline: Pipeline<Arc<dyn Database>, Product>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, config: PipelineConfig) -> CodecResult<Self> {
        Ok(Self {
            pipeline: Pipeline::new(db, config)?,
        })
    }

    pub fn pipeline(&self) -> &Pipeline<Arc<dyn Database>, Product> {
        &self.pipeline
    }
}

/// HTTP status for a failed query.
pub fn status_for(error: &QueryError) -> StatusCode {
    match error {
        QueryError::Transport { kind, .. } => match kind {
            TransportErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            TransportErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            TransportErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            TransportErrorKind::NotFound => StatusCode::NOT_FOUND,
            TransportErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            TransportErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            TransportErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        },
        QueryError::Local { kind, .. } => match kind {
            LocalErrorKind::InvalidValue | LocalErrorKind::UnknownError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    }
}

async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let input = WireValue::from(body);
    match state.pipeline.create_persisted_entity(&input).await {
        Ok(document) => {
            info!(reference = %document.reference(), "product created");
            let encoded = state.pipeline.document_codec().encode(&document);
            (StatusCode::OK, Json(encoded.to_json())).into_response()
        }
        Err(error) => {
            let status = status_for(&error);
            warn!(status = status.as_u16(), error = %error, "product creation failed");
            (status, Json(error)).into_response()
        }
    }
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/products", post(create_product_handler))
        .with_state(state)
}
