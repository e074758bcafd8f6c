use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use super::AppState;
use crate::sync::{ExportRequest, ImportRequest, PreviewRequest, SyncError};

/// Body returned for rejected requests and failed pipelines.
#[derive(Debug, Serialize)]
struct FailureBody {
    success: bool,
    message: String,
    errors: Vec<String>,
}

fn failure(status: StatusCode, message: String) -> Response {
    let body = FailureBody {
        success: false,
        errors: vec![message.clone()],
        message,
    };
    (status, Json(body)).into_response()
}

/// Map a pipeline outcome to a response.
///
/// Business outcomes, including aborted imports, are always 200; only bad
/// requests and pipeline failures use other status codes.
fn respond<T: Serialize>(operation: &str, outcome: Result<T, SyncError>) -> Response {
    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) if err.is_client_error() => failure(StatusCode::BAD_REQUEST, err.to_string()),
        Err(err) => {
            error!("❌ {} failed: {}", operation, err);
            failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn import(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    respond("Import", state.service.import(&request, None).await)
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    respond("Export", state.service.export(&request, None).await)
}

pub async fn preview(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    respond("Preview", state.service.preview(&request, None).await)
}
