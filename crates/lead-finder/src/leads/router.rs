use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::controller::{Resolution, SearchErrorKind, SearchState};
use super::export::{ExportOutcome, ExportProfile};
use super::session::LeadSession;
use super::source::LeadSource;
use crate::error::AppError;

/// Router builder exposing one lead search session over HTTP.
pub fn lead_router<S: LeadSource>(session: Arc<LeadSession<S>>) -> Router {
    Router::new()
        .route("/api/v1/leads", get(current_handler::<S>))
        .route("/api/v1/leads/search", post(search_handler::<S>))
        .route("/api/v1/leads/dismiss", post(dismiss_handler::<S>))
        .route("/api/v1/leads/export", get(export_handler::<S>))
        .with_state(session)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub profile: Option<String>,
}

pub(crate) async fn search_handler<S: LeadSource>(
    State(session): State<Arc<LeadSession<S>>>,
    Json(request): Json<SearchRequest>,
) -> Response {
    let report = session.search(&request.location).await;
    let status = match (report.resolution, &report.snapshot.state) {
        (Resolution::Stale, _) => StatusCode::CONFLICT,
        (
            _,
            SearchState::Error {
                kind: SearchErrorKind::Validation,
                ..
            },
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        (_, SearchState::Error { .. }) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };

    (status, Json(report.snapshot.view())).into_response()
}

pub(crate) async fn current_handler<S: LeadSource>(
    State(session): State<Arc<LeadSession<S>>>,
) -> Response {
    let snapshot = session.snapshot();
    (StatusCode::OK, Json(snapshot.view())).into_response()
}

pub(crate) async fn dismiss_handler<S: LeadSource>(
    State(session): State<Arc<LeadSession<S>>>,
) -> Response {
    let snapshot = session.dismiss();
    (StatusCode::OK, Json(snapshot.view())).into_response()
}

pub(crate) async fn export_handler<S: LeadSource>(
    State(session): State<Arc<LeadSession<S>>>,
    Query(query): Query<ExportQuery>,
) -> Response {
    let profile = match query.profile.as_deref() {
        None => None,
        Some(label) => match ExportProfile::parse(label) {
            Some(profile) => Some(profile),
            None => {
                let payload = json!({
                    "error": format!("unknown export profile '{label}'"),
                });
                return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
            }
        },
    };

    match session.export(profile) {
        Ok(ExportOutcome::Ready(artifact)) => {
            let disposition = content_disposition(&artifact.filename);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                artifact.bytes,
            )
                .into_response()
        }
        Ok(ExportOutcome::Skipped) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

/// ASCII `filename` for older clients plus an RFC 5987 `filename*`.
fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}
