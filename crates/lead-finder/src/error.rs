use crate::config::ConfigError;
use crate::leads::{ArtifactError, ExportError, SearchError, SearchErrorKind};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Search(SearchError),
    /// A search that ran to completion and ended in the error state.
    SearchFailed { kind: SearchErrorKind, message: String },
    Export(ExportError),
    Artifact(ArtifactError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Search(err) => search_status(err.kind()),
            AppError::SearchFailed { kind, .. } => search_status(*kind),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Export(_)
            | AppError::Artifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn search_status(kind: SearchErrorKind) -> StatusCode {
    match kind {
        SearchErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        SearchErrorKind::Network | SearchErrorKind::Parse => StatusCode::BAD_GATEWAY,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            AppError::Io(err) => write!(f, "io error: {err}"),
            AppError::Search(err) => write!(f, "search error: {err}"),
            AppError::SearchFailed { message, .. } => write!(f, "search failed: {message}"),
            AppError::Export(err) => write!(f, "export error: {err}"),
            AppError::Artifact(err) => write!(f, "artifact error: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Search(err) => Some(err),
            AppError::SearchFailed { .. } => None,
            AppError::Export(err) => Some(err),
            AppError::Artifact(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SearchError> for AppError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<ArtifactError> for AppError {
    fn from(value: ArtifactError) -> Self {
        Self::Artifact(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_map_to_client_and_gateway_statuses() {
        assert_eq!(
            AppError::from(SearchError::Validation).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let network = SearchError::Network {
            status: Some(503),
            detail: "upstream returned 503".to_string(),
        };
        assert_eq!(AppError::from(network).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::from(SearchError::Cancelled).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn local_failures_are_internal_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = AppError::from(ExportError::from(io));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("export error:"));
    }
}
