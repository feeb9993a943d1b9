use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use petdeck_catalog::CatalogError;
use petdeck_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Type(_)
        | StoreError::PathEscape(_)
        | StoreError::UnsupportedMediaType(_)
        | StoreError::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Io(_) | StoreError::Walk(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::Unauthorized) => StatusCode::UNAUTHORIZED,
            Self::Catalog(CatalogError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::Catalog(CatalogError::Type(_)) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::Store(err)) => store_status(err),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = if status.is_server_error() {
            tracing::error!("request failed: {self}");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petdeck_types::TypeError;

    fn status(err: impl Into<CatalogError>) -> StatusCode {
        ServerError::Catalog(err.into()).status_code()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status(CatalogError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status(CatalogError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status(TypeError::InvalidName("..".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(TypeError::InvalidLevel { level: 9, max: 6 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(StoreError::PathEscape("/etc".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(StoreError::PayloadTooLarge { size: 9, max: 1 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(StoreError::UnsupportedMediaType("text/plain".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(StoreError::Conflict("cat".into())), StatusCode::CONFLICT);
        assert_eq!(status(StoreError::NotFound("cat".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status(StoreError::Io(std::io::Error::other("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_detail() {
        let response = ServerError::Internal("secret path".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
