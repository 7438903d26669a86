use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Core(#[from] vp_core::Error),
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        use vp_core::Error as E;
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Core(E::InvalidValue(_)) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Core(E::Configuration(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
            AppError::Core(E::Provider { .. }) | AppError::Core(E::Http(_)) => (StatusCode::BAD_GATEWAY, "provider_error"),
            AppError::Core(E::Storage(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error"),
            AppError::Core(_) => (StatusCode::INTERNAL_SERVER_ERROR, "unexpected_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            error!("❌ {}: {}", kind, self);
        }

        let body = json!({
            "success": false,
            "error": kind,
            "details": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let provider = AppError::from(vp_core::Error::Provider { status: 503, body: "down".to_string() });
        assert_eq!(provider.into_response().status(), StatusCode::BAD_GATEWAY);

        let config = AppError::from(vp_core::Error::Configuration("missing key".to_string()));
        assert_eq!(config.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let invalid = AppError::from(vp_core::Error::InvalidValue("Unknown category: x".to_string()));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
