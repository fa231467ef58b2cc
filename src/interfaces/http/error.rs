use crate::error::MarketError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

impl MarketError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MarketError::Validation(_) | MarketError::Conflict(_) => StatusCode::BAD_REQUEST,
            MarketError::Unauthorized => StatusCode::UNAUTHORIZED,
            MarketError::Forbidden => StatusCode::FORBIDDEN,
            MarketError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client sees. Source errors stay in the logs. `Internal`
    /// messages pass through, so request paths log the cause and keep it out.
    fn public_message(&self) -> String {
        match self {
            MarketError::Internal(message) => message.clone(),
            MarketError::Validation(_)
            | MarketError::Conflict(_)
            | MarketError::Unauthorized
            | MarketError::Forbidden
            | MarketError::NotFound(_) => self.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

/// Every failure leaves as `{"error": "<message>"}`.
impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
