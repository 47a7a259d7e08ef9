//! Mapping of core errors onto HTTP responses

use cardforge_core::CardError;
use hyper::StatusCode;
use serde_json::json;
use tracing::error;

use crate::api::{JsonResponse, json_response};

#[derive(Debug)]
pub enum ApiError {
    Card(CardError),
    /// Malformed request: unreadable body or a missing parameter
    BadRequest { field: &'static str, message: String },
    PayloadTooLarge,
    RouteNotFound,
}

impl From<CardError> for ApiError {
    fn from(err: CardError) -> Self {
        ApiError::Card(err)
    }
}

impl ApiError {
    pub fn bad_body(err: impl std::fmt::Display) -> Self {
        ApiError::BadRequest {
            field: "body",
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Card(CardError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Card(CardError::Validation { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Card(CardError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn into_response(self) -> JsonResponse {
        let status = self.status();
        let body = match &self {
            ApiError::Card(CardError::Validation { field, message }) => {
                json!({ "error": message, "field": field })
            }
            ApiError::Card(CardError::Storage(err)) => {
                error!(error = %err, "storage failure");
                json!({ "error": "internal storage error" })
            }
            ApiError::Card(err) => json!({ "error": err.to_string() }),
            ApiError::BadRequest { field, message } => json!({ "error": message, "field": field }),
            ApiError::PayloadTooLarge => json!({ "error": "request body too large" }),
            ApiError::RouteNotFound => json!({ "error": "route not found" }),
        };
        json_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(CardError::not_found("card", "x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CardError::validation("actorIndex", "bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CardError::Storage(anyhow::anyhow!("disk"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::bad_body("eof").status(), StatusCode::BAD_REQUEST);
    }
}
