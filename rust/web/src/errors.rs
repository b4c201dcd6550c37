//! HTTP error formatting for the table-lifecycle endpoints.

use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

use crate::session::StoreError;

/// Standard error body for the administrative endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

pub fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: error.to_string(),
        message: message.into(),
    };
    reply::with_status(reply::json(&body), status).into_response()
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::TableNotFound => StatusCode::NOT_FOUND,
            StoreError::NotHost => StatusCode::FORBIDDEN,
            StoreError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StoreError::NotMultiplayer | StoreError::TableEnded | StoreError::TableFull => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::TableNotFound => "table_not_found",
            StoreError::NotMultiplayer => "not_multiplayer",
            StoreError::TableEnded => "table_ended",
            StoreError::TableFull => "table_full",
            StoreError::NotHost => "not_host",
            StoreError::Engine(_) => "engine_error",
        }
    }

    pub fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "table endpoint failure");
        }
        error_response(self.status_code(), self.error_code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_http_statuses() {
        assert_eq!(
            StoreError::TableNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(StoreError::NotHost.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(StoreError::TableFull.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            StoreError::Engine("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_bodies_serialize_code_and_message() {
        let body = ErrorBody {
            error: "table_full".into(),
            message: "table is full".into(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"], "table_full");
        assert_eq!(value["message"], "table is full");
    }
}
