use crate::rooms::RoomError;
use serde::{Deserialize, Serialize};
use std::fmt;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

/// Standard error envelope for every API endpoint. Errors are returned to
/// the caller only; they are never broadcast to other seats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "room_not_found")
    pub error: String,
    /// Human-readable message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        reply::with_status(reply::json(&self), status).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Maps domain errors onto HTTP responses with severity-appropriate
/// logging: expected validation failures log at debug, faults at error.
pub trait IntoErrorResponse {
    fn status_code(&self) -> StatusCode;
    fn error_code(&self) -> &'static str;
    fn error_message(&self) -> String;

    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code();
        let body = ErrorResponse::new(self.error_code(), self.error_message());
        if status.is_server_error() {
            tracing::error!(error = %body, "request failed with server error");
        } else {
            tracing::debug!(error = %body, "request rejected");
        }
        body.into_response(status)
    }
}

impl IntoErrorResponse for RoomError {
    fn status_code(&self) -> StatusCode {
        match self {
            RoomError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            RoomError::RoomFull
            | RoomError::DuplicateUsername(_)
            | RoomError::NotJoinable
            | RoomError::MatchNotStarted => StatusCode::CONFLICT,
            RoomError::NotInRoom(_) => StatusCode::FORBIDDEN,
            RoomError::InvalidUsername | RoomError::Game(_) => StatusCode::BAD_REQUEST,
            RoomError::CodeSpaceExhausted => StatusCode::SERVICE_UNAVAILABLE,
            RoomError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RoomError::RoomNotFound(_) => "room_not_found",
            RoomError::RoomFull => "room_full",
            RoomError::DuplicateUsername(_) => "duplicate_username",
            RoomError::NotInRoom(_) => "not_in_room",
            RoomError::InvalidUsername => "invalid_username",
            RoomError::NotJoinable => "room_not_joinable",
            RoomError::MatchNotStarted => "match_not_started",
            RoomError::CodeSpaceExhausted => "room_codes_exhausted",
            RoomError::Game(_) => "invalid_action",
            RoomError::Internal(_) => "internal_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jokerdraw_engine::errors::GameError;

    #[test]
    fn validation_errors_map_to_client_statuses() {
        let err = RoomError::Game(GameError::NotPlayersTurn {
            expected: 0,
            actual: 1,
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "invalid_action");
        assert!(err.error_message().contains("turn"));

        assert_eq!(
            RoomError::RoomNotFound("XXXXXX".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(RoomError::RoomFull.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_faults_map_to_server_statuses() {
        let err = RoomError::Internal("contract violated".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            RoomError::CodeSpaceExhausted.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
