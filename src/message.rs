//! Message protocol definitions
//!
//! JSON request/response bodies for the HTTP surface, the body posted to
//! member callbacks, and the mapping from `AppError` to error responses.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::AppError;
use crate::types::RoomId;

/// Body of `POST /rooms`
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// Response of `POST /rooms`
#[derive(Debug, Serialize)]
pub struct CreateRoomResponse {
    #[serde(rename = "roomId")]
    pub room_id: RoomId,
}

/// Body of `POST /rooms/{roomId}/members`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub tag: String,
    pub callback_url: String,
}

/// Body of `POST /rooms/{roomId}/members/{tag}/messages`
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub message: String,
}

/// Body posted to each recipient's callback address
#[derive(Debug, Serialize)]
pub struct CallbackBody<'a> {
    pub message: &'a str,
}

/// Error codes for `ErrorResponse`
///
/// Represents the different error scenarios communicated to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Room name already taken by a live room
    DuplicateName,
    /// Non-existent room identifier
    RoomNotFound,
    /// Tag already joined the room
    AlreadyMember,
    /// Tag is not a member of the room
    NotMember,
    /// Malformed identifier or body
    InvalidInput,
    /// Server-side failure
    Internal,
}

impl ErrorCode {
    /// HTTP status used for this code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&AppError> for ErrorCode {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::DuplicateName(_) => ErrorCode::DuplicateName,
            AppError::RoomNotFound(_) => ErrorCode::RoomNotFound,
            AppError::AlreadyMember { .. } => ErrorCode::AlreadyMember,
            AppError::NotMember { .. } | AppError::NotJoined { .. } => ErrorCode::NotMember,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::StoreUnavailable => ErrorCode::Internal,
        }
    }
}

/// Convert AppError to an ErrorResponse for the client
impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse {
            code: err.into(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            debug!("Rejected request: {}", self);
        } else {
            error!("Internal error: {}", self);
        }

        let body = ErrorResponse::from(&self);
        (body.code.status_code(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// JSON body extractor whose rejections surface as `InvalidInput`
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// Path parameter extractor whose rejections surface as `InvalidInput`
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_request_deserialize() {
        let json = r#"{"tag": "alice", "callbackUrl": "http://localhost:6000/inbox"}"#;
        let req: JoinRoomRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.tag, "alice");
        assert_eq!(req.callback_url, "http://localhost:6000/inbox");
    }

    #[test]
    fn test_join_request_requires_callback() {
        let json = r#"{"tag": "alice"}"#;
        assert!(serde_json::from_str::<JoinRoomRequest>(json).is_err());
    }

    #[test]
    fn test_create_room_response_serialize() {
        let json = serde_json::to_string(&CreateRoomResponse { room_id: RoomId(0) }).unwrap();
        assert_eq!(json, r#"{"roomId":0}"#);
    }

    #[test]
    fn test_callback_body_serialize() {
        let json = serde_json::to_string(&CallbackBody { message: "hi" }).unwrap();
        assert_eq!(json, r#"{"message":"hi"}"#);
    }

    #[test]
    fn test_error_response_serialize() {
        let err = AppError::NotJoined {
            tag: "bob".to_string(),
            room_id: RoomId(2),
        };
        let json = serde_json::to_string(&ErrorResponse::from(&err)).unwrap();
        assert!(json.contains(r#""code":"not_member""#));
        assert!(json.contains("hasn't joined chat room 2"));
    }

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::DuplicateName.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::RoomNotFound.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
