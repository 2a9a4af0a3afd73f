//! Error types for the broadcast server
//!
//! Defines request-level errors, per-recipient delivery errors and
//! startup configuration errors. Uses thiserror for ergonomic error definitions.

use std::time::Duration;

use thiserror::Error;

use crate::types::RoomId;

/// Application-level errors
///
/// Every variant except `StoreUnavailable` is caused by the client and is
/// reported back verbatim; `StoreUnavailable` is an internal failure.
#[derive(Debug, Error)]
pub enum AppError {
    /// A live room already uses this name
    #[error("cannot create duplicate chat room: {0:?}")]
    DuplicateName(String),

    /// No live room has this identifier
    #[error("chat room does not exist: {0}")]
    RoomNotFound(RoomId),

    /// The tag is already a member of the room
    #[error("{tag:?} already joined chat room {room_id}")]
    AlreadyMember { tag: String, room_id: RoomId },

    /// Leaving with a tag that is not a member
    #[error("{tag:?} is not in chat room {room_id}")]
    NotMember { tag: String, room_id: RoomId },

    /// Posting with a tag that is not a member
    #[error("{tag:?} hasn't joined chat room {room_id}")]
    NotJoined { tag: String, room_id: RoomId },

    /// Malformed identifier or request body
    #[error("{0}")]
    InvalidInput(String),

    /// The store actor is gone (internal)
    #[error("room store is unavailable")]
    StoreUnavailable,
}

impl AppError {
    /// Whether the error was caused by the client request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::StoreUnavailable)
    }
}

/// Delivery errors
///
/// Occur when notifying a single member's callback address. They are
/// recorded against that recipient only and never reach the poster.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Request could not be built or sent (bad address, connection refused, ...)
    #[error("callback request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Callback answered with a non-2xx status
    #[error("callback responded with status {0}")]
    Status(reqwest::StatusCode),

    /// Callback did not answer within the per-recipient timeout
    #[error("callback timed out after {0:?}")]
    Timeout(Duration),

    /// Delivery task ended without producing an outcome
    #[error("delivery task aborted")]
    Aborted,
}

/// Startup configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Callback timeout is not a positive integer of milliseconds
    #[error("invalid callback timeout {0:?}: expected a positive number of milliseconds")]
    InvalidTimeout(String),

    /// The outbound HTTP client could not be built
    #[error("failed to build callback HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AppError::DuplicateName("room0".to_string()).to_string(),
            r#"cannot create duplicate chat room: "room0""#
        );
        assert_eq!(
            AppError::RoomNotFound(RoomId(3)).to_string(),
            "chat room does not exist: 3"
        );
        assert_eq!(
            AppError::AlreadyMember {
                tag: "alice".to_string(),
                room_id: RoomId(0)
            }
            .to_string(),
            r#""alice" already joined chat room 0"#
        );
        assert_eq!(
            AppError::NotJoined {
                tag: "bob".to_string(),
                room_id: RoomId(1)
            }
            .to_string(),
            r#""bob" hasn't joined chat room 1"#
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::RoomNotFound(RoomId(0)).is_client_error());
        assert!(AppError::InvalidInput("bad".to_string()).is_client_error());
        assert!(!AppError::StoreUnavailable.is_client_error());
    }
}
