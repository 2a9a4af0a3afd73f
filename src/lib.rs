//! Chat Room Broadcast Server Library
//!
//! An HTTP service where clients create named rooms, join them with a
//! callback URL, and post messages that are relayed to every other member
//! of the room by an outbound `POST` to their callback.
//!
//! # Features
//! - Room creation with sequential, never-reused identifiers
//! - Unique room names among live rooms
//! - Join/leave by member tag
//! - Concurrent best-effort fan-out with a per-recipient timeout
//!
//! # Architecture
//! - `ChatRoomStore` is a handle to an actor task that owns all rooms;
//!   structural changes go through its `mpsc` channel one at a time
//! - Each `ChatRoom` guards its own membership with a lock
//! - `Broadcaster` snapshots recipients and spawns one delivery task each
//! - `RoomStore` and `Room` are the capability traits the HTTP handlers use
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use chat_broadcast_server::{router, AppState, Broadcaster, ChatRoomStore, HttpNotifier};
//!
//! #[tokio::main]
//! async fn main() {
//!     let timeout = Duration::from_secs(5);
//!     let notifier = HttpNotifier::new(timeout).unwrap();
//!     let broadcaster = Broadcaster::new(Arc::new(notifier), timeout);
//!     let store = ChatRoomStore::spawn(broadcaster);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     axum::serve(listener, router(AppState::new(Arc::new(store)))).await.unwrap();
//! }
//! ```

pub mod broadcast;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod notifier;
pub mod room;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use broadcast::{BroadcastHandle, BroadcastReport, Broadcaster, Recipient, StatsSnapshot};
pub use config::Config;
pub use error::{AppError, ConfigError, DeliveryError};
pub use handler::{router, AppState};
pub use message::{ErrorCode, ErrorResponse};
pub use notifier::{HttpNotifier, Notifier};
pub use room::{ChatRoom, Room, RoomMetadata};
pub use store::{ChatRoomStore, RoomStore};
pub use types::{BroadcastId, RoomId};
