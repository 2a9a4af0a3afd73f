//! HTTP request handlers
//!
//! Translates the REST surface into store and room calls: each handler
//! resolves the room identifier (and member tag) before delegating, and
//! domain errors become error responses through `AppError`.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::message::{
    ApiJson, ApiPath, CreateRoomRequest, CreateRoomResponse, JoinRoomRequest, PostMessageRequest,
};
use crate::room::{Room, RoomMetadata};
use crate::store::RoomStore;
use crate::types::RoomId;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RoomStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Resolve a room from its raw path segment
    async fn room(&self, raw_room_id: &str) -> Result<Arc<dyn Room>, AppError> {
        let room_id: RoomId = raw_room_id.parse()?;
        self.store.get_room(room_id).await
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/:room_id", delete(delete_room))
        .route("/rooms/:room_id/members", post(join_room))
        .route("/rooms/:room_id/members/:tag", delete(leave_room))
        .route("/rooms/:room_id/members/:tag/messages", post(post_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /rooms
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomMetadata>>, AppError> {
    Ok(Json(state.store.list_rooms().await?))
}

/// POST /rooms
pub async fn create_room(
    State(state): State<AppState>,
    ApiJson(CreateRoomRequest { name }): ApiJson<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    let room_id = state.store.create_room(name).await?;
    Ok(Json(CreateRoomResponse { room_id }))
}

/// DELETE /rooms/{roomId}
pub async fn delete_room(
    State(state): State<AppState>,
    ApiPath(raw_room_id): ApiPath<String>,
) -> Result<(), AppError> {
    let room_id: RoomId = raw_room_id.parse()?;
    state.store.delete_room(room_id).await
}

/// POST /rooms/{roomId}/members
pub async fn join_room(
    State(state): State<AppState>,
    ApiPath(raw_room_id): ApiPath<String>,
    ApiJson(JoinRoomRequest { tag, callback_url }): ApiJson<JoinRoomRequest>,
) -> Result<(), AppError> {
    let room = state.room(&raw_room_id).await?;
    room.join(&tag, &callback_url).await
}

/// DELETE /rooms/{roomId}/members/{tag}
pub async fn leave_room(
    State(state): State<AppState>,
    ApiPath((raw_room_id, tag)): ApiPath<(String, String)>,
) -> Result<(), AppError> {
    let room = state.room(&raw_room_id).await?;
    room.leave(&tag).await
}

/// POST /rooms/{roomId}/members/{tag}/messages
///
/// Responds as soon as the broadcast is dispatched; delivery outcomes are
/// only logged.
pub async fn post_message(
    State(state): State<AppState>,
    ApiPath((raw_room_id, tag)): ApiPath<(String, String)>,
    ApiJson(PostMessageRequest { message }): ApiJson<PostMessageRequest>,
) -> Result<(), AppError> {
    let room = state.room(&raw_room_id).await?;
    let broadcast = room.post_message(&tag, &message).await?;
    info!(
        "Broadcast {} from {} in room {} dispatched to {} member(s)",
        broadcast.id(),
        tag,
        room.metadata().id,
        broadcast.recipient_count()
    );
    broadcast.detach();
    Ok(())
}
