//! Chat room definition
//!
//! A room maps member tags to callback addresses and broadcasts posted
//! messages to every member except the sender.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::broadcast::{BroadcastHandle, Broadcaster, Recipient};
use crate::error::AppError;
use crate::types::RoomId;

/// Display metadata of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomMetadata {
    pub id: RoomId,
    pub name: String,
}

/// Room capability used by the request surface
#[async_trait]
pub trait Room: Send + Sync {
    /// Identifier and name of the room
    fn metadata(&self) -> RoomMetadata;

    /// Add `tag` with its callback address
    ///
    /// Fails with `AlreadyMember` if the tag is present; the existing
    /// callback address is kept.
    async fn join(&self, tag: &str, callback_url: &str) -> Result<(), AppError>;

    /// Remove `tag`, failing with `NotMember` if it is absent
    async fn leave(&self, tag: &str) -> Result<(), AppError>;

    /// Whether `tag` is currently a member
    async fn has_joined(&self, tag: &str) -> bool;

    /// Broadcast `message` to every member other than `sender_tag`
    ///
    /// Fails with `NotJoined` if the sender is not a member. Delivery
    /// outcomes never surface here; the returned handle can be awaited or
    /// detached.
    async fn post_message(
        &self,
        sender_tag: &str,
        message: &str,
    ) -> Result<BroadcastHandle, AppError>;

    /// Number of current members
    async fn member_count(&self) -> usize;
}

/// Multi-member chat room
///
/// Membership is guarded by a lock private to this room, so operations on
/// different rooms never contend.
#[derive(Debug)]
pub struct ChatRoom {
    /// Identifier assigned by the store
    id: RoomId,
    /// Room name (unique among live rooms)
    name: String,
    /// Member tag -> callback address
    members: RwLock<HashMap<String, String>>,
    /// Fan-out for posted messages
    broadcaster: Broadcaster,
}

impl ChatRoom {
    /// Create an empty room
    pub fn new(id: RoomId, name: impl Into<String>, broadcaster: Broadcaster) -> Self {
        Self {
            id,
            name: name.into(),
            members: RwLock::new(HashMap::new()),
            broadcaster,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Callback address registered for `tag`
    #[cfg(test)]
    async fn callback_url(&self, tag: &str) -> Option<String> {
        self.members.read().await.get(tag).cloned()
    }

    /// Copy of every member except `sender_tag`
    ///
    /// The sender's membership is checked under the same read guard as the
    /// copy, so a concurrent leave either precedes both or follows both.
    async fn recipients(&self, sender_tag: &str) -> Result<Vec<Recipient>, AppError> {
        let members = self.members.read().await;

        if !members.contains_key(sender_tag) {
            return Err(AppError::NotJoined {
                tag: sender_tag.to_string(),
                room_id: self.id,
            });
        }

        Ok(members
            .iter()
            .filter(|(tag, _)| tag.as_str() != sender_tag)
            .map(|(tag, callback_url)| Recipient {
                tag: tag.clone(),
                callback_url: callback_url.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl Room for ChatRoom {
    fn metadata(&self) -> RoomMetadata {
        RoomMetadata {
            id: self.id,
            name: self.name.clone(),
        }
    }

    async fn join(&self, tag: &str, callback_url: &str) -> Result<(), AppError> {
        let mut members = self.members.write().await;

        if members.contains_key(tag) {
            return Err(AppError::AlreadyMember {
                tag: tag.to_string(),
                room_id: self.id,
            });
        }

        members.insert(tag.to_string(), callback_url.to_string());
        info!("Member {} joined room {} ({})", tag, self.id, self.name);
        debug!("Room {} has {} member(s)", self.id, members.len());
        Ok(())
    }

    async fn leave(&self, tag: &str) -> Result<(), AppError> {
        let mut members = self.members.write().await;

        if members.remove(tag).is_none() {
            return Err(AppError::NotMember {
                tag: tag.to_string(),
                room_id: self.id,
            });
        }

        info!("Member {} left room {} ({})", tag, self.id, self.name);
        debug!("Room {} has {} member(s)", self.id, members.len());
        Ok(())
    }

    async fn has_joined(&self, tag: &str) -> bool {
        self.members.read().await.contains_key(tag)
    }

    async fn post_message(
        &self,
        sender_tag: &str,
        message: &str,
    ) -> Result<BroadcastHandle, AppError> {
        // Snapshot first; the lock is released before any delivery starts
        let recipients = self.recipients(sender_tag).await?;
        debug!(
            "Member {} posted to room {}, {} recipient(s)",
            sender_tag,
            self.id,
            recipients.len()
        );
        Ok(self.broadcaster.dispatch(self.id, recipients, message))
    }

    async fn member_count(&self) -> usize {
        self.members.read().await.len()
    }
}
