//! Room store
//!
//! `StoreActor` owns every room and the identifier counter. It processes
//! commands one at a time from an mpsc channel, so room creation, deletion
//! and lookup are serialized without locks. `ChatRoomStore` is the
//! cloneable handle the request surface talks to.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::broadcast::Broadcaster;
use crate::error::AppError;
use crate::room::{ChatRoom, Room, RoomMetadata};
use crate::types::RoomId;

/// Channel buffer size for store commands
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Room registry capability used by the request surface
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Create an empty room, failing with `DuplicateName` if a live room
    /// already uses `name`
    async fn create_room(&self, name: String) -> Result<RoomId, AppError>;

    /// Metadata of every live room, ordered by ascending identifier
    async fn list_rooms(&self) -> Result<Vec<RoomMetadata>, AppError>;

    /// Look up a live room
    ///
    /// The handle is meant to be held for the duration of one operation.
    async fn get_room(&self, room_id: RoomId) -> Result<Arc<dyn Room>, AppError>;

    /// Remove a room together with its membership
    async fn delete_room(&self, room_id: RoomId) -> Result<(), AppError>;

    /// Number of live rooms
    async fn room_count(&self) -> Result<usize, AppError>;
}

/// Commands sent from `ChatRoomStore` handles to the actor
#[derive(Debug)]
pub enum StoreCommand {
    CreateRoom {
        name: String,
        reply: oneshot::Sender<Result<RoomId, AppError>>,
    },
    ListRooms {
        reply: oneshot::Sender<Vec<RoomMetadata>>,
    },
    GetRoom {
        room_id: RoomId,
        reply: oneshot::Sender<Result<Arc<ChatRoom>, AppError>>,
    },
    DeleteRoom {
        room_id: RoomId,
        reply: oneshot::Sender<Result<(), AppError>>,
    },
    RoomCount {
        reply: oneshot::Sender<usize>,
    },
}

/// The store actor
///
/// Rooms are kept in a `BTreeMap` so listing is ordered by identifier.
pub struct StoreActor {
    /// Identifier for the next created room; never decreases
    next_id: RoomId,
    /// All live rooms: RoomId -> ChatRoom
    rooms: BTreeMap<RoomId, Arc<ChatRoom>>,
    /// Handed to every room for message fan-out
    broadcaster: Broadcaster,
    /// Command receiver channel
    receiver: mpsc::Receiver<StoreCommand>,
}

impl StoreActor {
    /// Create a new actor with the given command receiver
    pub fn new(broadcaster: Broadcaster, receiver: mpsc::Receiver<StoreCommand>) -> Self {
        Self {
            next_id: RoomId(0),
            rooms: BTreeMap::new(),
            broadcaster,
            receiver,
        }
    }

    /// Run the store event loop
    ///
    /// Continuously receives and processes commands until all handles are dropped.
    pub async fn run(mut self) {
        info!("Room store started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("Room store shutting down with {} room(s)", self.rooms.len());
    }

    /// Process a single command
    ///
    /// A caller that went away before the reply is simply ignored.
    fn handle_command(&mut self, cmd: StoreCommand) {
        match cmd {
            StoreCommand::CreateRoom { name, reply } => {
                let _ = reply.send(self.handle_create_room(name));
            }
            StoreCommand::ListRooms { reply } => {
                let _ = reply.send(self.handle_list_rooms());
            }
            StoreCommand::GetRoom { room_id, reply } => {
                let _ = reply.send(self.handle_get_room(room_id));
            }
            StoreCommand::DeleteRoom { room_id, reply } => {
                let _ = reply.send(self.handle_delete_room(room_id));
            }
            StoreCommand::RoomCount { reply } => {
                let _ = reply.send(self.rooms.len());
            }
        }
    }

    /// Handle room creation
    fn handle_create_room(&mut self, name: String) -> Result<RoomId, AppError> {
        if self.rooms.values().any(|room| room.name() == name) {
            return Err(AppError::DuplicateName(name));
        }

        let room_id = self.next_id;
        self.next_id = room_id.next();

        let room = ChatRoom::new(room_id, name, self.broadcaster.clone());
        info!("Created room {} ({})", room_id, room.name());
        self.rooms.insert(room_id, Arc::new(room));

        debug!("Total rooms: {}", self.rooms.len());
        Ok(room_id)
    }

    /// Handle room listing
    fn handle_list_rooms(&self) -> Vec<RoomMetadata> {
        self.rooms.values().map(|room| room.metadata()).collect()
    }

    /// Handle room lookup
    fn handle_get_room(&self, room_id: RoomId) -> Result<Arc<ChatRoom>, AppError> {
        self.rooms
            .get(&room_id)
            .cloned()
            .ok_or(AppError::RoomNotFound(room_id))
    }

    /// Handle room deletion
    ///
    /// Members are not notified; their registrations go away with the room.
    fn handle_delete_room(&mut self, room_id: RoomId) -> Result<(), AppError> {
        let room = self
            .rooms
            .remove(&room_id)
            .ok_or(AppError::RoomNotFound(room_id))?;

        info!("Deleted room {} ({})", room_id, room.name());
        debug!("Total rooms: {}", self.rooms.len());
        Ok(())
    }
}

/// Handle to the store actor
#[derive(Debug, Clone)]
pub struct ChatRoomStore {
    sender: mpsc::Sender<StoreCommand>,
}

impl ChatRoomStore {
    /// Spawn a store actor on the current runtime and return its handle
    ///
    /// The actor stops once every handle has been dropped.
    pub fn spawn(broadcaster: Broadcaster) -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        tokio::spawn(StoreActor::new(broadcaster, receiver).run());
        Self { sender }
    }

    /// Send a command and wait for the actor's reply
    async fn request<T, F>(&self, make_command: F) -> Result<T, AppError>
    where
        F: FnOnce(oneshot::Sender<T>) -> StoreCommand,
    {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make_command(reply))
            .await
            .map_err(|_| AppError::StoreUnavailable)?;
        response.await.map_err(|_| AppError::StoreUnavailable)
    }
}

#[async_trait]
impl RoomStore for ChatRoomStore {
    async fn create_room(&self, name: String) -> Result<RoomId, AppError> {
        self.request(|reply| StoreCommand::CreateRoom { name, reply })
            .await?
    }

    async fn list_rooms(&self) -> Result<Vec<RoomMetadata>, AppError> {
        self.request(|reply| StoreCommand::ListRooms { reply }).await
    }

    async fn get_room(&self, room_id: RoomId) -> Result<Arc<dyn Room>, AppError> {
        let room = self
            .request(|reply| StoreCommand::GetRoom { room_id, reply })
            .await??;
        Ok(room)
    }

    async fn delete_room(&self, room_id: RoomId) -> Result<(), AppError> {
        self.request(|reply| StoreCommand::DeleteRoom { room_id, reply })
            .await?
    }

    async fn room_count(&self) -> Result<usize, AppError> {
        self.request(|reply| StoreCommand::RoomCount { reply }).await
    }
}
