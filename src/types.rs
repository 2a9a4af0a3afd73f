//! Basic type definitions for the broadcast server
//!
//! Provides newtype wrappers for type safety:
//! - `RoomId`: sequential, never-reused room identifier
//! - `BroadcastId`: UUID-based identifier correlating the deliveries of one post

use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// Room identifier (newtype pattern)
///
/// Allocated sequentially by the store starting at 0. Serializes as a bare
/// integer so room metadata renders as `{"id":0,"name":"..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl RoomId {
    /// The identifier allocated after this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl FromStr for RoomId {
    type Err = AppError;

    /// Parse a room identifier from a request path segment
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.parse::<u64>().map(Self).map_err(|_| {
            AppError::InvalidInput(format!("chat room ID must be an integer: {:?}", raw))
        })
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique broadcast identifier (newtype pattern)
///
/// Wraps a UUID v4. One is issued per posted message and attached to the
/// tracing span of its fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BroadcastId(pub Uuid);

impl BroadcastId {
    /// Create a new random broadcast ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BroadcastId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BroadcastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
