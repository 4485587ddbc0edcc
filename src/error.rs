use thiserror::Error;

use crate::services::content::ProviderError;

/// Errors raised by room coordinator and service layer operations.
///
/// Every variant maps to a single `error{message}` event sent back to the
/// connection that initiated the offending request; none of them mutate room
/// state and none are retried server-side.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No active room is registered under the given code.
    #[error("Room not found")]
    RoomNotFound,
    /// A room with the requested code already exists.
    #[error("Room already exists")]
    RoomExists,
    /// The room left the waiting phase and no longer accepts this action.
    #[error("Game already in progress")]
    GameInProgress,
    /// The room reached its player capacity.
    #[error("Room is full")]
    RoomFull,
    /// A non-host connection attempted a host-only action.
    #[error("Not authorized")]
    Unauthorized,
    /// The content provider failed or returned too few usable rounds.
    #[error("Failed to start game")]
    ContentUnavailable(#[source] ProviderError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<ProviderError> for ServiceError {
    fn from(err: ProviderError) -> Self {
        ServiceError::ContentUnavailable(err)
    }
}
