//! Error types for the room layer.

use bingo_protocol::SessionId;

/// Errors that can occur during session operations.
///
/// The first three are game-rule rejections. Their `Display` text is what
/// the requesting client sees in its `error_message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Both seats are taken.
    #[error("Room is full. Wait for a slot.")]
    RoomFull,

    /// A number was called by someone other than the turn-holder.
    #[error("Not your turn!")]
    NotYourTurn,

    /// A round cannot start without two seated players.
    #[error("Waiting for an opponent before the game can restart.")]
    RoomNotReady,

    /// No session with this id is registered.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The session's actor has stopped or its command channel closed.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),
}
