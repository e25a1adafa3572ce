//! Identities and wire events.
//!
//! Every frame on the wire is one JSON object of the form
//! `{"event": "<name>", "data": {...}}`. The event names are the ones the
//! browser client already speaks (`join_game`, `number_marked`, ...).

use std::fmt;

use bingo_transport::ConnectionId;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Highest number that can be called; boards hold `1..=HIGHEST_NUMBER`.
pub const HIGHEST_NUMBER: u8 = 25;

/// Session joined when a `join_game` names no room.
pub const DEFAULT_SESSION: &str = "bingo_room";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A seated player's identity.
///
/// Derived one-to-one from the connection that joined, so it is opaque to
/// clients and never reused while the process runs. Serializes as a plain
/// number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

impl From<ConnectionId> for PlayerId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

/// Name of a session (a room two players share).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION)
    }
}

impl From<&str> for SessionId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who an outbound message is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every player seated in the session.
    All,
    /// One player only (private boards, scores, errors).
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Intents a client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Take a seat. `room` defaults to [`DEFAULT_SESSION`].
    JoinGame {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<SessionId>,
    },

    /// Call a number on the caller's turn.
    MakeMove { number: u8 },

    /// Deal fresh boards and restart the round.
    ResetGame,
}

impl ClientMessage {
    /// Boundary checks that must pass before a message reaches a session.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] for a blank name or a number
    /// outside `1..=HIGHEST_NUMBER`.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::JoinGame { name, .. } if name.trim().is_empty() => Err(
                ProtocolError::InvalidMessage("name must not be empty".into()),
            ),
            Self::MakeMove { number } if !(1..=HIGHEST_NUMBER).contains(number) => {
                Err(ProtocolError::InvalidMessage(format!(
                    "number must be between 1 and {HIGHEST_NUMBER}"
                )))
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// One entry of the seated-players list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub id: PlayerId,
}

/// Events the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A rejected request; only the requester gets it.
    ErrorMessage { msg: String },

    /// The seated players, in join order.
    PlayerJoined { players: Vec<PlayerSummary> },

    /// Round start. Carries the recipient's own board only.
    GameStart {
        board: Vec<u8>,
        opponent: String,
        turn: PlayerId,
        your_id: PlayerId,
    },

    /// A number was called; `turn` is the new turn-holder.
    NumberMarked {
        number: u8,
        turn: PlayerId,
        marked_numbers: Vec<u8>,
    },

    /// Line counts from the recipient's point of view.
    ScoreUpdate {
        your_lines: usize,
        opponent_lines: usize,
    },

    GameOver { winner: String },

    PlayerLeft { name: String },
}

impl ServerMessage {
    /// Shorthand for an [`ServerMessage::ErrorMessage`].
    pub fn error(msg: impl Into<String>) -> Self {
        Self::ErrorMessage { msg: msg.into() }
    }
}
