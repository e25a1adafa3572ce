//! Session configuration and lifecycle status.

use serde::{Deserialize, Serialize};

/// Seats per session. Bingo here is strictly head-to-head.
pub const MAX_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every session the registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Completed lines needed to win a round.
    pub win_lines: usize,

    /// Capacity of each session actor's command channel. When full,
    /// callers wait (backpressure) instead of queueing without bound.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            win_lines: 5,
            command_buffer: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle.
///
/// ```text
///            second join / reset            line count ≥ win_lines
/// Waiting ─────────────────────────→ Playing ────────────────────→ Finished
///    ↑                                  ↑                             │
///    │                                  └────────── reset ────────────┤
///    └──────────────────── any player disconnects ────────────────────┘
/// ```
///
/// - **Waiting**: zero or one player seated, nothing called yet.
/// - **Playing**: both seats taken, turns alternate.
/// - **Finished**: someone won; the board stays visible until a reset or
///   a departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Waiting,
    Playing,
    Finished,
}

impl SessionStatus {
    /// Returns `true` while numbers can be called.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Playing => write!(f, "Playing"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
