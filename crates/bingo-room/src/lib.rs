//! Bingo sessions: rules, actors, and the registry that routes players.
//!
//! Each session runs as an isolated Tokio task (actor model) that owns its
//! game state and the outbound channels of its players.
//!
//! # Key types
//!
//! - [`BingoSession`]: the synchronous state machine (join, move, reset, leave)
//! - [`Board`] and [`count_lines`]: board generation and win evaluation
//! - [`SessionHandle`]: send commands to a running session actor
//! - [`SessionRegistry`]: session ids and player bindings
//! - [`Lobby`]: the async entry point used by the connection layer

mod actor;
mod board;
mod config;
mod error;
mod lines;
mod lobby;
mod registry;
mod session;

pub use actor::{LeaveOutcome, PlayerSender, SessionHandle, SessionInfo, spawn_session};
pub use board::{BOARD_CELLS, BOARD_SIDE, Board, BoardSource, RandomBoards};
pub use config::{MAX_PLAYERS, RoomConfig, SessionStatus};
pub use error::RoomError;
pub use lines::{LINE_COUNT, MarkedCells, count_lines};
pub use lobby::{JoinOutcome, Lobby};
pub use registry::{SessionRegistry, Ticket};
pub use session::{BingoSession, Departure, Outbound, Player};
