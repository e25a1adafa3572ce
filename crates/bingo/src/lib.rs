//! # Bingo
//!
//! A real-time, two-player bingo server over WebSockets.
//!
//! Players join a named session, each gets a private shuffled 5×5 board of
//! the numbers 1 to 25, and they take turns calling numbers. A call marks
//! the number on both boards; the first player with five completed lines
//! (rows, columns, or diagonals) wins. The server is authoritative: clients
//! only send intents and render what they are told.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bingo::prelude::*;
//!
//! # async fn start() -> Result<(), BingoError> {
//! let server = BingoServer::builder().bind("0.0.0.0:5000").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::BingoError;
pub use server::{BingoServer, BingoServerBuilder, DEFAULT_BIND_ADDR, ServerConfig};

pub use bingo_protocol as protocol;
pub use bingo_room as room;
pub use bingo_transport as transport;

pub mod prelude {
    pub use crate::{BingoError, BingoServer, BingoServerBuilder, ServerConfig};
    pub use bingo_protocol::{
        ClientMessage, PlayerId, PlayerSummary, ServerMessage, SessionId,
    };
    pub use bingo_room::{RoomConfig, RoomError};
}
