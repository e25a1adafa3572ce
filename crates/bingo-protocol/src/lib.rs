//! Wire protocol for the bingo session server.
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`PlayerId`],
//!   [`SessionId`], [`Recipient`]): what travels on the wire and who it is
//!   addressed to.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (frames) → Protocol (typed events) → Room (session state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, DEFAULT_SESSION, HIGHEST_NUMBER, PlayerId, PlayerSummary, Recipient,
    ServerMessage, SessionId,
};
