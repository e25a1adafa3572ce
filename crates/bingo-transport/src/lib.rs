//! Connection transport for the bingo session server.
//!
//! Provides the [`Transport`] and [`Connection`] traits the gateway is
//! written against, plus a WebSocket implementation. The game core never
//! sees this crate: it only deals in player ids and typed messages.
//!
//! # Why traits
//!
//! The gateway's reader loop and writer task are written
//! against [`Connection`], not against `tokio-tungstenite` types. Frames
//! cross this boundary as plain byte slices; turning them into events is
//! the protocol crate's job.
//!
//! Both traits use `async fn` directly (stable since Rust 1.75). The
//! returned futures carry no `Send` bound in the signature, which is why
//! the crate allows `async_fn_in_trait`; the concrete WebSocket types are
//! `Send` and the server spawns them on the multi-threaded runtime.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Opaque identifier for a connection.
///
/// Unique for the lifetime of the process. The gateway derives a player's
/// identity from it, so two sockets never share a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// The transport is owned by the accept loop, which is why
/// [`accept`](Self::accept) takes `&mut self`. Implementations should finish
/// any protocol upgrade (the WebSocket handshake here) before returning, so
/// the gateway only ever sees connections that are ready to carry frames.
///
/// `Send + Sync + 'static` lets the server move the transport into a
/// spawned task.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// A single bidirectional connection.
///
/// `send` and `recv` may run concurrently from different tasks: a writer
/// task drains the player's outbound queue while the reader loop waits for
/// the next client frame. Methods therefore take `&self`, and the gateway
/// shares a connection through an `Arc`.
///
/// # Liveness
///
/// [`recv`](Self::recv) only yields application frames, but every frame the
/// peer sends, keep-alive traffic included, resets [`idle_for`](Self::idle_for).
/// The gateway pairs that with periodic [`ping`](Self::ping)s so a quiet but
/// healthy peer is never mistaken for a dead one.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    ///
    /// `Send + Sync` so errors can travel back out of spawned tasks and be
    /// wrapped by the gateway's own error type.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Sends a keep-alive probe the peer is expected to answer.
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Time since the peer last sent anything at all.
    fn idle_for(&self) -> Duration;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the remote peer's address.
    fn peer_addr(&self) -> SocketAddr;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_orders_by_raw_value() {
        let mut ids = vec![ConnectionId::new(3), ConnectionId::new(1)];
        ids.sort();
        assert_eq!(ids, vec![ConnectionId::new(1), ConnectionId::new(3)]);
    }
}
