//! `BingoServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → lobby → sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bingo_protocol::{Codec, JsonCodec};
use bingo_room::{Lobby, RoomConfig};
use bingo_transport::{Transport, WebSocketTransport};
use serde::{Deserialize, Serialize};

use crate::BingoError;
use crate::handler::handle_connection;

/// Address the builder binds to unless told otherwise.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Server-wide settings.
///
/// `ping_interval` should stay well under `idle_timeout`: the pong a client
/// sends back is what keeps a player who is only waiting (for an opponent,
/// or for the other player's call) from looking idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// A connection that sends nothing for this long, keep-alive frames
    /// included, is dropped and treated as a disconnect.
    pub idle_timeout: Duration,

    /// How often the server pings each client.
    pub ping_interval: Duration,

    /// Settings applied to every session.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60),
            ping_interval: Duration::from_secs(20),
            room: RoomConfig::default(),
        }
    }
}

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) lobby: Lobby,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a bingo server.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use bingo::prelude::*;
///
/// # async fn start() -> Result<(), BingoError> {
/// let server = BingoServer::builder()
///     .bind("0.0.0.0:5000")
///     .idle_timeout(Duration::from_secs(120))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BingoServerBuilder {
    bind_addr: String,
    config: ServerConfig,
}

impl BingoServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.config.ping_interval = interval;
        self
    }

    /// Sets the configuration shared by all sessions.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Replaces the whole server configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and returns a server ready to run.
    ///
    /// Speaks JSON over WebSocket text frames.
    pub async fn build(self) -> Result<BingoServer<JsonCodec>, BingoError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            lobby: Lobby::new(self.config.room.clone()),
            codec: JsonCodec,
            config: self.config,
        });

        Ok(BingoServer { transport, state })
    }
}

impl Default for BingoServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound bingo server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BingoServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl BingoServer<JsonCodec> {
    pub fn builder() -> BingoServerBuilder {
        BingoServerBuilder::new()
    }
}

impl<C: Codec> BingoServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, BingoError> {
        Ok(self.transport.local_addr()?)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Runs the accept loop, spawning a handler task per connection.
    ///
    /// Runs until the task is dropped; failed accepts are logged and
    /// skipped.
    pub async fn run(mut self) -> Result<(), BingoError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "bingo server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
