//! Per-connection handler: decode, validate, and route client events.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Derive the player's id from the connection id
//!   2. Spawn a writer task that drains the player's outbound channel and
//!      pings the client on a fixed interval
//!   3. Loop: receive frames → decode → validate → hand to the lobby
//!   4. On close, error, or idle timeout, the guard disconnects the player
//!
//! Idleness is measured by the transport's activity clock, not by the gap
//! between game events: a player waiting on an opponent sends nothing but
//! pongs for as long as the opponent thinks.

use std::sync::Arc;
use std::time::Duration;

use bingo_protocol::{ClientMessage, Codec, PlayerId, ProtocolError, ServerMessage};
use bingo_room::PlayerSender;
use bingo_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::BingoError;
use crate::server::ServerState;

/// Drop guard that removes the player from their session when the handler
/// exits, whichever way it exits.
///
/// `Drop` is synchronous, so the async cleanup runs in a spawned task.
struct DisconnectGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.lobby.disconnect(player_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), BingoError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let player_id = PlayerId::from(conn_id);
    tracing::debug!(%conn_id, %player_id, peer = %conn.peer_addr(), "handling new connection");

    let _guard = DisconnectGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        Arc::clone(&state),
        player_id,
        outbound_rx,
    ));

    let idle_timeout = state.config.idle_timeout;
    loop {
        let wait = idle_timeout.saturating_sub(conn.idle_for());
        let data = match tokio::time::timeout(wait, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            // Only keep-alive traffic arrived; the deadline moves with it.
            Err(_) if conn.idle_for() < idle_timeout => continue,
            Err(_) => {
                tracing::info!(%player_id, "connection timed out");
                break;
            }
        };

        let msg = match decode_message(&state.codec, &data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "rejected client frame");
                let _ = outbound_tx.send(ServerMessage::error(client_text(&e)));
                continue;
            }
        };

        if let Err(e) = route_message(&state, player_id, msg, &outbound_tx).await {
            tracing::debug!(%player_id, error = %e, "request failed");
            let _ = outbound_tx.send(ServerMessage::error(e.to_string()));
        }
    }

    writer.abort();
    let _ = conn.close().await;
    // _guard drops here → lobby disconnect fires.
    Ok(())
}

/// Decodes one frame and applies the boundary checks.
fn decode_message(codec: &impl Codec, data: &[u8]) -> Result<ClientMessage, ProtocolError> {
    let msg: ClientMessage = codec.decode(data)?;
    msg.validate()?;
    Ok(msg)
}

/// What the client sees for a frame it got wrong.
fn client_text(err: &ProtocolError) -> String {
    match err {
        ProtocolError::InvalidMessage(reason) => reason.clone(),
        _ => "Malformed message.".to_string(),
    }
}

/// Hands a validated client event to the lobby.
///
/// Session rejections that belong to one player (wrong turn, not ready)
/// come back through the player's outbound channel, not through here.
async fn route_message<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    msg: ClientMessage,
    outbound: &PlayerSender,
) -> Result<(), BingoError> {
    match msg {
        ClientMessage::JoinGame { name, room } => {
            let room = room.unwrap_or_default();
            let name = name.trim().to_string();
            state
                .lobby
                .join(player_id, name, room, outbound.clone())
                .await?;
        }
        ClientMessage::MakeMove { number } => {
            state.lobby.make_move(player_id, number).await?;
        }
        ClientMessage::ResetGame => {
            state.lobby.reset(player_id).await?;
        }
    }
    Ok(())
}

/// Encodes and sends everything queued for this player, in order, with a
/// ping whenever the interval comes round.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    player_id: PlayerId,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
) {
    let period = state.config.ping_interval.max(MIN_PING_INTERVAL);
    let mut pings = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    pings.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            msg = outbound.recv() => {
                let Some(msg) = msg else { break };
                let bytes = match state.codec.encode(&msg) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(%player_id, error = %e, "failed to encode server message");
                        continue;
                    }
                };
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%player_id, error = %e, "send failed, stopping writer");
                    break;
                }
            }
            _ = pings.tick() => {
                if let Err(e) = conn.ping().await {
                    tracing::debug!(%player_id, error = %e, "ping failed, stopping writer");
                    break;
                }
            }
        }
    }
}

/// Floor for the ping period; `tokio::time::interval` rejects zero.
const MIN_PING_INTERVAL: Duration = Duration::from_millis(10);
