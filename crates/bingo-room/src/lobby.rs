//! The lobby: routes players to sessions and cleans up after them.
//!
//! The registry sits behind a Tokio mutex. Each operation takes the lock
//! only to read or update bindings, clones the session handle, releases the
//! lock, and then talks to the session actor.

use bingo_protocol::{PlayerId, SessionId};
use tokio::sync::Mutex;

use crate::actor::{PlayerSender, SessionHandle, SessionInfo};
use crate::{RoomConfig, RoomError, SessionRegistry};

/// Attempts a join makes when it keeps landing on a stopped actor.
const MAX_JOIN_ATTEMPTS: usize = 3;

/// What became of a join request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The player holds a seat in this session.
    Seated(SessionId),
    /// The connection already plays in another session; nothing changed.
    Ignored,
}

/// Entry point for session operations from the connection layer.
pub struct Lobby {
    registry: Mutex<SessionRegistry>,
}

impl Lobby {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            registry: Mutex::new(SessionRegistry::new(config)),
        }
    }

    /// Seats `player_id` in session `room`, creating it if needed.
    ///
    /// A player already bound to `room` is re-sent the roster. A player
    /// bound to a different session is ignored.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] when both seats are taken, or
    /// [`RoomError::Unavailable`] if no live actor could be reached.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        room: SessionId,
        sender: PlayerSender,
    ) -> Result<JoinOutcome, RoomError> {
        let mut last_err = RoomError::Unavailable(room.clone());

        for attempt in 1..=MAX_JOIN_ATTEMPTS {
            let (ticket, handle) = {
                let mut registry = self.registry.lock().await;
                if let Some(current) = registry.session_of(player_id) {
                    if *current != room {
                        tracing::debug!(
                            %player_id,
                            current = %current,
                            requested = %room,
                            "join for another session ignored"
                        );
                        return Ok(JoinOutcome::Ignored);
                    }
                }
                // Bound before the actor sees the join. The actor keeps the
                // ticket and returns it if it later evicts this player.
                let ticket = registry.bind(player_id, room.clone());
                (ticket, registry.resolve_or_create(&room))
            };

            match handle
                .join(player_id, name.clone(), sender.clone(), ticket)
                .await
            {
                Ok(()) => return Ok(JoinOutcome::Seated(room)),
                Err(RoomError::Unavailable(id)) => {
                    tracing::debug!(session_id = %id, %player_id, attempt, "stale session, retrying");
                    let mut registry = self.registry.lock().await;
                    registry.release(&room, &handle);
                    registry.unbind_ticket(player_id, ticket);
                    last_err = RoomError::Unavailable(id);
                }
                Err(err) => {
                    self.registry.lock().await.unbind_ticket(player_id, ticket);
                    return Err(err);
                }
            }
        }

        tracing::warn!(session_id = %room, %player_id, "join gave up");
        Err(last_err)
    }

    /// Forwards a number call to the caller's session. Unbound players are
    /// ignored.
    pub async fn make_move(&self, player_id: PlayerId, number: u8) -> Result<(), RoomError> {
        match self.handle_for(player_id).await {
            Some(handle) => handle.make_move(player_id, number).await,
            None => {
                tracing::debug!(%player_id, number, "move from unseated player ignored");
                Ok(())
            }
        }
    }

    /// Forwards a reset request to the caller's session. Unbound players
    /// are ignored.
    pub async fn reset(&self, player_id: PlayerId) -> Result<(), RoomError> {
        match self.handle_for(player_id).await {
            Some(handle) => handle.reset(player_id).await,
            None => {
                tracing::debug!(%player_id, "reset from unseated player ignored");
                Ok(())
            }
        }
    }

    /// Removes a departed connection from its session.
    ///
    /// Remaining players are notified and unseated, and an emptied session
    /// is stopped and dropped from the registry.
    pub async fn disconnect(&self, player_id: PlayerId) {
        let (session_id, handle) = {
            let mut registry = self.registry.lock().await;
            let Some(session_id) = registry.unbind(player_id) else {
                return;
            };
            let handle = registry.get(&session_id);
            (session_id, handle)
        };
        let Some(handle) = handle else {
            return;
        };

        let outcome = match handle.leave(player_id).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(%session_id, %player_id, %err, "leave on stopped session");
                self.registry.lock().await.release(&session_id, &handle);
                return;
            }
        };

        {
            // Tickets as the actor last saw them: an evicted player who has
            // already joined again holds a newer ticket and keeps it.
            let mut registry = self.registry.lock().await;
            for &(member, ticket) in &outcome.evicted {
                registry.unbind_ticket(member, ticket);
            }
        }
        tracing::info!(
            %session_id,
            %player_id,
            evicted = outcome.evicted.len(),
            "player disconnected"
        );

        if outcome.empty && matches!(handle.retire().await, Ok(true) | Err(_)) {
            self.registry.lock().await.release(&session_id, &handle);
        }
    }

    pub async fn session_info(&self, id: &SessionId) -> Result<SessionInfo, RoomError> {
        let handle = self
            .registry
            .lock()
            .await
            .get(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        handle.info().await
    }

    /// The session `player_id` is bound to, if any.
    pub async fn session_of(&self, player_id: PlayerId) -> Option<SessionId> {
        self.registry.lock().await.session_of(player_id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.registry.lock().await.session_count()
    }

    async fn handle_for(&self, player_id: PlayerId) -> Option<SessionHandle> {
        let registry = self.registry.lock().await;
        let session_id = registry.session_of(player_id)?;
        registry.get(session_id)
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
