//! Session registry: which sessions exist and which player sits where.

use std::collections::HashMap;

use bingo_protocol::{PlayerId, SessionId};

use crate::RoomConfig;
use crate::actor::{SessionHandle, spawn_session};
use crate::session::BingoSession;

/// Tracks live sessions by id and binds each player to at most one of them.
///
/// Everything here is synchronous. The [`Lobby`](crate::Lobby) wraps it in a
/// mutex and never holds that lock across a call into a session actor.
pub struct SessionRegistry {
    sessions: HashMap<SessionId, SessionHandle>,
    /// A player is bound to at most ONE session at a time.
    bindings: HashMap<PlayerId, Binding>,
    next_ticket: u64,
    config: RoomConfig,
}

/// Identifies one particular binding of a player. Every [`bind`] issues a
/// fresh ticket, so a stale ticket never removes a newer binding.
///
/// [`bind`]: SessionRegistry::bind
pub type Ticket = u64;

#[derive(Debug, Clone)]
struct Binding {
    session: SessionId,
    ticket: Ticket,
}

impl SessionRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            bindings: HashMap::new(),
            next_ticket: 0,
            config,
        }
    }

    /// Returns the session called `id`, spawning an empty one if needed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn resolve_or_create(&mut self, id: &SessionId) -> SessionHandle {
        if let Some(handle) = self.sessions.get(id) {
            return handle.clone();
        }
        let session = BingoSession::new(id.clone(), self.config.clone());
        let handle = spawn_session(session, self.config.command_buffer);
        self.sessions.insert(id.clone(), handle.clone());
        tracing::info!(session_id = %id, sessions = self.sessions.len(), "session created");
        handle
    }

    pub fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.get(id).cloned()
    }

    /// Records that `player` is in session `id`, replacing any earlier
    /// binding, and returns the new binding's ticket.
    pub fn bind(&mut self, player: PlayerId, id: SessionId) -> Ticket {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.bindings.insert(player, Binding { session: id, ticket });
        ticket
    }

    /// Forgets `player`'s binding and returns the session it pointed at.
    pub fn unbind(&mut self, player: PlayerId) -> Option<SessionId> {
        self.bindings.remove(&player).map(|binding| binding.session)
    }

    /// Forgets `player`'s binding only if it is still the one `ticket` was
    /// issued for.
    pub fn unbind_ticket(&mut self, player: PlayerId, ticket: Ticket) -> bool {
        let current = self
            .bindings
            .get(&player)
            .is_some_and(|binding| binding.ticket == ticket);
        if current {
            self.bindings.remove(&player);
        }
        current
    }

    /// The session `player` is bound to, if any.
    pub fn session_of(&self, player: PlayerId) -> Option<&SessionId> {
        self.bindings.get(&player).map(|binding| &binding.session)
    }

    /// Drops the entry for `id` if it still refers to `handle`'s actor.
    ///
    /// A newer session registered under the same id is left alone.
    pub fn release(&mut self, id: &SessionId, handle: &SessionHandle) -> bool {
        let current = self
            .sessions
            .get(id)
            .is_some_and(|registered| registered.same_session(handle));
        if current {
            self.sessions.remove(id);
            tracing::info!(session_id = %id, sessions = self.sessions.len(), "session released");
        }
        current
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
