//! Session actor: one Tokio task per session that owns its [`BingoSession`].
//!
//! Every command for a session goes through a single bounded mpsc channel,
//! so operations on one session are applied one at a time in arrival order.
//! Different sessions run on different tasks and never contend.

use std::collections::HashMap;

use bingo_protocol::{PlayerId, Recipient, ServerMessage, SessionId};
use tokio::sync::{mpsc, oneshot};

use crate::session::{BingoSession, Outbound};
use crate::{RoomError, SessionStatus, Ticket};

/// Channel sender for delivering server messages to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a session actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the rest are
/// fire-and-forget, with any rejection sent to the player as an
/// `error_message`.
pub(crate) enum SessionCommand {
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        ticket: Ticket,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Move {
        player_id: PlayerId,
        number: u8,
    },

    Reset {
        player_id: PlayerId,
    },

    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    Info {
        reply: oneshot::Sender<SessionInfo>,
    },

    /// Stop the actor if nobody is seated. Replies whether it stopped.
    Retire {
        reply: oneshot::Sender<bool>,
    },
}

/// Result of a departure, as seen by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Players who were unseated along with the one leaving, each with the
    /// ticket of the join that seated them (or last re-sent their roster).
    pub evicted: Vec<(PlayerId, Ticket)>,
    /// Whether the session has nobody left in it.
    pub empty: bool,
}

/// A snapshot of a session, for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub player_count: usize,
    pub turn: Option<PlayerId>,
    pub called_numbers: Vec<u8>,
    /// Seated players as `(id, name)`, in join order.
    pub players: Vec<(PlayerId, String)>,
}

/// Handle to a running session actor.
///
/// Cheap to clone: it wraps an `mpsc::Sender`. The registry holds one per
/// session.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns `true` if both handles talk to the same actor.
    pub fn same_session(&self, other: &SessionHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Asks the session to seat a player. On success the actor keeps
    /// `sender` and uses it for everything addressed to this player.
    ///
    /// `ticket` is the registry binding this join was made under. The actor
    /// remembers the latest one per player and hands it back on eviction,
    /// so the registry drops exactly the binding the session knew about.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        ticket: Ticket,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Join {
            player_id,
            name,
            sender,
            ticket,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Calls a number (fire-and-forget).
    pub async fn make_move(&self, player_id: PlayerId, number: u8) -> Result<(), RoomError> {
        self.send(SessionCommand::Move { player_id, number }).await
    }

    /// Asks for a fresh round (fire-and-forget).
    pub async fn reset(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.send(SessionCommand::Reset { player_id }).await
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn info(&self) -> Result<SessionInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Info { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Stops the actor if the session is empty. Returns whether it stopped.
    pub async fn retire(&self) -> Result<bool, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Retire { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    async fn send(&self, command: SessionCommand) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.session_id.clone())
    }
}

/// A seated player's connection as the actor sees it.
struct Seat {
    sender: PlayerSender,
    ticket: Ticket,
}

/// The actor's private state. Runs inside a Tokio task.
struct SessionActor {
    session: BingoSession,
    seats: HashMap<PlayerId, Seat>,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    async fn run(mut self) {
        let session_id = self.session.id().clone();
        tracing::info!(%session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Join {
                    player_id,
                    name,
                    sender,
                    ticket,
                    reply,
                } => {
                    let result = self.handle_join(player_id, name, Seat { sender, ticket });
                    let _ = reply.send(result);
                }
                SessionCommand::Move { player_id, number } => {
                    let result = self.session.make_move(player_id, number);
                    self.deliver(player_id, result);
                }
                SessionCommand::Reset { player_id } => {
                    let result = self.session.reset(player_id);
                    self.deliver(player_id, result);
                }
                SessionCommand::Leave { player_id, reply } => {
                    let outcome = self.handle_leave(player_id);
                    let _ = reply.send(outcome);
                }
                SessionCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                SessionCommand::Retire { reply } => {
                    let retire = self.session.is_empty();
                    let _ = reply.send(retire);
                    if retire {
                        tracing::debug!(%session_id, "empty session retiring");
                        break;
                    }
                }
            }
        }

        tracing::info!(%session_id, "session actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: String,
        seat: Seat,
    ) -> Result<(), RoomError> {
        let outbound = self.session.join(player_id, name)?;
        // A repeat join replaces the seat, ticket included.
        self.seats.insert(player_id, seat);
        self.dispatch(outbound);
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> LeaveOutcome {
        let departure = self.session.leave(player_id);
        self.seats.remove(&player_id);

        // Notices go out before the evicted players' channels are dropped.
        self.dispatch(departure.messages);
        let evicted = departure
            .evicted
            .into_iter()
            .filter_map(|id| self.seats.remove(&id).map(|seat| (id, seat.ticket)))
            .collect();

        LeaveOutcome {
            evicted,
            empty: self.session.is_empty(),
        }
    }

    /// Dispatches an operation's messages, or its rejection to the caller.
    fn deliver(&self, caller: PlayerId, result: Result<Outbound, RoomError>) {
        match result {
            Ok(outbound) => self.dispatch(outbound),
            Err(err) => {
                tracing::debug!(
                    session_id = %self.session.id(),
                    %caller,
                    %err,
                    "request rejected"
                );
                self.send_to(caller, ServerMessage::error(err.to_string()));
            }
        }
    }

    fn dispatch(&self, outbound: Outbound) {
        for (recipient, msg) in outbound {
            match recipient {
                Recipient::All => {
                    for player in self.session.players() {
                        self.send_to(player.id(), msg.clone());
                    }
                }
                Recipient::Player(pid) => self.send_to(pid, msg),
            }
        }
    }

    /// Silently drops the message if the player's connection is gone.
    fn send_to(&self, player_id: PlayerId, msg: ServerMessage) {
        if let Some(seat) = self.seats.get(&player_id) {
            let _ = seat.sender.send(msg);
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session.id().clone(),
            status: self.session.status(),
            player_count: self.session.players().len(),
            turn: self.session.turn(),
            called_numbers: self.session.called_numbers().to_vec(),
            players: self
                .session
                .players()
                .iter()
                .map(|p| (p.id(), p.name().to_owned()))
                .collect(),
        }
    }
}

/// Spawns an actor for `session` and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub fn spawn_session(session: BingoSession, channel_size: usize) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let session_id = session.id().clone();

    let actor = SessionActor {
        session,
        seats: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
    }
}
