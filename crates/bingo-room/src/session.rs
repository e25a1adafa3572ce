//! The authoritative state of one bingo session.
//!
//! [`BingoSession`] is plain synchronous data: every operation reads and
//! writes the session in one call and returns the messages it produced,
//! each tagged with a [`Recipient`]. It never sends anything itself. The
//! session actor owns one of these and delivers the returned messages only
//! after the call returns, so no client ever observes a half-applied move.

use bingo_protocol::{PlayerId, PlayerSummary, Recipient, ServerMessage, SessionId};

use crate::board::{Board, BoardSource, RandomBoards};
use crate::lines::{MarkedCells, count_lines};
use crate::{MAX_PLAYERS, RoomConfig, RoomError, SessionStatus};

/// Messages produced by one session operation, in delivery order.
pub type Outbound = Vec<(Recipient, ServerMessage)>;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A seated player and their progress in the current round.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    board: Board,
    marked: MarkedCells,
    lines: usize,
}

impl Player {
    fn new(id: PlayerId, name: String, board: Board) -> Self {
        Self {
            id,
            name,
            board,
            marked: MarkedCells::new(),
            lines: 0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Board indices whose numbers have been called this round.
    pub fn marked(&self) -> &MarkedCells {
        &self.marked
    }

    /// Completed lines this round.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Marks `number` if it is on this player's board and refreshes the
    /// line count.
    fn mark(&mut self, number: u8) {
        if let Some(index) = self.board.position_of(number) {
            self.marked.insert(index);
            self.lines = count_lines(&self.marked);
        }
    }

    fn clear_round(&mut self) {
        self.marked.clear();
        self.lines = 0;
    }

    fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            name: self.name.clone(),
            id: self.id,
        }
    }
}

/// What a departure changed.
#[derive(Debug, Default)]
pub struct Departure {
    /// `player_left` notices for whoever was still seated.
    pub messages: Outbound,
    /// Players who lost their seat because the session was torn down.
    pub evicted: Vec<PlayerId>,
}

// ---------------------------------------------------------------------------
// BingoSession
// ---------------------------------------------------------------------------

/// One room's game state and rules.
///
/// Invariants upheld by every method:
/// - at most [`MAX_PLAYERS`] players, kept in join order;
/// - `Playing` implies two players and a turn-holder among them;
/// - `Waiting` implies no turn-holder and no called numbers;
/// - a number is called at most once per round, and each player's marks are
///   exactly the positions of the called numbers on their board.
pub struct BingoSession {
    id: SessionId,
    config: RoomConfig,
    players: Vec<Player>,
    called: Vec<u8>,
    turn: Option<PlayerId>,
    status: SessionStatus,
    boards: Box<dyn BoardSource>,
}

impl BingoSession {
    /// Creates an empty session that deals shuffled boards.
    pub fn new(id: SessionId, config: RoomConfig) -> Self {
        Self::with_board_source(id, config, Box::new(RandomBoards))
    }

    /// Creates an empty session that deals boards from `boards`.
    pub fn with_board_source(
        id: SessionId,
        config: RoomConfig,
        boards: Box<dyn BoardSource>,
    ) -> Self {
        Self {
            id,
            config,
            players: Vec::with_capacity(MAX_PLAYERS),
            called: Vec::new(),
            turn: None,
            status: SessionStatus::Waiting,
            boards,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whose turn it is, if a round is underway or just finished.
    pub fn turn(&self) -> Option<PlayerId> {
        self.turn
    }

    /// Seated players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Numbers called this round, oldest first.
    pub fn called_numbers(&self) -> &[u8] {
        &self.called
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Seats a player.
    ///
    /// The second seat starts the round. A connection that is already
    /// seated gets the current roster back and nothing else changes.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] when both seats are taken.
    pub fn join(&mut self, player_id: PlayerId, name: String) -> Result<Outbound, RoomError> {
        if self.player(player_id).is_some() {
            tracing::debug!(session_id = %self.id, %player_id, "already seated");
            return Ok(vec![(Recipient::Player(player_id), self.roster())]);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(RoomError::RoomFull);
        }

        let board = self.boards.next_board();
        self.players.push(Player::new(player_id, name, board));
        tracing::info!(
            session_id = %self.id,
            %player_id,
            players = self.players.len(),
            "player joined"
        );

        let mut out = vec![(Recipient::All, self.roster())];
        if self.players.len() == MAX_PLAYERS {
            out.extend(self.start_round()?);
        }
        Ok(out)
    }

    /// Starts a round with the current players and boards.
    ///
    /// Clears every call and mark, sets `Playing`, and gives the first
    /// seat the first turn. Each player gets a private `game_start` with
    /// their own board only.
    ///
    /// # Errors
    /// [`RoomError::RoomNotReady`] unless exactly two players are seated.
    pub fn start_round(&mut self) -> Result<Outbound, RoomError> {
        if self.players.len() != MAX_PLAYERS {
            return Err(RoomError::RoomNotReady);
        }

        self.called.clear();
        for player in &mut self.players {
            player.clear_round();
        }
        let first = self.players[0].id;
        self.turn = Some(first);
        self.status = SessionStatus::Playing;
        tracing::info!(session_id = %self.id, turn = %first, "round started");

        Ok(self
            .players
            .iter()
            .filter_map(|player| {
                let opponent = self.opponent_of(player.id)?;
                Some((
                    Recipient::Player(player.id),
                    ServerMessage::GameStart {
                        board: player.board.to_vec(),
                        opponent: opponent.name.clone(),
                        turn: first,
                        your_id: player.id,
                    },
                ))
            })
            .collect())
    }

    /// Calls `number` on behalf of `caller`.
    ///
    /// Silently ignored outside `Playing`, for numbers off the board range,
    /// and for numbers already called this round. An accepted call marks
    /// every board, passes the turn, and may end the round. When both
    /// players reach the winning count on the same call, the caller wins.
    ///
    /// # Errors
    /// [`RoomError::NotYourTurn`] when `caller` does not hold the turn.
    pub fn make_move(&mut self, caller: PlayerId, number: u8) -> Result<Outbound, RoomError> {
        if !self.status.is_active() {
            tracing::debug!(session_id = %self.id, %caller, status = %self.status, "move outside play ignored");
            return Ok(Vec::new());
        }
        if self.turn != Some(caller) {
            return Err(RoomError::NotYourTurn);
        }
        if number == 0 || usize::from(number) > crate::BOARD_CELLS {
            tracing::debug!(session_id = %self.id, %caller, number, "number off the board ignored");
            return Ok(Vec::new());
        }
        if self.called.contains(&number) {
            tracing::debug!(session_id = %self.id, %caller, number, "number already called");
            return Ok(Vec::new());
        }
        let Some(next_turn) = self.opponent_of(caller).map(|p| p.id) else {
            tracing::warn!(session_id = %self.id, %caller, "playing without an opponent");
            return Ok(Vec::new());
        };

        self.called.push(number);
        for player in &mut self.players {
            player.mark(number);
        }

        let threshold = self.config.win_lines;
        let winner = self
            .player(caller)
            .filter(|p| p.lines >= threshold)
            .or_else(|| self.players.iter().find(|p| p.lines >= threshold))
            .map(|p| p.name.clone());
        if winner.is_some() {
            self.status = SessionStatus::Finished;
        }
        self.turn = Some(next_turn);

        let mut out = vec![(
            Recipient::All,
            ServerMessage::NumberMarked {
                number,
                turn: next_turn,
                marked_numbers: self.called.clone(),
            },
        )];
        out.extend(self.players.iter().map(|player| {
            let opponent_lines = self.opponent_of(player.id).map_or(0, |o| o.lines);
            (
                Recipient::Player(player.id),
                ServerMessage::ScoreUpdate {
                    your_lines: player.lines,
                    opponent_lines,
                },
            )
        }));
        if let Some(winner) = winner {
            tracing::info!(session_id = %self.id, %winner, calls = self.called.len(), "game finished");
            out.push((Recipient::All, ServerMessage::GameOver { winner }));
        }
        Ok(out)
    }

    /// Deals new boards to both players and starts a new round.
    ///
    /// Anyone seated may ask, in any status, including mid-round.
    ///
    /// # Errors
    /// [`RoomError::RoomNotReady`] unless exactly two players are seated;
    /// nothing changes in that case.
    pub fn reset(&mut self, requested_by: PlayerId) -> Result<Outbound, RoomError> {
        if self.players.len() != MAX_PLAYERS {
            return Err(RoomError::RoomNotReady);
        }
        for player in &mut self.players {
            player.board = self.boards.next_board();
        }
        tracing::info!(session_id = %self.id, %requested_by, "boards re-dealt");
        self.start_round()
    }

    /// Removes a departing player and tears the session down.
    ///
    /// Whoever is still seated is told who left and then loses their seat
    /// as well; they have to join again. Unknown players are a no-op.
    pub fn leave(&mut self, player_id: PlayerId) -> Departure {
        let Some(index) = self.players.iter().position(|p| p.id == player_id) else {
            return Departure::default();
        };
        let departed = self.players.remove(index);
        tracing::info!(session_id = %self.id, %player_id, name = %departed.name, "player left");

        let messages = self
            .players
            .iter()
            .map(|p| {
                (
                    Recipient::Player(p.id),
                    ServerMessage::PlayerLeft {
                        name: departed.name.clone(),
                    },
                )
            })
            .collect();
        let evicted = self.players.drain(..).map(|p| p.id).collect();

        self.called.clear();
        self.turn = None;
        self.status = SessionStatus::Waiting;

        Departure { messages, evicted }
    }

    fn opponent_of(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id != id)
    }

    fn roster(&self) -> ServerMessage {
        ServerMessage::PlayerJoined {
            players: self.players.iter().map(Player::summary).collect(),
        }
    }
}
