//! Integration tests for the lobby, registry, and session actors together.

use bingo_protocol::{PlayerId, ServerMessage, SessionId};
use bingo_room::{JoinOutcome, Lobby, RoomConfig, RoomError, SessionStatus};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn room(name: &str) -> SessionId {
    SessionId::new(name)
}

/// Joins and returns the player's inbox.
async fn join(lobby: &Lobby, id: u64, name: &str, session: &str) -> (JoinOutcome, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let outcome = lobby
        .join(pid(id), name.to_string(), room(session), tx)
        .await
        .expect("join should succeed");
    (outcome, rx)
}

fn drain(rx: &mut Inbox) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

/// Waits until everything queued ahead of it in the session is applied.
async fn settle(lobby: &Lobby, session: &str) {
    let _ = lobby.session_info(&room(session)).await;
}

// =========================================================================
// Joining
// =========================================================================

#[tokio::test]
async fn test_concurrent_joins_share_one_session() {
    let lobby = Lobby::default();
    let (tx1, _rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();

    let (a, b) = tokio::join!(
        lobby.join(pid(1), "Alice".into(), room("duel"), tx1),
        lobby.join(pid(2), "Bob".into(), room("duel"), tx2),
    );

    assert_eq!(a.unwrap(), JoinOutcome::Seated(room("duel")));
    assert_eq!(b.unwrap(), JoinOutcome::Seated(room("duel")));
    assert_eq!(lobby.session_count().await, 1);

    let info = lobby.session_info(&room("duel")).await.unwrap();
    assert_eq!(info.player_count, 2);
    assert_eq!(info.status, SessionStatus::Playing);
}

#[tokio::test]
async fn test_second_join_starts_the_game_for_both() {
    let lobby = Lobby::default();
    let (_, mut alice) = join(&lobby, 1, "Alice", "start").await;
    let (_, mut bob) = join(&lobby, 2, "Bob", "start").await;

    let to_alice = drain(&mut alice);
    let to_bob = drain(&mut bob);

    let start = |msgs: &[ServerMessage]| {
        msgs.iter()
            .find_map(|m| match m {
                ServerMessage::GameStart {
                    board,
                    opponent,
                    turn,
                    your_id,
                } => Some((board.clone(), opponent.clone(), *turn, *your_id)),
                _ => None,
            })
            .expect("game_start delivered")
    };
    let (a_board, a_opp, a_turn, a_id) = start(&to_alice[..]);
    let (b_board, b_opp, b_turn, b_id) = start(&to_bob[..]);

    assert_eq!((a_opp.as_str(), b_opp.as_str()), ("Bob", "Alice"));
    assert_eq!((a_id, b_id), (pid(1), pid(2)));
    assert_eq!(a_turn, pid(1));
    assert_eq!(b_turn, pid(1));
    assert_eq!(a_board.len(), 25);
    assert_eq!(b_board.len(), 25);
}

#[tokio::test]
async fn test_third_player_gets_room_full() {
    let lobby = Lobby::default();
    let _a = join(&lobby, 1, "Alice", "full").await;
    let _b = join(&lobby, 2, "Bob", "full").await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let err = lobby
        .join(pid(3), "Carol".into(), room("full"), tx)
        .await
        .unwrap_err();

    assert_eq!(err, RoomError::RoomFull);
    assert_eq!(err.to_string(), "Room is full. Wait for a slot.");
    assert_eq!(lobby.session_of(pid(3)).await, None);
    assert_eq!(lobby.session_info(&room("full")).await.unwrap().player_count, 2);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let lobby = Lobby::default();
    let _a = join(&lobby, 1, "Alice", "one").await;
    let _b = join(&lobby, 2, "Bob", "two").await;

    assert_eq!(lobby.session_count().await, 2);
    let one = lobby.session_info(&room("one")).await.unwrap();
    let two = lobby.session_info(&room("two")).await.unwrap();
    assert_eq!(one.player_count, 1);
    assert_eq!(two.player_count, 1);
    assert_eq!(one.status, SessionStatus::Waiting);
}

#[tokio::test]
async fn test_join_into_other_session_is_ignored() {
    let lobby = Lobby::default();
    let _a = join(&lobby, 1, "Alice", "home").await;

    let (outcome, mut inbox) = join(&lobby, 1, "Alice", "away").await;

    assert_eq!(outcome, JoinOutcome::Ignored);
    assert!(drain(&mut inbox).is_empty());
    assert_eq!(lobby.session_of(pid(1)).await, Some(room("home")));
    assert_eq!(lobby.session_count().await, 1);
}

#[tokio::test]
async fn test_duplicate_join_resends_roster_only() {
    let lobby = Lobby::default();
    let (_, mut first) = join(&lobby, 1, "Alice", "dup").await;
    drain(&mut first);

    let (outcome, mut again) = join(&lobby, 1, "Alice", "dup").await;

    assert_eq!(outcome, JoinOutcome::Seated(room("dup")));
    let msgs = drain(&mut again);
    assert!(matches!(
        msgs.as_slice(),
        [ServerMessage::PlayerJoined { players }] if players.len() == 1
    ));
    assert_eq!(lobby.session_info(&room("dup")).await.unwrap().player_count, 1);
}

#[tokio::test]
async fn test_session_info_not_found() {
    let lobby = Lobby::default();
    let err = lobby.session_info(&room("nowhere")).await.unwrap_err();
    assert_eq!(err, RoomError::NotFound(room("nowhere")));
}

// =========================================================================
// Playing
// =========================================================================

#[tokio::test]
async fn test_move_from_unseated_player_is_ignored() {
    let lobby = Lobby::default();
    assert!(lobby.make_move(pid(9), 5).await.is_ok());
    assert!(lobby.reset(pid(9)).await.is_ok());
    assert_eq!(lobby.session_count().await, 0);
}

#[tokio::test]
async fn test_out_of_turn_move_is_reported_privately() {
    let lobby = Lobby::default();
    let (_, mut alice) = join(&lobby, 1, "Alice", "turns").await;
    let (_, mut bob) = join(&lobby, 2, "Bob", "turns").await;
    drain(&mut alice);
    drain(&mut bob);

    lobby.make_move(pid(2), 13).await.unwrap();
    settle(&lobby, "turns").await;

    assert_eq!(drain(&mut bob), vec![ServerMessage::error("Not your turn!")]);
    assert!(drain(&mut alice).is_empty());
}

#[tokio::test]
async fn test_reset_alone_is_rejected() {
    let lobby = Lobby::default();
    let (_, mut alice) = join(&lobby, 1, "Alice", "alone").await;
    drain(&mut alice);

    lobby.reset(pid(1)).await.unwrap();
    settle(&lobby, "alone").await;

    assert_eq!(
        drain(&mut alice),
        vec![ServerMessage::error(
            "Waiting for an opponent before the game can restart."
        )]
    );
}

#[tokio::test]
async fn test_full_game_reaches_game_over() {
    let lobby = Lobby::default();
    let (_, mut alice) = join(&lobby, 1, "Alice", "match").await;
    let (_, mut bob) = join(&lobby, 2, "Bob", "match").await;

    for number in 1..=25u8 {
        let info = lobby.session_info(&room("match")).await.unwrap();
        if info.status == SessionStatus::Finished {
            break;
        }
        let mover = info.turn.expect("turn-holder while playing");
        lobby.make_move(mover, number).await.unwrap();
    }
    let info = lobby.session_info(&room("match")).await.unwrap();
    assert_eq!(info.status, SessionStatus::Finished);

    let winner = |msgs: Vec<ServerMessage>| {
        msgs.into_iter().find_map(|m| match m {
            ServerMessage::GameOver { winner } => Some(winner),
            _ => None,
        })
    };
    let a = winner(drain(&mut alice)).expect("alice sees game_over");
    let b = winner(drain(&mut bob)).expect("bob sees game_over");
    assert_eq!(a, b);
    assert!(a == "Alice" || a == "Bob");

    // A reset starts a clean round.
    lobby.reset(pid(2)).await.unwrap();
    let info = lobby.session_info(&room("match")).await.unwrap();
    assert_eq!(info.status, SessionStatus::Playing);
    assert!(info.called_numbers.is_empty());
    assert_eq!(info.turn, Some(pid(1)));
}

#[tokio::test]
async fn test_win_lines_from_config() {
    let lobby = Lobby::new(RoomConfig {
        win_lines: 1,
        ..RoomConfig::default()
    });
    let _a = join(&lobby, 1, "Alice", "quick").await;
    let _b = join(&lobby, 2, "Bob", "quick").await;

    let mut calls = 0;
    for number in 1..=25u8 {
        let info = lobby.session_info(&room("quick")).await.unwrap();
        if info.status == SessionStatus::Finished {
            break;
        }
        lobby.make_move(info.turn.unwrap(), number).await.unwrap();
        calls += 1;
    }

    // Every row needs five calls, and a single line already wins.
    assert!(calls >= 5);
    assert_eq!(
        lobby.session_info(&room("quick")).await.unwrap().status,
        SessionStatus::Finished
    );
}

// =========================================================================
// Leaving
// =========================================================================

#[tokio::test]
async fn test_disconnect_notifies_and_tears_down() {
    let lobby = Lobby::default();
    let (_, _alice) = join(&lobby, 1, "Alice", "bye").await;
    let (_, mut bob) = join(&lobby, 2, "Bob", "bye").await;
    drain(&mut bob);

    lobby.disconnect(pid(1)).await;

    assert_eq!(
        drain(&mut bob),
        vec![ServerMessage::PlayerLeft {
            name: "Alice".into()
        }]
    );
    assert_eq!(lobby.session_of(pid(1)).await, None);
    assert_eq!(lobby.session_of(pid(2)).await, None, "survivor is unseated too");
    assert_eq!(lobby.session_count().await, 0);
}

#[tokio::test]
async fn test_lone_player_disconnect_removes_session() {
    let lobby = Lobby::default();
    let _a = join(&lobby, 1, "Alice", "solo").await;
    assert_eq!(lobby.session_count().await, 1);

    lobby.disconnect(pid(1)).await;

    assert_eq!(lobby.session_count().await, 0);
}

#[tokio::test]
async fn test_disconnect_of_unknown_player_is_harmless() {
    let lobby = Lobby::default();
    let _a = join(&lobby, 1, "Alice", "calm").await;

    lobby.disconnect(pid(99)).await;

    assert_eq!(lobby.session_info(&room("calm")).await.unwrap().player_count, 1);
}

#[tokio::test]
async fn test_rejoin_after_opponent_left() {
    let lobby = Lobby::default();
    let (_, _alice) = join(&lobby, 1, "Alice", "again").await;
    let (_, _bob) = join(&lobby, 2, "Bob", "again").await;
    lobby.disconnect(pid(1)).await;

    let (outcome, mut bob) = join(&lobby, 2, "Bob", "again").await;
    assert_eq!(outcome, JoinOutcome::Seated(room("again")));
    assert!(matches!(
        drain(&mut bob).as_slice(),
        [ServerMessage::PlayerJoined { players }] if players.len() == 1
    ));

    let (_, _carol) = join(&lobby, 3, "Carol", "again").await;
    let info = lobby.session_info(&room("again")).await.unwrap();
    assert_eq!(info.status, SessionStatus::Playing);
    assert_eq!(info.turn, Some(pid(2)));
    assert_eq!(
        info.players,
        vec![(pid(2), "Bob".to_string()), (pid(3), "Carol".to_string())]
    );
}

#[tokio::test]
async fn test_repeat_join_then_opponent_leaves_unseats_player() {
    let lobby = Lobby::default();
    let (_, _alice) = join(&lobby, 1, "Alice", "repeat").await;
    let (_, _bob) = join(&lobby, 2, "Bob", "repeat").await;
    let (outcome, _bob_again) = join(&lobby, 2, "Bob", "repeat").await;
    assert_eq!(outcome, JoinOutcome::Seated(room("repeat")));

    lobby.disconnect(pid(1)).await;

    assert_eq!(lobby.session_of(pid(2)).await, None);
    assert_eq!(lobby.session_count().await, 0);
    let (outcome, _) = join(&lobby, 2, "Bob", "elsewhere").await;
    assert_eq!(outcome, JoinOutcome::Seated(room("elsewhere")));
}

#[tokio::test]
async fn test_repeat_join_racing_a_disconnect_never_strands_a_binding() {
    for round in 0..50 {
        let lobby = Lobby::default();
        let name = format!("race-{round}");
        let (_, _alice) = join(&lobby, 1, "Alice", &name).await;
        let (tx, _bob) = mpsc::unbounded_channel();
        lobby
            .join(pid(2), "Bob".into(), room(&name), tx.clone())
            .await
            .unwrap();

        let (_, rejoined) = tokio::join!(
            lobby.disconnect(pid(1)),
            lobby.join(pid(2), "Bob".into(), room(&name), tx),
        );
        rejoined.unwrap();

        // Bound means seated in a live session; otherwise free to go.
        match lobby.session_of(pid(2)).await {
            Some(bound) => {
                let info = lobby.session_info(&bound).await.unwrap();
                assert!(info.players.iter().any(|(id, _)| *id == pid(2)));
            }
            None => {
                let (outcome, _) = join(&lobby, 2, "Bob", "elsewhere").await;
                assert_eq!(outcome, JoinOutcome::Seated(room("elsewhere")));
            }
        }
    }
}
