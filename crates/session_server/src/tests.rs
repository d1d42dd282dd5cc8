
// Include tests
#[cfg(test)]
mod tests {
    use crate::connection::{ConnectionId, ConnectionManager};
    use crate::game::GameCoordinator;
    use crate::messaging::route_client_message;
    use chess_rules::RulesEngine;
    use session_protocol::{MoveRequest, SeatColor, ServerEvent};
    use std::sync::Arc;
    use tokio::sync::broadcast;

    fn test_addr() -> std::net::SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    fn mv(from: &str, to: &str) -> MoveRequest {
        MoveRequest {
            from: from.into(),
            to: to.into(),
            promotion: None,
        }
    }

    async fn setup() -> (Arc<ConnectionManager>, GameCoordinator) {
        let manager = Arc::new(ConnectionManager::new());
        let coordinator = GameCoordinator::new(manager.clone());
        (manager, coordinator)
    }

    /// Connects a participant: tracked by the manager, seated (or not) by
    /// the coordinator.
    async fn connect(manager: &ConnectionManager, coordinator: &GameCoordinator) -> ConnectionId {
        let id = manager.add_connection(test_addr()).await;
        coordinator.register_connection(id).await;
        id
    }

    /// Collects every event currently queued on the outgoing channel.
    fn drain(
        receiver: &mut broadcast::Receiver<(ConnectionId, Vec<u8>)>,
    ) -> Vec<(ConnectionId, ServerEvent)> {
        let mut events = Vec::new();
        while let Ok((id, bytes)) = receiver.try_recv() {
            let event = serde_json::from_slice(&bytes).expect("server emitted invalid JSON");
            events.push((id, event));
        }
        events
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn role_assignment_is_first_come() {
        let (manager, coordinator) = setup().await;
        let mut receiver = manager.subscribe();

        let a = connect(&manager, &coordinator).await;
        let b = connect(&manager, &coordinator).await;
        let c = connect(&manager, &coordinator).await;
        let d = connect(&manager, &coordinator).await;

        let events = drain(&mut receiver);
        assert_eq!(
            events,
            vec![
                (a, ServerEvent::PlayerRole(SeatColor::White)),
                (b, ServerEvent::PlayerRole(SeatColor::Black)),
                (c, ServerEvent::SpectatorRole),
                (d, ServerEvent::SpectatorRole),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn freed_seat_goes_to_the_next_new_connection_not_to_spectators() {
        let (manager, coordinator) = setup().await;

        let white = connect(&manager, &coordinator).await;
        let _black = connect(&manager, &coordinator).await;
        let spectator = connect(&manager, &coordinator).await;

        // White disconnects
        coordinator.release_connection(white).await;
        manager.remove_connection(white).await;

        let mut receiver = manager.subscribe();
        let newcomer = connect(&manager, &coordinator).await;

        let events = drain(&mut receiver);
        assert_eq!(
            events,
            vec![(newcomer, ServerEvent::PlayerRole(SeatColor::White))]
        );

        // The earlier spectator was never promoted: its move still gets dropped.
        coordinator.submit_move(spectator, mv("e2", "e4")).await;
        assert_eq!(coordinator.snapshot().await, RulesEngine::new().fen());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn spectator_moves_are_silently_dropped() {
        let (manager, coordinator) = setup().await;
        let _white = connect(&manager, &coordinator).await;
        let _black = connect(&manager, &coordinator).await;
        let spectator = connect(&manager, &coordinator).await;

        let before = coordinator.snapshot().await;
        let mut receiver = manager.subscribe();

        coordinator.submit_move(spectator, mv("e2", "e4")).await;

        assert_eq!(coordinator.snapshot().await, before);
        assert!(drain(&mut receiver).is_empty(), "no feedback, no broadcast");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn out_of_turn_moves_are_silently_dropped() {
        let (manager, coordinator) = setup().await;
        let _white = connect(&manager, &coordinator).await;
        let black = connect(&manager, &coordinator).await;

        let before = coordinator.snapshot().await;
        let mut receiver = manager.subscribe();

        // Black tries to open; it is white's turn.
        coordinator.submit_move(black, mv("e7", "e5")).await;

        assert_eq!(coordinator.snapshot().await, before);
        assert!(drain(&mut receiver).is_empty());
        assert_eq!(coordinator.side_to_move().await, SeatColor::White);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn illegal_move_yields_exactly_one_invalid_move_to_sender() {
        let (manager, coordinator) = setup().await;
        let white = connect(&manager, &coordinator).await;
        let _black = connect(&manager, &coordinator).await;

        let before = coordinator.snapshot().await;
        let mut receiver = manager.subscribe();

        let request = mv("e2", "e5");
        coordinator.submit_move(white, request.clone()).await;

        assert_eq!(coordinator.snapshot().await, before);
        let events = drain(&mut receiver);
        assert_eq!(events, vec![(white, ServerEvent::InvalidMove(request))]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_move_is_rejected_like_an_illegal_one() {
        let (manager, coordinator) = setup().await;
        let white = connect(&manager, &coordinator).await;
        let _black = connect(&manager, &coordinator).await;

        let before = coordinator.snapshot().await;
        let mut receiver = manager.subscribe();

        // Bad coordinate encoding: echoed back unchanged, state untouched.
        let request = mv("z9", "e4");
        coordinator.submit_move(white, request.clone()).await;

        assert_eq!(coordinator.snapshot().await, before);
        let events = drain(&mut receiver);
        assert_eq!(events, vec![(white, ServerEvent::InvalidMove(request))]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn legal_move_broadcasts_move_and_snapshot_to_every_connection() {
        let (manager, coordinator) = setup().await;
        let white = connect(&manager, &coordinator).await;
        let black = connect(&manager, &coordinator).await;
        let spectator = connect(&manager, &coordinator).await;

        let mut receiver = manager.subscribe();
        coordinator.submit_move(white, mv("e2", "e4")).await;

        let mut expected_rules = RulesEngine::new();
        expected_rules.try_apply(&mv("e2", "e4")).unwrap();
        let expected_fen = expected_rules.fen();
        assert_eq!(coordinator.snapshot().await, expected_fen);

        let events = drain(&mut receiver);
        for id in [white, black, spectator] {
            let moves: Vec<_> = events
                .iter()
                .filter(|(target, event)| *target == id && matches!(event, ServerEvent::Move(_)))
                .collect();
            assert_eq!(moves.len(), 1, "exactly one move event per connection");

            let snapshots: Vec<_> = events
                .iter()
                .filter(|(target, event)| {
                    *target == id && *event == ServerEvent::BoardState(expected_fen.clone())
                })
                .collect();
            assert_eq!(snapshots.len(), 1, "exactly one snapshot per connection");
        }
        assert_eq!(events.len(), 6);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_submission_sees_the_first_already_applied() {
        let (manager, coordinator) = setup().await;
        let white = connect(&manager, &coordinator).await;
        let _black = connect(&manager, &coordinator).await;

        coordinator.submit_move(white, mv("e2", "e4")).await;
        let after_first = coordinator.snapshot().await;

        // The turn has flipped, so white's follow-up is gated out.
        coordinator.submit_move(white, mv("d2", "d4")).await;
        assert_eq!(coordinator.snapshot().await, after_first);
        assert_eq!(coordinator.side_to_move().await, SeatColor::Black);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn full_session_scenario() {
        let (manager, coordinator) = setup().await;
        let mut receiver = manager.subscribe();

        let a = connect(&manager, &coordinator).await;
        let b = connect(&manager, &coordinator).await;
        let c = connect(&manager, &coordinator).await;

        assert_eq!(
            drain(&mut receiver),
            vec![
                (a, ServerEvent::PlayerRole(SeatColor::White)),
                (b, ServerEvent::PlayerRole(SeatColor::Black)),
                (c, ServerEvent::SpectatorRole),
            ]
        );

        // A opens with e2e4: everyone sees the move and the new snapshot.
        coordinator.submit_move(a, mv("e2", "e4")).await;
        let fen_after_open = coordinator.snapshot().await;
        let events = drain(&mut receiver);
        assert_eq!(events.len(), 6);
        for id in [a, b, c] {
            assert!(events.contains(&(id, ServerEvent::Move(mv("e2", "e4")))));
            assert!(events.contains(&(id, ServerEvent::BoardState(fen_after_open.clone()))));
        }

        // B answers with e7e5.
        coordinator.submit_move(b, mv("e7", "e5")).await;
        let events = drain(&mut receiver);
        assert_eq!(events.len(), 6);
        assert!(events.contains(&(c, ServerEvent::Move(mv("e7", "e5")))));

        // C attempts a move: silently ignored, no broadcast, no rejection.
        let before = coordinator.snapshot().await;
        coordinator.submit_move(c, mv("g1", "f3")).await;
        assert_eq!(coordinator.snapshot().await, before);
        assert!(drain(&mut receiver).is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn router_rejects_frames_that_are_not_move_events() {
        let (manager, coordinator) = setup().await;
        let white = connect(&manager, &coordinator).await;
        let mut receiver = manager.subscribe();

        assert!(route_client_message("not json", white, &coordinator)
            .await
            .is_err());
        assert!(
            route_client_message(r#"{"event":"chat","data":"hello"}"#, white, &coordinator)
                .await
                .is_err()
        );

        // Nothing reached the session.
        assert_eq!(coordinator.snapshot().await, RulesEngine::new().fen());
        assert!(drain(&mut receiver).is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn router_dispatches_move_frames_to_the_session() {
        let (manager, coordinator) = setup().await;
        let white = connect(&manager, &coordinator).await;
        let _black = connect(&manager, &coordinator).await;
        let mut receiver = manager.subscribe();

        route_client_message(
            r#"{"event":"move","data":{"from":"e2","to":"e4","promotion":"q"}}"#,
            white,
            &coordinator,
        )
        .await
        .unwrap();

        assert_eq!(coordinator.side_to_move().await, SeatColor::Black);
        let events = drain(&mut receiver);
        // The broadcast move echoes the payload as submitted, promotion included.
        let expected = MoveRequest {
            from: "e2".into(),
            to: "e4".into(),
            promotion: Some("q".into()),
        };
        assert!(events.contains(&(white, ServerEvent::Move(expected))));
    }
}
