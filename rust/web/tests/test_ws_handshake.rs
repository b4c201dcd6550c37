use serde_json::Value;

use felt_engine::betting::Action;
use felt_web::{routes, AppConfig, AppContext};

fn quiet_config() -> AppConfig {
    AppConfig {
        ai_mode: "passive".to_string(),
        ai_seed: Some(7),
        ai_turn_delay_ms: 0,
        hand_end_pause_ms: 0,
        game_trace: false,
        ..AppConfig::default()
    }
}

fn test_context() -> AppContext {
    AppContext::new_for_tests(quiet_config())
}

async fn recv_json(client: &mut warp::test::WsClient) -> Value {
    let message = client.recv().await.expect("server message");
    serde_json::from_str(message.to_str().expect("text frame")).expect("json payload")
}

async fn expect_error(client: &mut warp::test::WsClient, code: &str) {
    let value = recv_json(client).await;
    assert_eq!(value["type"], "ERROR", "got {value}");
    assert_eq!(value["payload"]["code"], code, "got {value}");
}

#[tokio::test]
async fn multi_mode_requires_a_table_id() {
    let context = test_context();
    let filter = routes(&context);
    let mut client = warp::test::ws()
        .path("/ws?mode=multi&player_id=p1")
        .handshake(filter)
        .await
        .expect("handshake");
    expect_error(&mut client, "MISSING_TABLE_ID").await;
}

#[tokio::test]
async fn unknown_table_is_rejected() {
    let context = test_context();
    let filter = routes(&context);
    let mut client = warp::test::ws()
        .path("/ws?mode=multi&session_id=TBL-MISSING1&player_id=p1")
        .handshake(filter)
        .await
        .expect("handshake");
    expect_error(&mut client, "TABLE_NOT_FOUND").await;
}

#[tokio::test]
async fn table_ids_are_rejected_in_single_mode() {
    let context = test_context();
    let filter = routes(&context);
    let mut client = warp::test::ws()
        .path("/ws?mode=single&session_id=TBL-ABCD1234&player_id=p1")
        .handshake(filter)
        .await
        .expect("handshake");
    expect_error(&mut client, "INVALID_SINGLE_SESSION_ID").await;
}

#[tokio::test]
async fn unknown_seats_are_rejected() {
    let context = test_context();
    let filter = routes(&context);
    let mut client = warp::test::ws()
        .path("/ws?mode=single&session_id=seat-check&player_id=p9")
        .handshake(filter)
        .await
        .expect("handshake");
    expect_error(&mut client, "INVALID_PLAYER_ID").await;
}

#[tokio::test]
async fn unstarted_multiplayer_tables_reject_connections() {
    let context = test_context();
    let session = context.store().create_multiplayer_table(None);
    context
        .store()
        .join_multiplayer_table(&session.id, None)
        .await
        .unwrap();

    let filter = routes(&context);
    let mut client = warp::test::ws()
        .path(&format!("/ws?session_id={}&player_id=p2", session.id))
        .handshake(filter)
        .await
        .expect("handshake");
    // The table session forces multi mode even without mode=multi.
    expect_error(&mut client, "TABLE_NOT_STARTED").await;
}

#[tokio::test]
async fn unjoined_seats_are_rejected() {
    let context = test_context();
    let session = context.store().create_multiplayer_table(None);
    context
        .store()
        .start_multiplayer_table(&session.id, &"p1".to_string())
        .await
        .unwrap();

    let filter = routes(&context);
    let mut client = warp::test::ws()
        .path(&format!(
            "/ws?mode=multi&session_id={}&player_id=p5",
            session.id
        ))
        .handshake(filter)
        .await
        .expect("handshake");
    expect_error(&mut client, "SEAT_NOT_JOINED").await;
}

#[tokio::test]
async fn single_mode_connect_deals_and_streams_state() {
    let context = test_context();
    let filter = routes(&context);
    let mut client = warp::test::ws()
        .path("/ws?mode=single&session_id=solo-1&player_id=p1")
        .handshake(filter)
        .await
        .expect("handshake");

    // First frame: the hole-card deal event for the fresh hand.
    let first = recv_json(&mut client).await;
    assert_eq!(first["type"], "EVENT");
    assert_eq!(first["payload"]["event"], "DEAL_HOLE");

    // Then the viewer projection, redacted to our seat.
    let second = recv_json(&mut client).await;
    assert_eq!(second["type"], "STATE");
    let state = &second["payload"];
    assert_eq!(state["session_id"], "solo-1");
    assert_eq!(state["street"], "preflop");
    assert_eq!(state["player_hand"].as_array().unwrap().len(), 2);
    assert!(state.get("revealed_hands").is_none());
    assert_eq!(state["stacks"].as_object().unwrap().len(), 5);

    // Passive AI seats act until the human seat is due: two more state
    // frames, after which p1 holds the action.
    let third = recv_json(&mut client).await;
    let fourth = recv_json(&mut client).await;
    assert_eq!(third["type"], "STATE");
    assert_eq!(fourth["type"], "STATE");
    assert_eq!(fourth["payload"]["current_player"], "p1");

    // Recoverable protocol errors keep the connection open.
    client.send_text("{oops").await;
    expect_error(&mut client, "INVALID_JSON").await;

    client.send_text(r#"{"type":"MOVE","val":"call","amount":3}"#).await;
    expect_error(&mut client, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn reconnect_resumes_the_same_hand() {
    let context = test_context();
    let filter = routes(&context);

    // First connection creates the session and deals.
    let mut client = warp::test::ws()
        .path("/ws?mode=single&session_id=recon-1&player_id=p1")
        .handshake(filter)
        .await
        .expect("handshake");
    let _ = recv_json(&mut client).await; // DEAL_HOLE
    let _ = recv_json(&mut client).await; // STATE
    drop(client);

    // Drive the hand to the flop server-side while nobody is connected.
    let session = context.store().get("recon-1").expect("session kept");
    let board = {
        let mut state = session.lock_state().await;
        while state.engine.street == felt_engine::state::Street::Preflop {
            let seat = state.engine.betting.current_player.clone().unwrap();
            let action = if state.engine.betting.to_call(&seat) > 0 {
                Action::call()
            } else {
                Action::check()
            };
            state.engine.step(&action, &seat).unwrap();
        }
        state.engine.drain_events();
        state.engine.board.clone()
    };
    assert_eq!(board.len(), 3);

    // Reconnecting with the same session id resumes mid-hand.
    let filter = routes(&context);
    let mut client = warp::test::ws()
        .path("/ws?mode=single&session_id=recon-1&player_id=p1")
        .handshake(filter)
        .await
        .expect("handshake");
    let state = recv_json(&mut client).await;
    assert_eq!(state["type"], "STATE", "got {state}");
    assert_eq!(state["payload"]["street"], "flop");
    let cards: Vec<String> = state["payload"]["community_cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect();
    let expected: Vec<String> = board.iter().map(|c| c.to_string()).collect();
    assert_eq!(cards, expected);
}
