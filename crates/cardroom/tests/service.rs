//! Integration tests for the `Cardroom` facade: the caller-facing
//! contracts, the wire format, and clock injection.

use std::sync::Arc;
use std::time::Duration;

use cardroom::prelude::*;
use serde_json::{Value, json};
use tokio::time::sleep;

// =========================================================================
// Helpers
// =========================================================================

fn room_config() -> RoomConfig {
    RoomConfig {
        sweep: SweepConfig {
            interval: Duration::from_millis(1000),
            initial_jitter_us: 0,
        },
        ..RoomConfig::default()
    }
}

fn service() -> Cardroom {
    Cardroom::builder().room_config(room_config()).build()
}

fn rid(id: &str) -> RoomId {
    RoomId::from(id)
}

fn pid(id: &str) -> ParticipantId {
    ParticipantId::from(id)
}

fn parse(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

// =========================================================================
// Join / heartbeat / draw
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_join_creates_room_and_echoes_ids() {
    let cardroom = service();

    let receipt = cardroom.join(&rid("R1"), pid("alice")).await.unwrap();
    assert_eq!(receipt.room_id, rid("R1"));
    assert_eq!(receipt.participant_id, pid("alice"));
    assert_eq!(cardroom.room_count().await, 1);

    let state = parse(&cardroom.snapshot(&rid("R1")).await.unwrap());
    assert_eq!(state["version"], 2);
    assert_eq!(state["players"], json!({ "alice": true }));
}

#[tokio::test(start_paused = true)]
async fn test_join_receipt_serializes_ids_as_strings() {
    let cardroom = service();
    let receipt = cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    let value = serde_json::to_value(&receipt).unwrap();
    assert_eq!(value, json!({ "room_id": "R1", "participant_id": "alice" }));
}

#[tokio::test(start_paused = true)]
async fn test_join_twice_while_online_fails() {
    let cardroom = service();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    let err = cardroom.join(&rid("R1"), pid("alice")).await.unwrap_err();
    assert!(matches!(
        err,
        CardroomError::Room(RoomError::ParticipantAlreadyOnline(..))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_operations_on_unknown_room_fail() {
    let cardroom = service();
    let room = rid("nowhere");

    let errors = vec![
        cardroom.heartbeat(&room, pid("alice")).await.unwrap_err(),
        cardroom.draw_card(&room, pid("alice")).await.unwrap_err(),
        cardroom.push_state(&room, StatePayload::new()).await.unwrap_err(),
        cardroom.push_state_json(&room, b"{}").await.unwrap_err(),
        cardroom.await_state(&room, 0).await.unwrap_err(),
        cardroom.snapshot(&room).await.unwrap_err(),
    ];
    for err in errors {
        assert!(
            matches!(err, CardroomError::Room(RoomError::UnknownRoom(ref id)) if *id == room),
            "unexpected error: {err}"
        );
    }
    assert_eq!(cardroom.room_count().await, 0, "lookups never create rooms");
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_and_draw_unknown_participant() {
    let cardroom = service();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    let err = cardroom.heartbeat(&rid("R1"), pid("bob")).await.unwrap_err();
    assert!(matches!(err, CardroomError::Room(RoomError::UnknownParticipant(..))));

    let err = cardroom.draw_card(&rid("R1"), pid("bob")).await.unwrap_err();
    assert!(matches!(err, CardroomError::Room(RoomError::UnknownParticipant(..))));
}

#[tokio::test(start_paused = true)]
async fn test_draw_card_until_deck_exhausted() {
    let cardroom = service();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    for _ in 0..52 {
        cardroom.draw_card(&rid("R1"), pid("alice")).await.unwrap();
    }
    let err = cardroom.draw_card(&rid("R1"), pid("alice")).await.unwrap_err();
    assert!(matches!(err, CardroomError::Room(RoomError::DeckExhausted(_))));
    assert_eq!(err.to_string(), "deck exhausted in room R1");
}

// =========================================================================
// Wire format
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_snapshot_wire_format() {
    let cardroom = service();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();
    cardroom.draw_card(&rid("R1"), pid("alice")).await.unwrap();
    cardroom
        .push_state(
            &rid("R1"),
            json!({ "turn": "alice" }).as_object().cloned().unwrap(),
        )
        .await
        .unwrap();

    let state = parse(&cardroom.snapshot(&rid("R1")).await.unwrap());
    assert_eq!(state["version"], 4);
    assert_eq!(state["players"]["alice"], true);
    assert_eq!(state["turn"], "alice", "payload is flattened beside reserved keys");

    let cards = state["drawn_cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    let card = &cards[0];
    assert_eq!(card["owner"], "alice");
    assert!((1..=13).contains(&card["value"].as_u64().unwrap()));
    assert!(["hearts", "diamonds", "clubs", "spades"].contains(&card["suit"].as_str().unwrap()));
}

#[tokio::test(start_paused = true)]
async fn test_push_state_json_strips_reserved_keys() {
    let cardroom = service();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    let body = br#"{"version": 100, "players": {}, "drawn_cards": [1], "note": "hi"}"#;
    cardroom.push_state_json(&rid("R1"), body).await.unwrap();

    let state = parse(&cardroom.snapshot(&rid("R1")).await.unwrap());
    assert_eq!(state["version"], 3);
    assert_eq!(state["players"], json!({ "alice": true }));
    assert_eq!(state["drawn_cards"], json!([]));
    assert_eq!(state["note"], "hi");
}

#[tokio::test(start_paused = true)]
async fn test_push_state_json_rejects_non_object() {
    let cardroom = service();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    let err = cardroom.push_state_json(&rid("R1"), b"[1, 2]").await.unwrap_err();
    assert!(matches!(err, CardroomError::Protocol(ProtocolError::InvalidMessage(_))));

    let err = cardroom.push_state_json(&rid("R1"), b"{not json").await.unwrap_err();
    assert!(matches!(err, CardroomError::Protocol(ProtocolError::Decode(_))));

    let state = parse(&cardroom.snapshot(&rid("R1")).await.unwrap());
    assert_eq!(state["version"], 2, "rejected pushes do not publish");
}

// =========================================================================
// Long poll
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_await_state_scenario() {
    let cardroom = Arc::new(service());
    let room = rid("R1");

    cardroom.join(&room, pid("alice")).await.unwrap();
    cardroom.join(&room, pid("bob")).await.unwrap();

    let poller = {
        let cardroom = Arc::clone(&cardroom);
        let room = room.clone();
        tokio::spawn(async move { cardroom.await_state(&room, 3).await })
    };
    tokio::task::yield_now().await;

    cardroom.draw_card(&room, pid("alice")).await.unwrap();
    let state = parse(&poller.await.unwrap().unwrap());
    assert_eq!(state["version"], 4);
    assert_eq!(state["drawn_cards"][0]["owner"], "alice");

    sleep(Duration::from_millis(500)).await;
    cardroom.heartbeat(&room, pid("alice")).await.unwrap();

    let state = parse(&cardroom.await_state(&room, 4).await.unwrap());
    assert_eq!(state["version"], 5);
    assert_eq!(state["players"], json!({ "alice": true, "bob": false }));
}

#[tokio::test(start_paused = true)]
async fn test_await_state_until_closed_returns_none() {
    let cardroom = service();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    let result = cardroom
        .await_state_until(&rid("R1"), 2, sleep(Duration::from_millis(100)))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_await_state_until_open_returns_encoded_state() {
    let cardroom = service();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    let body = cardroom
        .await_state_until(&rid("R1"), 1, std::future::pending())
        .await
        .unwrap()
        .expect("a newer version already exists");
    assert_eq!(parse(&body)["version"], 2);
}

#[tokio::test(start_paused = true)]
async fn test_long_poll_does_not_block_other_rooms() {
    let cardroom = Arc::new(service());
    cardroom.join(&rid("quiet"), pid("alice")).await.unwrap();

    let poller = {
        let cardroom = Arc::clone(&cardroom);
        tokio::spawn(async move { cardroom.await_state(&rid("quiet"), 2).await })
    };
    tokio::task::yield_now().await;

    // The registry lock is not held while the poller waits.
    cardroom.join(&rid("busy"), pid("bob")).await.unwrap();
    cardroom.draw_card(&rid("busy"), pid("bob")).await.unwrap();
    assert_eq!(cardroom.room_count().await, 2);
    assert!(!poller.is_finished());

    poller.abort();
}

// =========================================================================
// Builder and clock injection
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_builder_injected_clock_drives_presence() {
    let clock = Arc::new(ManualClock::new());
    let cardroom = Cardroom::builder()
        .room_config(room_config())
        .clock(clock.clone())
        .build();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    // Tokio time moves, the presence clock does not: alice stays online.
    sleep(Duration::from_millis(3500)).await;
    let state = parse(&cardroom.snapshot(&rid("R1")).await.unwrap());
    assert_eq!(state["version"], 2);

    clock.advance(Duration::from_secs(2));
    sleep(Duration::from_millis(1000)).await;
    let state = parse(&cardroom.snapshot(&rid("R1")).await.unwrap());
    assert_eq!(state["version"], 3);
    assert_eq!(state["players"]["alice"], false);
}

#[tokio::test(start_paused = true)]
async fn test_builder_tiny_sweep_interval_flips_presence_once() {
    let cardroom = Cardroom::builder()
        .room_config(RoomConfig {
            sweep: SweepConfig {
                interval: Duration::from_millis(1),
                initial_jitter_us: 0,
            },
            ..RoomConfig::default()
        })
        .build();
    cardroom.join(&rid("R1"), pid("alice")).await.unwrap();

    // Many sweeps run; only the one that sees her expire publishes.
    sleep(Duration::from_millis(1500)).await;
    let state = parse(&cardroom.snapshot(&rid("R1")).await.unwrap());
    assert_eq!(state["version"], 3);
    assert_eq!(state["players"]["alice"], false);
}
