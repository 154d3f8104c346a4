use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use cardroom::prelude::*;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio::time::sleep;

type BoxError = Box<dyn Error + Send + Sync>;

// ---------------------------------------------------------------------------
// Session script
// ---------------------------------------------------------------------------

/// Two players join, alice draws a hand while bob goes quiet, and a
/// long-polling observer prints every version it sees. Returns the last
/// state the observer received.
async fn play(cardroom: Arc<Cardroom>, room: RoomId) -> Result<Value, BoxError> {
    let alice = ParticipantId::from("alice");
    let bob = ParticipantId::from("bob");

    cardroom.join(&room, alice.clone()).await?;
    cardroom.join(&room, bob.clone()).await?;

    let observer = {
        let cardroom = Arc::clone(&cardroom);
        let room = room.clone();
        tokio::spawn(async move { observe(&cardroom, &room, 3, 8).await })
    };

    for _ in 0..3 {
        cardroom.draw_card(&room, alice.clone()).await?;
    }
    let mut payload = StatePayload::new();
    payload.insert("dealer".into(), json!("alice"));
    cardroom.push_state(&room, payload).await?;

    // alice stays, bob never heartbeats again.
    for _ in 0..4 {
        sleep(Duration::from_millis(400)).await;
        cardroom.heartbeat(&room, alice.clone()).await?;
    }

    finish_observer(observer).await
}

/// Waits for the observer task. A panicked or cancelled observer is an
/// error, not an empty result.
async fn finish_observer(
    observer: JoinHandle<Result<Value, CardroomError>>,
) -> Result<Value, BoxError> {
    match observer.await {
        Ok(result) => Ok(result?),
        Err(e) => {
            tracing::error!(error = %e, "observer task failed");
            Err(e.into())
        }
    }
}

/// Long-polls from `since` until version `until` arrives.
async fn observe(
    cardroom: &Cardroom,
    room: &RoomId,
    mut since: u64,
    until: u64,
) -> Result<Value, CardroomError> {
    loop {
        let body = cardroom.await_state(room, since).await?;
        let state: Value = serde_json::from_slice(&body).map_err(ProtocolError::Decode)?;
        since = state["version"].as_u64().unwrap_or(since);
        tracing::info!(
            version = since,
            players = %state["players"],
            drawn = state["drawn_cards"].as_array().map_or(0, Vec::len),
            "observed state"
        );
        if since >= until {
            return Ok(state);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    cardroom::telemetry::init();

    let cardroom = Arc::new(Cardroom::builder().build());
    let room = RoomId::from("R1");

    let last = play(cardroom, room).await?;
    println!("{}", serde_json::to_string_pretty(&last)?);
    Ok(())
}
