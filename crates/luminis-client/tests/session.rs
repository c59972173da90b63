use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use luminis_client::{
    Channel, ClientConfig, ClientError, DecisionRoutine, Session, SessionSummary,
};
use luminis_game::{Point, World};
use serde_json::json;
use tokio::io::{duplex, DuplexStream};
use tokio::task::JoinHandle;

fn config(max_response_time_ms: u64) -> ClientConfig {
    ClientConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_response_time_ms,
        map_name: "test".to_string(),
        player_uuid: "Red".to_string(),
    }
}

fn initial_state() -> String {
    json!({
        "tiles": [["TILE", "TILE", "TILE"], ["TILE", "WALL", "TILE"], ["TILE", "TILE", "TILE"]],
        "uuidToOrderedDirections": {"Red": ["NORTH", "EAST", "SOUTH", "WEST"]}
    })
    .to_string()
}

fn turn() -> String {
    json!({
        "playerUUIDToPlayerTypeMap": {
            "Red": {
                "friendlyUnits": [{
                    "team": "RED", "uuid": "r-1", "LF": 3, "position": {"x": 0, "y": 0},
                    "lastMoveResult": "MOVE_SUCCESS", "mergedUnitUuids": []
                }],
                "friendlyTilePositions": [[0, 0, 1]],
                "friendlyNestPositions": []
            },
            "Blue": {
                "friendlyUnits": [{
                    "team": "BLUE", "uuid": "b-1", "LF": 3, "position": {"x": 2, "y": 2},
                    "lastMoveResult": "MOVE_SUCCESS", "mergedUnitUuids": []
                }],
                "friendlyTilePositions": [[2, 2, 1]],
                "friendlyNestPositions": []
            }
        },
        "playerIndexToUUIDMap": {"0": "Red", "1": "Blue"}
    })
    .to_string()
}

fn step_east(world: &World) -> anyhow::Result<()> {
    world.move_unit("r-1", Point::new(1, 0))?;
    Ok(())
}

/// Spawns a session on one end of an in-memory pipe; the test plays the server on the other.
fn start(
    max_response_time_ms: u64,
    routine: impl DecisionRoutine,
) -> (
    Channel<DuplexStream>,
    JoinHandle<Result<SessionSummary, ClientError>>,
) {
    let (client, server) = duplex(64 * 1024);
    let session = Session::new(client, config(max_response_time_ms), routine);
    (Channel::new(server), tokio::spawn(session.run()))
}

async fn handshake(server: &mut Channel<DuplexStream>) {
    server.send("BEGIN").await.expect("send");
    assert_eq!(server.receive().await.expect("identity"), "Red");
    server.send("GET_READY").await.expect("send");
    server.send(&initial_state()).await.expect("send");
    assert_eq!(server.receive().await.expect("ready"), "READY");
}

async fn play(server: &mut Channel<DuplexStream>) -> String {
    server.send("MOVE").await.expect("send");
    server.send(&turn()).await.expect("send");
    server.receive().await.expect("answer")
}

#[tokio::test]
async fn full_match() {
    let (mut server, session) = start(1_000, step_east);

    // Blank keep-alive frames are ignored.
    server.send("  \n").await.expect("send");
    handshake(&mut server).await;

    let answer: serde_json::Value = serde_json::from_str(&play(&mut server).await).expect("json");
    let record = &answer["uuidToCoreMap"]["r-1"];
    assert_eq!(record["nextMoveType"], "MOVE");
    assert_eq!(record["nextMoveTarget"], json!({"x": 1, "y": 0}));
    assert_eq!(record["team"], "RED");

    server.send("END").await.expect("send");
    let summary = session.await.expect("join").expect("clean end");
    assert_eq!(summary, SessionSummary { turns: 1, timeouts: 0 });
}

#[tokio::test]
async fn slow_routine_gets_no_response_on_time() {
    let slow = |_: &World| -> anyhow::Result<()> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(())
    };
    let (mut server, session) = start(50, slow);
    handshake(&mut server).await;

    let sent = Instant::now();
    assert_eq!(play(&mut server).await, "NO_RESPONSE");
    let elapsed = sent.elapsed();
    assert!(elapsed < Duration::from_millis(150), "{elapsed:?}");

    server.send("END").await.expect("send");
    let summary = session.await.expect("join").expect("clean end");
    assert_eq!(summary.timeouts, 1);
}

#[tokio::test]
async fn overlapping_slow_turns_share_one_execution() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let routine = move |world: &World| -> anyhow::Result<()> {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(300));
        }
        step_east(world)
    };
    let (mut server, session) = start(200, routine);
    handshake(&mut server).await;

    assert_eq!(play(&mut server).await, "NO_RESPONSE");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Turn 2 is answered with turn 1's late result; no second execution was started.
    let second = play(&mut server).await;
    assert!(second.contains("\"r-1\""), "{second}");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Once it has landed, the next turn starts a fresh execution.
    let third = play(&mut server).await;
    assert!(third.contains("\"r-1\""), "{third}");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    server.send("END").await.expect("send");
    let summary = session.await.expect("join").expect("clean end");
    assert_eq!(summary, SessionSummary { turns: 3, timeouts: 1 });
}

#[tokio::test]
async fn failing_routine_answers_an_empty_map() {
    let failing = |_: &World| -> anyhow::Result<()> { anyhow::bail!("no idea what to do") };
    let (mut server, session) = start(1_000, failing);
    handshake(&mut server).await;

    assert_eq!(play(&mut server).await, r#"{"uuidToCoreMap":{}}"#);

    server.send("END").await.expect("send");
    session.await.expect("join").expect("routine failures are not fatal");
}

#[tokio::test]
async fn panicking_routine_answers_an_empty_map() {
    let panicking = |_: &World| -> anyhow::Result<()> { panic!("bot crashed") };
    let (mut server, session) = start(1_000, panicking);
    handshake(&mut server).await;

    assert_eq!(play(&mut server).await, r#"{"uuidToCoreMap":{}}"#);

    server.send("END").await.expect("send");
    session.await.expect("join").expect("routine panics are not fatal");
}

#[tokio::test]
async fn unknown_signal_is_fatal() {
    let (mut server, session) = start(1_000, step_east);
    server.send("BEGIN").await.expect("send");
    server.receive().await.expect("identity");
    server.send("SURRENDER").await.expect("send");

    let err = session.await.expect("join").expect_err("protocol error");
    assert!(matches!(err, ClientError::Protocol { token } if token == "SURRENDER"));
    // The client closed its end.
    assert!(matches!(server.receive().await, Err(ClientError::Closed)));
}

#[tokio::test]
async fn client_side_tokens_from_the_server_are_fatal() {
    let (mut server, session) = start(1_000, step_east);
    server.send("READY").await.expect("send");

    let err = session.await.expect("join").expect_err("protocol error");
    assert!(matches!(err, ClientError::Protocol { token } if token == "READY"));
}

#[tokio::test]
async fn move_before_get_ready_is_out_of_order() {
    let (mut server, session) = start(1_000, step_east);
    server.send("BEGIN").await.expect("send");
    server.receive().await.expect("identity");
    server.send("MOVE").await.expect("send");

    let err = session.await.expect("join").expect_err("out of order");
    assert!(matches!(err, ClientError::OutOfOrder { .. }));
}

#[tokio::test]
async fn undecodable_turn_is_fatal() {
    let (mut server, session) = start(1_000, step_east);
    handshake(&mut server).await;
    server.send("MOVE").await.expect("send");
    server.send("{not json").await.expect("send");

    let err = session.await.expect("join").expect_err("decode error");
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn server_hang_up_is_reported_as_closed() {
    let (server, session) = start(1_000, step_east);
    drop(server);

    let err = session.await.expect("join").expect_err("closed");
    assert!(matches!(err, ClientError::Closed));
}
