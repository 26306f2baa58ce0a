use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use tabletop_bridge::bridge::framing::{read_frame, write_frame};
use tabletop_bridge::{Bridge, GameSession, PlayerInterface, ServerConfig, SessionMove};

struct ScriptMove(String);

impl SessionMove for ScriptMove {
    fn describe_with_consequences(&self) -> String {
        self.0.clone()
    }
}

/// Two-seat session whose legal moves change every time one is applied.
struct ScriptedSession {
    step: u32,
    mover: u32,
}

impl ScriptedSession {
    fn new() -> Self {
        Self { step: 0, mover: 1 }
    }
}

impl GameSession for ScriptedSession {
    type Move = ScriptMove;

    fn legal_moves(&self) -> Vec<ScriptMove> {
        (0..3)
            .map(|i| ScriptMove(format!("(option {i} at step {})", self.step)))
            .collect()
    }

    fn apply_move(&mut self, _mv: ScriptMove) {
        self.step += 1;
        self.mover = self.mover % 2 + 1;
    }

    fn current_mover(&self) -> u32 {
        self.mover
    }

    fn game_name(&self) -> String {
        "Scripted".to_string()
    }

    fn game_description_raw(&self) -> String {
        "(game \"Scripted\")".to_string()
    }

    fn game_description_expanded(&self) -> String {
        "(game \"Scripted\" expanded)".to_string()
    }

    fn player_count_description(&self) -> String {
        "2 players: (North, South)".to_string()
    }

    fn rules_description(&self) -> String {
        "take turns".to_string()
    }

    fn game_summary(&self) -> String {
        "Scripted summary".to_string()
    }

    fn equipment_description(&self) -> String {
        "a 3x3 board".to_string()
    }

    fn container_description(&self) -> String {
        "[3x3 board]".to_string()
    }

    fn board_representation(&self) -> String {
        "...".to_string()
    }

    fn state_dump(&self) -> String {
        format!("step={} mover={}", self.step, self.mover)
    }

    fn has_started(&self) -> bool {
        self.step > 0
    }
}

/// UI hook recorder shared with the test body.
#[derive(Clone, Default)]
struct SharedUi {
    log: Arc<Mutex<Vec<String>>>,
}

impl PlayerInterface for SharedUi {
    fn restart_game(&mut self) {
        self.log.lock().unwrap().push("restart".to_string());
    }

    fn add_status_text(&mut self, text: &str) {
        self.log.lock().unwrap().push(format!("status: {text}"));
    }

    fn set_temporary_message(&mut self, text: &str) {
        self.log.lock().unwrap().push(format!("temporary: {text}"));
    }
}

async fn start_bridge() -> (Bridge, SharedUi) {
    let ui = SharedUi::default();
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_requests: 16,
    };
    let bridge = Bridge::start(config, ScriptedSession::new(), ui.clone())
        .await
        .expect("bridge should start");
    (bridge, ui)
}

/// Send one request frame naming the callback listener's port, then wait for
/// the reply to arrive on a new inbound connection to that listener.
async fn round_trip(server: SocketAddr, callback: &TcpListener, request: &str) -> String {
    let port = callback.local_addr().unwrap().port();
    let mut stream = TcpStream::connect(server).await.unwrap();
    write_frame(&mut stream, &format!("{port} {request}"))
        .await
        .unwrap();
    drop(stream);

    let (mut conn, _) = timeout(Duration::from_secs(2), callback.accept())
        .await
        .expect("timed out waiting for callback connection")
        .unwrap();
    read_frame(&mut conn).await.unwrap()
}

#[tokio::test]
async fn player_reply_is_the_current_mover() {
    let (bridge, _ui) = start_bridge().await;
    let callback = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let reply = round_trip(bridge.local_addr(), &callback, "player").await;
    assert_eq!(reply, "1");

    // A pure query leaves the session untouched.
    let reply = round_trip(bridge.local_addr(), &callback, "player").await;
    assert_eq!(reply, "1");

    bridge.shutdown();
}

#[tokio::test]
async fn valid_move_succeeds_and_advances_the_session() {
    let (bridge, _ui) = start_bridge().await;
    let callback = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = bridge.local_addr();

    let before = round_trip(addr, &callback, "legal").await;

    let reply = round_trip(addr, &callback, "move 0").await;
    assert_eq!(reply, "move success");

    let after = round_trip(addr, &callback, "legal").await;
    assert_ne!(before, after, "legal-move list should differ after a move");

    let reply = round_trip(addr, &callback, "player").await;
    assert_eq!(reply, "2", "mover should have changed");

    bridge.shutdown();
}

#[tokio::test]
async fn out_of_range_move_fails_and_mutates_nothing() {
    let (bridge, _ui) = start_bridge().await;
    let callback = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = bridge.local_addr();

    let before = round_trip(addr, &callback, "legal").await;

    let reply = round_trip(addr, &callback, "move 99").await;
    assert_eq!(reply, "move failure");

    let after = round_trip(addr, &callback, "legal").await;
    assert_eq!(before, after);

    bridge.shutdown();
}

#[tokio::test]
async fn legal_reply_has_header_and_one_indexed_line_per_move() {
    let (bridge, _ui) = start_bridge().await;
    let callback = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let reply = round_trip(bridge.local_addr(), &callback, "legal").await;
    let lines: Vec<&str> = reply.lines().collect();

    assert_eq!(lines[0], "legal");
    assert_eq!(lines.len() - 1, 3);
    for (i, line) in lines[1..].iter().enumerate() {
        assert!(line.starts_with(&format!("{i} - ")), "line {i}: {line}");
    }

    bridge.shutdown();
}

#[tokio::test]
async fn info_game_name_round_trip() {
    let (bridge, _ui) = start_bridge().await;
    let callback = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let reply = round_trip(bridge.local_addr(), &callback, "info game_name").await;
    assert_eq!(reply, "Scripted");

    bridge.shutdown();
}

#[tokio::test]
async fn info_have_started_flips_after_a_move() {
    let (bridge, _ui) = start_bridge().await;
    let callback = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = bridge.local_addr();

    let reply = round_trip(addr, &callback, "info have_started").await;
    assert_eq!(reply, "not started");

    let _ = round_trip(addr, &callback, "move 0").await;

    let reply = round_trip(addr, &callback, "info have_started").await;
    assert_eq!(reply, "started");

    bridge.shutdown();
}

#[tokio::test]
async fn restart_and_status_text_reach_the_ui_hooks() {
    let (bridge, ui) = start_bridge().await;
    let callback = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = bridge.local_addr();

    let reply = round_trip(addr, &callback, "info game_restart").await;
    assert_eq!(reply, "hopefully restarted");

    let reply = round_trip(addr, &callback, "info addTextToStatusPanel your turn").await;
    assert_eq!(reply, "added");

    let log = ui.log.lock().unwrap().clone();
    assert_eq!(log, vec!["restart", "status: your turn"]);

    bridge.shutdown();
}

#[tokio::test]
async fn back_to_back_requests_each_get_their_own_reply() {
    let (bridge, _ui) = start_bridge().await;
    let addr = bridge.local_addr();

    // Distinct callback listeners so each reply is attributable.
    let cb_a = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let cb_b = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port_a = cb_a.local_addr().unwrap().port();
    let port_b = cb_b.local_addr().unwrap().port();

    let mut s1 = TcpStream::connect(addr).await.unwrap();
    write_frame(&mut s1, &format!("{port_a} player")).await.unwrap();
    let mut s2 = TcpStream::connect(addr).await.unwrap();
    write_frame(&mut s2, &format!("{port_b} info game_name"))
        .await
        .unwrap();
    drop(s1);
    drop(s2);

    let (mut conn_a, _) = timeout(Duration::from_secs(2), cb_a.accept())
        .await
        .expect("first reply timed out")
        .unwrap();
    assert_eq!(read_frame(&mut conn_a).await.unwrap(), "1");

    let (mut conn_b, _) = timeout(Duration::from_secs(2), cb_b.accept())
        .await
        .expect("second reply timed out")
        .unwrap();
    assert_eq!(read_frame(&mut conn_b).await.unwrap(), "Scripted");

    bridge.shutdown();
}
