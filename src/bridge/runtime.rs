//! Session-owner runtime.
//!
//! A single task owns the game session and the player interface and executes
//! commands strictly in arrival order, which is what makes session mutation
//! safe without locks. The TCP server never touches the session directly; it
//! submits a [`SessionRequest`] over a bounded channel and awaits the reply
//! text on the request's oneshot.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::bridge::protocol::{
    Command, InfoKey, LEGAL_HEADER, REPLY_MOVE_FAILURE, REPLY_MOVE_SUCCESS,
};
use crate::bridge::server::{run_server, ServerConfig};
use crate::session::{GameSession, PlayerInterface, SessionMove};

/// One command submitted by the server, with a channel for the reply text.
#[derive(Debug)]
pub struct SessionRequest {
    pub command: Command,
    pub reply: oneshot::Sender<String>,
}

/// Run the session-owner loop until every request sender is dropped.
pub async fn run_session<S, U>(mut session: S, mut ui: U, mut rx: mpsc::Receiver<SessionRequest>)
where
    S: GameSession,
    U: PlayerInterface,
{
    while let Some(request) = rx.recv().await {
        let reply = execute(request.command, &mut session, &mut ui);
        // The requester may already be gone; nothing to do about it.
        let _ = request.reply.send(reply);
    }
}

/// Execute one command against the session and render the reply text.
///
/// The mutating subset is exactly: `Move`, and the `Restart`,
/// `AddStatusText` and `SetTemporaryMessage` info keys. Everything else is
/// a pure query.
pub fn execute<S, U>(command: Command, session: &mut S, ui: &mut U) -> String
where
    S: GameSession,
    U: PlayerInterface,
{
    match command {
        Command::Move(index) => execute_move(index, session),
        Command::Legal => execute_legal(session),
        Command::Player => session.current_mover().to_string(),
        Command::Info(key, text) => execute_info(key, text, session, ui),
    }
}

fn execute_move<S: GameSession>(index: usize, session: &mut S) -> String {
    // The applied move must come from the same enumeration used to validate
    // the index; the list may differ between requests.
    match session.legal_moves().into_iter().nth(index) {
        Some(mv) => {
            session.apply_move(mv);
            REPLY_MOVE_SUCCESS.to_string()
        }
        None => REPLY_MOVE_FAILURE.to_string(),
    }
}

fn execute_legal<S: GameSession>(session: &S) -> String {
    let moves = session.legal_moves();
    let mut reply = String::from(LEGAL_HEADER);
    reply.push('\n');
    for (i, mv) in moves.iter().enumerate() {
        reply.push_str(&format!("{i} - {}\n", mv.describe_with_consequences()));
    }
    reply
}

fn execute_info<S, U>(key: InfoKey, text: Option<String>, session: &S, ui: &mut U) -> String
where
    S: GameSession,
    U: PlayerInterface,
{
    match key {
        InfoKey::GameName => session.game_name(),
        InfoKey::GamePlayers => session.player_count_description(),
        InfoKey::GameRules => session.rules_description(),
        InfoKey::DescriptionRaw => session.game_description_raw(),
        InfoKey::DescriptionExpanded => session.game_description_expanded(),
        InfoKey::GameSummary => session.game_summary(),
        InfoKey::HaveStarted => {
            if session.has_started() {
                "started".to_string()
            } else {
                "not started".to_string()
            }
        }
        InfoKey::Board => session.board_representation(),
        InfoKey::State => session.state_dump(),
        InfoKey::Equipment => session.equipment_description(),
        InfoKey::Container => session.container_description(),
        InfoKey::Restart => {
            ui.restart_game();
            "hopefully restarted".to_string()
        }
        InfoKey::AddStatusText => {
            ui.add_status_text(text.as_deref().unwrap_or("new text"));
            "added".to_string()
        }
        InfoKey::SetTemporaryMessage => {
            ui.set_temporary_message(text.as_deref().unwrap_or("temporary test message"));
            "set".to_string()
        }
    }
}

/// A running bridge: server task plus session-owner task.
pub struct Bridge {
    addr: SocketAddr,
    server: JoinHandle<()>,
    session: JoinHandle<()>,
}

impl Bridge {
    /// Start the bridge on the current tokio runtime. Resolves once the
    /// listening socket is bound (use port 0 to let the OS pick).
    pub async fn start<S, U>(config: ServerConfig, session: S, ui: U) -> anyhow::Result<Self>
    where
        S: GameSession,
        U: PlayerInterface,
    {
        let (request_tx, request_rx) = mpsc::channel(config.max_pending_requests.max(1));
        let (ready_tx, ready_rx) = oneshot::channel();

        let session_task = tokio::spawn(run_session(session, ui, request_rx));
        let server_task = tokio::spawn(async move {
            if let Err(e) = run_server(config, request_tx, Some(ready_tx)).await {
                eprintln!("[Bridge] server stopped: {e:#}");
            }
        });

        let addr = ready_rx.await.context("server failed to start")?;
        Ok(Self {
            addr,
            server: server_task,
            session: session_task,
        })
    }

    /// The bound listening address.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Tear the bridge down. In-flight reply deliveries are left to finish
    /// on their own tasks.
    pub fn shutdown(self) {
        self.server.abort();
        self.session.abort();
    }
}
