//! TCP command server.
//!
//! Owns the listening socket and processes connections strictly one at a
//! time: accept, read one framed request, parse, execute through the session
//! runtime, hand the reply to the dispatcher, loop. Replies never travel on
//! the accepted socket; see `bridge::reply`.
//!
//! A bad request never takes the server down. When the callback port is
//! known the caller gets an error reply; otherwise the request is logged
//! and dropped.

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use crate::bridge::framing::read_frame;
use crate::bridge::protocol::parse_envelope;
use crate::bridge::reply;
use crate::bridge::runtime::SessionRequest;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bound of the request queue between server and session runtime.
    pub max_pending_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7711,
            max_pending_requests: 16,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = env::var("BRIDGE_HOST").unwrap_or(defaults.host);
        let port = env::var("BRIDGE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_requests = env::var("BRIDGE_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_requests);

        Self {
            host,
            port,
            max_pending_requests,
        }
    }
}

/// Bind the listening socket and serve requests until the session runtime
/// goes away or the listener fails.
///
/// `ready_tx` receives the bound address once listening (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    request_tx: mpsc::Sender<SessionRequest>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let addr = listener.local_addr()?;
    println!("[Bridge] listening on {addr}");
    if let Some(tx) = ready_tx {
        let _ = tx.send(addr);
    }

    loop {
        if request_tx.is_closed() {
            anyhow::bail!("session runtime stopped");
        }

        let (mut socket, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("[Bridge] accept failed: {e}");
                continue;
            }
        };

        if let Err(e) = handle_connection(&mut socket, &request_tx).await {
            eprintln!("[Bridge] request from {peer} failed: {e:#}");
        }
    }
}

/// Read, parse and execute the single request carried by one connection.
async fn handle_connection(
    socket: &mut TcpStream,
    request_tx: &mpsc::Sender<SessionRequest>,
) -> anyhow::Result<()> {
    let line = read_frame(socket).await.context("reading request frame")?;

    let envelope = match parse_envelope(&line) {
        Ok(envelope) => envelope,
        Err(err) => {
            eprintln!("[Bridge] rejected request {line:?}: {err}");
            if let (Some(port), Some(text)) = (err.callback_port, err.reply_text()) {
                reply::dispatch(port, text.to_string());
            }
            return Ok(());
        }
    };

    let (reply_tx, reply_rx) = oneshot::channel();
    request_tx
        .send(SessionRequest {
            command: envelope.command,
            reply: reply_tx,
        })
        .await
        .map_err(|_| anyhow::anyhow!("session runtime is gone"))?;
    let text = reply_rx
        .await
        .context("session runtime dropped the request")?;

    reply::dispatch(envelope.callback_port, text);
    Ok(())
}
