//! Local TCP bridge for driving and inspecting a running tabletop game
//! session from an external process.
//!
//! The bridge accepts single-line text requests on a listening socket,
//! executes them against a game session owned by the embedding application,
//! and pushes each reply back on a *new* outbound connection to a callback
//! port the requester named inside the request itself.
//!
//! # Protocol Overview
//!
//! Every request is one framed message (2-byte big-endian length prefix,
//! then UTF-8 text) on a fresh connection:
//!
//! ```text
//! "PORT ACTION [EXTRA]"
//! ```
//!
//! - `PORT`: decimal callback port the requester is listening on. Classic
//!   controllers send exactly 4 digits; any valid port is accepted.
//! - `ACTION`: one of `move`, `legal`, `player`, `info`.
//! - `EXTRA`: move index (for `move`) or info key (for `info`).
//!
//! The reply is free-form text with the same framing, delivered over a new
//! connection to `127.0.0.1:PORT`. At most once, no acknowledgement.
//!
//! # Example Flow
//!
//! ```text
//! Controller -> Bridge (port 7711): "5555 legal"
//! Bridge -> Controller (port 5555): "legal\n0 - (Move A1-A2)\n1 - (Move B1-B2)\n"
//! Controller -> Bridge (port 7711): "5555 move 1"
//! Bridge -> Controller (port 5555): "move success"
//! Controller -> Bridge (port 7711): "5555 player"
//! Bridge -> Controller (port 5555): "2"
//! ```
//!
//! # Architecture
//!
//! - [`session`] holds the collaborator traits the embedding application
//!   implements: [`session::GameSession`] (rules engine queries and move
//!   application) and [`session::PlayerInterface`] (UI side effects).
//! - [`bridge::runtime`] runs a single owner task that serializes every
//!   command against the session; the server submits requests over a
//!   channel and never touches session state directly.
//! - [`bridge::server`] owns the listening socket and handles one framed
//!   request per accepted connection, strictly sequentially. A malformed
//!   request is answered (or logged) and the server keeps listening.
//! - [`bridge::reply`] delivers each reply on its own spawned task so a
//!   slow or unreachable callback port never stalls the accept loop.
//!
//! # Environment Variables
//!
//! - `BRIDGE_HOST`: bind address (default: "127.0.0.1")
//! - `BRIDGE_PORT`: port number (default: 7711)
//! - `BRIDGE_MAX_PENDING`: bound of the request queue (default: 16)

pub mod bridge;
pub mod session;

pub use bridge::protocol::{parse_envelope, Command, Envelope, InfoKey};
pub use bridge::runtime::{run_session, Bridge, SessionRequest};
pub use bridge::server::{run_server, ServerConfig};
pub use session::{GameSession, PlayerInterface, SessionMove};
