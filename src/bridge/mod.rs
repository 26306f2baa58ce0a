//! The TCP bridge: framing, envelope parsing, command server, session
//! runtime and reply delivery.

pub mod framing;
pub mod protocol;
pub mod reply;
pub mod runtime;
pub mod server;

pub use protocol::{parse_envelope, Command, Envelope, EnvelopeError, InfoKey};
pub use runtime::{execute, run_session, Bridge, SessionRequest};
pub use server::{run_server, ServerConfig};
