//! Reply delivery over a caller-supplied callback port.
//!
//! Replies travel on a brand-new outbound connection to `127.0.0.1:port`
//! rather than on the socket that carried the request; existing controllers
//! listen for exactly that. One frame per connection, at-most-once, no
//! retries. Delivery failures are logged and otherwise invisible.

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::bridge::framing::write_frame;

/// Fire-and-forget delivery on a fresh task. Never blocks the caller and
/// never reports failure back to it.
pub fn dispatch(port: u16, text: String) {
    tokio::spawn(async move {
        if let Err(e) = deliver(port, &text).await {
            eprintln!("[Bridge] reply to port {port} failed: {e}");
        }
    });
}

/// Connect to the callback port, write one reply frame, close.
pub async fn deliver(port: u16, text: &str) -> anyhow::Result<()> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await?;
    write_frame(&mut stream, text).await?;
    stream.shutdown().await?;
    Ok(())
}
