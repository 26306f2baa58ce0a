//! Length-prefixed text framing.
//!
//! One frame per connection in each direction: a 2-byte big-endian length
//! followed by that many bytes of UTF-8 text. Both requests and replies use
//! the same format, so external controllers only need one codec.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum frame size. The length prefix is 16 bits, so this is the
/// protocol's hard ceiling rather than a tunable.
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

/// Write one framed message: 2-byte big-endian length, then the text.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> io::Result<()> {
    let bytes = text.as_bytes();
    if bytes.len() > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("frame too large: {} bytes (max {MAX_FRAME_SIZE})", bytes.len()),
        ));
    }
    writer.write_all(&(bytes.len() as u16).to_be_bytes()).await?;
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed message. Blocks until the frame is fully received.
///
/// Returns `UnexpectedEof` if the stream closes before or during a frame
/// and `InvalidData` if the payload is not UTF-8.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<String> {
    let mut len_buf = [0u8; 2];
    reader.read_exact(&mut len_buf).await?;
    let len = u16::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
