use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::parser::split_head;

/// Size of the read buffer before its first growth.
pub const INITIAL_BUFFER_CAPACITY: usize = 128;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("peer closed the connection after {received} bytes, before the end of the request head")]
    Incomplete { received: usize },
    #[error("request head does not fit in {limit} bytes")]
    TooLarge { limit: usize },
    #[error("failed to read from connection: {0}")]
    Io(#[from] std::io::Error),
}

/// Bytes read off a connection up to and including the header terminator,
/// plus the body bytes that arrived in the same reads.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub header: Bytes,
    pub body: Bytes,
}

/// Reads from `stream` until the header terminator shows up.
///
/// The buffer starts at [`INITIAL_BUFFER_CAPACITY`] bytes and doubles each
/// time it fills, up to `max_bytes`. No reads are issued after the terminator
/// is found, so body bytes that arrive later are never seen.
pub async fn read_request_head<R>(stream: &mut R, max_bytes: usize) -> Result<RawRequest, ReadError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::zeroed(INITIAL_BUFFER_CAPACITY.min(max_bytes));
    let mut filled = 0;

    loop {
        if filled == buf.len() {
            if buf.len() >= max_bytes {
                return Err(ReadError::TooLarge { limit: max_bytes });
            }
            let grown = (buf.len() * 2).min(max_bytes);
            tracing::trace!(from = buf.len(), to = grown, "growing request buffer");
            buf.resize(grown, 0);
        }

        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(ReadError::Incomplete { received: filled });
        }
        filled += n;

        if let Some(header_len) = split_head(&buf[..filled]).map(|(header, _)| header.len()) {
            buf.truncate(filled);
            let body = buf.split_off(header_len);
            return Ok(RawRequest {
                header: buf.freeze(),
                body: body.freeze(),
            });
        }
    }
}
