use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::content::{Sandbox, respond};
use crate::http::parser::parse_request_head;
use crate::http::reader::{RawRequest, ReadError, read_request_head};
use crate::http::request::RequestHead;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// One accepted client, served exactly one request.
pub struct Connection<S> {
    stream: S,
    sandbox: Arc<Sandbox>,
    max_request_bytes: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Parsing(RawRequest),
    Responding(RequestHead),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, sandbox: Arc<Sandbox>, max_request_bytes: usize) -> Self {
        Self {
            stream,
            sandbox,
            max_request_bytes,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection from the first read to close.
    ///
    /// Errors are scoped to this connection; the caller only logs them.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    match read_request_head(&mut self.stream, self.max_request_bytes).await {
                        Ok(raw) => {
                            tracing::debug!(
                                header_len = raw.header.len(),
                                body_len = raw.body.len(),
                                "received request head"
                            );
                            self.state = ConnectionState::Parsing(raw);
                        }
                        Err(ReadError::Incomplete { received }) => {
                            // Client closed connection
                            tracing::debug!(received, "connection closed before request head");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }

                ConnectionState::Parsing(raw) => {
                    match parse_request_head(raw.header, raw.body) {
                        Ok(head) => {
                            self.state = ConnectionState::Responding(head);
                        }
                        Err(e) => {
                            tracing::info!("rejecting request: {}", e);
                            let writer = ResponseWriter::new(Response::bad_request());
                            self.state = ConnectionState::Writing(writer);
                        }
                    }
                }

                ConnectionState::Responding(head) => {
                    let response = respond(&self.sandbox, &head).await;
                    tracing::info!(
                        method = head.method.as_str(),
                        uri = %head.target,
                        status = response.status.as_u16(),
                        bytes = response.body.len(),
                        "request served"
                    );
                    self.state = ConnectionState::Writing(ResponseWriter::new(response));
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!("shutdown after response failed: {}", e);
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }
}
