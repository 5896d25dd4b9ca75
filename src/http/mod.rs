//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one GET per connection, responses
//! framed by closing the connection.
//!
//! # Architecture
//!
//! - **`connection`**: the per-connection state machine
//! - **`reader`**: accumulates bytes until the header terminator
//! - **`parser`**: extracts method, target and version from the head
//! - **`request`**: the parsed request head
//! - **`response`**: status codes, the response type and its builder
//! - **`writer`**: serializes and sends a response
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for the header terminator
//!        └──────┬──────┘
//!               │ Head received          (peer closed / read error → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │    Parsing       │ ← Bad head → Writing(400)
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← Resolve target, build body
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Head, then body
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden::content::Sandbox;
//! use warden::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let sandbox = Arc::new(Sandbox::new("root")?);
//!     let listener = TcpListener::bind("127.0.0.1:8000").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let sandbox = sandbox.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, sandbox, 64 * 1024);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;
