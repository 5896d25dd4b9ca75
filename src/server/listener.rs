use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::config::Config;
use crate::content::Sandbox;
use crate::http::connection::Connection;

/// Pause after a failed accept, so a persistent error such as fd exhaustion
/// does not spin the loop.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Binds the configured port on all IPv4 addresses with the configured backlog.
pub fn bind(cfg: &Config) -> anyhow::Result<TcpListener> {
    let addr = cfg.listen_addr();
    let socket = TcpSocket::new_v4().context("failed to create socket")?;
    socket
        .set_reuseaddr(true)
        .context("failed to set SO_REUSEADDR")?;
    socket
        .bind(addr)
        .with_context(|| format!("failed to bind {}", addr))?;
    let listener = socket
        .listen(cfg.accept_backlog)
        .with_context(|| format!("failed to listen on {}", addr))?;
    Ok(listener)
}

/// Accepts connections forever, one task each.
///
/// At most `max_connections` tasks run at once. The loop waits for a free
/// slot before accepting, leaving further clients in the kernel backlog.
pub async fn serve(
    listener: TcpListener,
    sandbox: Arc<Sandbox>,
    max_connections: usize,
    max_request_bytes: usize,
) -> anyhow::Result<()> {
    let slots = Arc::new(Semaphore::new(max_connections));

    loop {
        let permit = slots
            .clone()
            .acquire_owned()
            .await
            .context("connection semaphore closed")?;

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Accept failed: {}", e);
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let sandbox = sandbox.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, sandbox, max_request_bytes);
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {:#}", peer, e);
            }
            drop(permit);
        });
    }
}

/// Opens the sandbox, binds, and serves until the task is cancelled.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let sandbox = Sandbox::new(&cfg.sandbox_root).with_context(|| {
        format!("sandbox root {} is not accessible", cfg.sandbox_root.display())
    })?;
    let listener = bind(cfg)?;
    info!(
        root = %sandbox.root().display(),
        backlog = cfg.accept_backlog,
        max_connections = cfg.max_connections,
        "Listening on {}",
        cfg.listen_addr()
    );

    serve(
        listener,
        Arc::new(sandbox),
        cfg.max_connections,
        cfg.max_request_bytes,
    )
    .await
}
