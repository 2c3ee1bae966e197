//! TCP listener for downstream replay agents.
//!
//! A downstream opens a plain TCP connection and sends exactly one JSON
//! handshake line declaring the shared token and its role. Anything else
//! closes the connection: malformed JSON, a wrong token, or any byte arriving
//! after the handshake (the stream is strictly one-way, hub to downstream).
//!
//! After the handshake the write half is handed to the [`Broadcaster`]; the
//! read half is kept only to notice the peer closing.

use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use hidswitch_core::wire::{HandshakeRequest, Role};

use crate::infrastructure::broadcast::Broadcaster;

/// Why a downstream connection was rejected or ended.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("connection closed before handshake")]
    Closed,
    #[error("handshake read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed handshake: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid token")]
    InvalidToken,
    #[error("unexpected data after handshake")]
    TrailingData,
}

/// Accepts downstream connections and feeds them into the broadcaster.
pub struct RelayListener {
    token: String,
    broadcaster: Arc<Broadcaster>,
}

impl RelayListener {
    pub fn new(token: String, broadcaster: Arc<Broadcaster>) -> Self {
        Self { token, broadcaster }
    }

    /// Accept loop. Runs until the listener socket fails.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> std::io::Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            let this = Arc::clone(&self);
            tokio::spawn(async move {
                this.handle_connection(stream, peer).await;
            });
        }
    }

    async fn handle_connection(&self, stream: TcpStream, peer: std::net::SocketAddr) {
        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let role = match handshake(&mut reader, &self.token).await {
            Ok(role) if reader.buffer().is_empty() => role,
            Ok(_) => {
                warn!(%peer, error = %HandshakeError::TrailingData, "rejecting downstream");
                return;
            }
            Err(error) => {
                warn!(%peer, %error, "rejecting downstream");
                return;
            }
        };

        let id = self.broadcaster.register(role, Box::new(write_half)).await;
        info!(%peer, %role, %id, "downstream connected");

        // The stream is one-way from here: any further byte is a protocol
        // violation, a read of zero is the peer hanging up. Either way the
        // session is over.
        let mut probe = [0u8; 1];
        match reader.read(&mut probe).await {
            Ok(0) => info!(%peer, %id, "downstream disconnected"),
            Ok(_) => warn!(%peer, %id, "downstream sent data mid-session, dropping"),
            Err(error) => info!(%peer, %id, %error, "downstream read failed"),
        }
        self.broadcaster.remove(role, id).await;
    }
}

/// Reads and validates the one-line handshake.
async fn handshake<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    token: &str,
) -> Result<Role, HandshakeError> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(HandshakeError::Closed);
    }
    let request: HandshakeRequest = serde_json::from_str(line.trim())?;
    // The token is a static shared secret compared verbatim.
    if request.token != token {
        return Err(HandshakeError::InvalidToken);
    }
    Ok(request.role)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
