//! Hub connection supervisor.
//!
//! Owns the TCP link to the hub for one role. The supervisor runs a plain
//! three-state machine (`Disconnected -> Connecting -> Connected`) driven
//! only by connect results and stream closure, and retries forever on a fixed
//! delay. There is no read timeout: a silent hub just means nothing is being
//! typed, so only a closed or failed stream ends a session.
//!
//! Decoded events come out of an mpsc channel; the current [`LinkState`] is
//! published on a watch channel for logging and tests.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use hidswitch_core::wire::{parse_key_frame, HandshakeRequest, MouseFrame, Role};

/// Fixed pause between reconnect attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Everything the replay layer hears from the link.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
    /// One keyboard frame, already reversed into application order.
    Keys(Vec<String>),
    Mouse(MouseFrame),
}

#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub server_addr: String,
    pub token: String,
    pub role: Role,
    pub reconnect_delay: Duration,
}

/// Handle type; the supervisor itself is a spawned task.
pub struct ServerLink;

impl ServerLink {
    /// Spawns the supervisor for `config`. The task ends when the event
    /// receiver is dropped.
    pub fn start(config: LinkConfig) -> (mpsc::Receiver<LinkEvent>, watch::Receiver<LinkState>) {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (state_tx, state_rx) = watch::channel(LinkState::Disconnected);
        tokio::spawn(supervise(config, event_tx, state_tx));
        (event_rx, state_rx)
    }
}

async fn supervise(
    config: LinkConfig,
    events: mpsc::Sender<LinkEvent>,
    state: watch::Sender<LinkState>,
) {
    loop {
        let _ = state.send(LinkState::Connecting);
        match TcpStream::connect(&config.server_addr).await {
            Ok(stream) => {
                info!(addr = %config.server_addr, role = %config.role, "connected to hub");
                let _ = state.send(LinkState::Connected);
                if events.send(LinkEvent::Connected).await.is_err() {
                    return;
                }
                if let Err(error) = run_session(stream, &config, &events).await {
                    debug!(%error, "session ended");
                }
                let _ = state.send(LinkState::Disconnected);
                if events.send(LinkEvent::Disconnected).await.is_err() {
                    return;
                }
                info!(role = %config.role, "hub connection lost, will reconnect");
            }
            Err(error) => {
                let _ = state.send(LinkState::Disconnected);
                warn!(addr = %config.server_addr, %error, "connect failed, will retry");
            }
        }
        if events.is_closed() {
            return;
        }
        tokio::time::sleep(config.reconnect_delay).await;
    }
}

/// Sends the handshake, then pumps frames until the stream ends.
async fn run_session(
    mut stream: TcpStream,
    config: &LinkConfig,
    events: &mpsc::Sender<LinkEvent>,
) -> std::io::Result<()> {
    let handshake = HandshakeRequest {
        token: config.token.clone(),
        role: config.role,
    };
    stream.write_all(handshake.to_line().as_bytes()).await?;

    match config.role {
        Role::Keyboard => {
            let mut lines = BufReader::new(stream).lines();
            while let Some(line) = lines.next_line().await? {
                if events
                    .send(LinkEvent::Keys(parse_key_frame(&line)))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Ok(())
        }
        Role::Mouse => {
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 256];
            loop {
                let n = stream.read(&mut chunk).await?;
                if n == 0 {
                    return Ok(());
                }
                buffer.extend_from_slice(&chunk[..n]);
                loop {
                    match MouseFrame::decode(&buffer) {
                        Ok(Some((frame, consumed))) => {
                            buffer.drain(..consumed);
                            if events.send(LinkEvent::Mouse(frame)).await.is_err() {
                                return Ok(());
                            }
                        }
                        Ok(None) => break,
                        Err(error) => {
                            // No way to find the next frame boundary; drop the
                            // connection and let the supervisor start clean.
                            warn!(%error, "mouse stream desynchronised");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
