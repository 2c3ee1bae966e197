//! Fan-out of translated events to downstream replay agents.
//!
//! Downstreams are kept in two independent sets keyed by role; a broadcast
//! writes the frame to every socket of the matching set. A failed write means
//! the downstream is gone: the socket is dropped from the set and the
//! broadcast carries on with the rest.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use hidswitch_core::wire::{encode_key_frame, MouseFrame, Role};

use crate::application::route_reports::DownstreamBroadcaster;

type DownstreamWriter = Box<dyn AsyncWrite + Send + Unpin>;

#[derive(Default)]
struct Downstreams {
    keyboard: HashMap<Uuid, DownstreamWriter>,
    mouse: HashMap<Uuid, DownstreamWriter>,
}

impl Downstreams {
    fn set_for(&mut self, role: Role) -> &mut HashMap<Uuid, DownstreamWriter> {
        match role {
            Role::Keyboard => &mut self.keyboard,
            Role::Mouse => &mut self.mouse,
        }
    }
}

/// Registry and fan-out for connected downstreams.
pub struct Broadcaster {
    inner: Mutex<Downstreams>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Downstreams::default()),
        }
    }

    /// Adds a handshaken downstream and returns its registry id.
    pub async fn register(&self, role: Role, writer: DownstreamWriter) -> Uuid {
        let id = Uuid::new_v4();
        let mut inner = self.inner.lock().await;
        inner.set_for(role).insert(id, writer);
        info!(%id, %role, "downstream registered");
        id
    }

    /// Drops a downstream, if it is still registered.
    pub async fn remove(&self, role: Role, id: Uuid) {
        let mut inner = self.inner.lock().await;
        if inner.set_for(role).remove(&id).is_some() {
            info!(%id, %role, "downstream removed");
        }
    }

    /// Number of registered downstreams for `role`.
    pub async fn len(&self, role: Role) -> usize {
        let mut inner = self.inner.lock().await;
        inner.set_for(role).len()
    }

    async fn send_to_role(&self, role: Role, frame: &[u8]) {
        let mut inner = self.inner.lock().await;
        let set = inner.set_for(role);
        let mut dead = Vec::new();
        for (id, writer) in set.iter_mut() {
            if let Err(error) = writer.write_all(frame).await {
                debug!(%id, %error, "downstream write failed, dropping");
                dead.push(*id);
            }
        }
        for id in dead {
            set.remove(&id);
            info!(%id, %role, "downstream removed");
        }
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DownstreamBroadcaster for Broadcaster {
    async fn broadcast_keys(&self, names: &[String]) {
        let frame = encode_key_frame(names);
        self.send_to_role(Role::Keyboard, frame.as_bytes()).await;
    }

    async fn broadcast_mouse(&self, frame: &MouseFrame) {
        self.send_to_role(Role::Mouse, &frame.encode()).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
