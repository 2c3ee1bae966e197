//! Bluetooth-side keyboard re-encoder.
//!
//! The hub does not forward physical reports to the Bluetooth host verbatim.
//! It maintains the set of currently held semantic names and, whenever that
//! set changes, re-encodes it into boot-protocol output reports. A report is
//! only written when its bytes differ from the last report sent on the same
//! channel, so hotkey handling can mutate the set freely without flooding the
//! interrupt channel.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use hidswitch_core::{encode_keys, KeyReports, KeymapTable};

/// Errors surfaced by the re-encoder.
///
/// Transport failures are reported to the caller so the routing layer can log
/// them; they never abort the event loop.
#[derive(Debug, Error)]
pub enum RemoteKeyError {
    #[error("output report write failed: {0}")]
    Sink(String),
}

/// Destination for encoded output reports.
///
/// The production implementation is the Bluetooth interrupt channel, which
/// prepends the HID DATA/input header before each report. Tests substitute a
/// recording double.
#[async_trait]
pub trait OutputReportSink: Send + Sync {
    async fn write_report(&self, report: &[u8]) -> Result<(), String>;
}

/// Held-key state mirrored toward the Bluetooth host.
pub struct RemoteKeyboard {
    table: Arc<KeymapTable>,
    sink: Arc<dyn OutputReportSink>,
    pressed: Vec<String>,
    last_sent: KeyReports,
}

impl RemoteKeyboard {
    pub fn new(table: Arc<KeymapTable>, sink: Arc<dyn OutputReportSink>) -> Self {
        Self {
            table,
            sink,
            pressed: Vec::new(),
            last_sent: KeyReports::empty(),
        }
    }

    /// Currently held semantic names, in press order.
    pub fn pressed(&self) -> &[String] {
        &self.pressed
    }

    /// Adds `name` to the held set. Idempotent for already-held names.
    pub async fn press(&mut self, name: &str) -> Result<(), RemoteKeyError> {
        if !self.table.knows(name) {
            debug!(key = name, "ignoring unknown key name");
            return Ok(());
        }
        if self.pressed.iter().any(|held| held == name) {
            return Ok(());
        }
        self.pressed.push(name.to_string());
        self.sync().await
    }

    /// Removes `name` from the held set. Idempotent for names not held.
    pub async fn release(&mut self, name: &str) -> Result<(), RemoteKeyError> {
        let before = self.pressed.len();
        self.pressed.retain(|held| held != name);
        if self.pressed.len() == before {
            return Ok(());
        }
        self.sync().await
    }

    /// Press immediately followed by release, as used by macros and the power
    /// hotkey.
    pub async fn click(&mut self, name: &str) -> Result<(), RemoteKeyError> {
        self.press(name).await?;
        self.release(name).await
    }

    /// Replaces the whole held set with `names`, preserving their order.
    pub async fn set_pressed(&mut self, names: Vec<String>) -> Result<(), RemoteKeyError> {
        self.pressed = names;
        self.sync().await
    }

    /// Clears the held set, releasing everything on the Bluetooth side.
    pub async fn release_all(&mut self) -> Result<(), RemoteKeyError> {
        self.pressed.clear();
        self.sync().await
    }

    /// Re-encodes the held set and writes whichever of the two reports
    /// changed since the last write.
    async fn sync(&mut self) -> Result<(), RemoteKeyError> {
        let refs: Vec<&str> = self.pressed.iter().map(String::as_str).collect();
        let reports = encode_keys(&refs, &self.table);

        if reports.keys != self.last_sent.keys {
            self.sink
                .write_report(&reports.keys)
                .await
                .map_err(RemoteKeyError::Sink)?;
            self.last_sent.keys = reports.keys;
        }
        if reports.media != self.last_sent.media {
            self.sink
                .write_report(&reports.media)
                .await
                .map_err(RemoteKeyError::Sink)?;
            self.last_sent.media = reports.media;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
