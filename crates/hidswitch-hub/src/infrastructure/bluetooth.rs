//! Bluetooth HID host plumbing.
//!
//! The hub impersonates a Bluetooth keyboard/mouse toward a paired host. The
//! pairing machinery itself lives outside this process; what the hub needs is
//! the pair of HID channel endpoints (control and interrupt) for the host,
//! looked up through [`InputHostLocator`], and a writer for the interrupt
//! channel.
//!
//! Every interrupt write is a complete output report prefixed with the HID
//! DATA/input header byte. Losing the interrupt channel after it was up is
//! fatal for the Bluetooth path: later writes are dropped with a warning
//! while the TCP relay keeps running.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::remote_keyboard::OutputReportSink;

/// HID DATA header with the input report type, prefixed to every interrupt
/// channel payload.
pub const HID_DATA_INPUT_HEADER: u8 = 0xA1;

/// Channel endpoints of a paired host, as socket paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEndpoints {
    pub control: PathBuf,
    pub interrupt: PathBuf,
}

/// Source of the paired host's endpoints.
///
/// `Ok(None)` means no host is paired or reachable yet; the caller keeps
/// polling.
#[async_trait]
pub trait InputHostLocator: Send + Sync {
    async fn lookup(&self) -> Result<Option<HostEndpoints>, String>;
}

/// Locator backed by fixed, configured endpoint paths.
pub struct StaticLocator {
    endpoints: Option<HostEndpoints>,
}

impl StaticLocator {
    pub fn new(endpoints: Option<HostEndpoints>) -> Self {
        Self { endpoints }
    }
}

#[async_trait]
impl InputHostLocator for StaticLocator {
    async fn lookup(&self) -> Result<Option<HostEndpoints>, String> {
        Ok(self.endpoints.clone())
    }
}

/// Polls the locator until a host shows up.
pub async fn wait_for_input_host(
    locator: &dyn InputHostLocator,
    poll_interval: Duration,
) -> HostEndpoints {
    let mut announced = false;
    loop {
        match locator.lookup().await {
            Ok(Some(endpoints)) => {
                info!(?endpoints, "input host found");
                return endpoints;
            }
            Ok(None) => {
                if !announced {
                    info!("waiting for a paired input host");
                    announced = true;
                }
            }
            Err(error) => warn!(%error, "input host lookup failed"),
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// The interrupt channel as an [`OutputReportSink`].
///
/// Starts detached; reports written before [`attach`](Self::attach) are
/// dropped with a warning. The first write error detaches the channel again
/// and is treated as permanent.
pub struct InterruptChannel {
    writer: Mutex<Option<Box<dyn AsyncWrite + Send + Unpin>>>,
}

impl InterruptChannel {
    pub fn new() -> Self {
        Self {
            writer: Mutex::new(None),
        }
    }

    pub async fn attach(&self, writer: Box<dyn AsyncWrite + Send + Unpin>) {
        *self.writer.lock().await = Some(writer);
        info!("interrupt channel attached");
    }
}

impl Default for InterruptChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputReportSink for InterruptChannel {
    async fn write_report(&self, report: &[u8]) -> Result<(), String> {
        let mut guard = self.writer.lock().await;
        let Some(writer) = guard.as_mut() else {
            warn!("no interrupt channel, dropping output report");
            return Ok(());
        };

        let mut payload = Vec::with_capacity(report.len() + 1);
        payload.push(HID_DATA_INPUT_HEADER);
        payload.extend_from_slice(report);

        if let Err(error) = writer.write_all(&payload).await {
            *guard = None;
            warn!(%error, "interrupt channel lost");
            return Err(error.to_string());
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
