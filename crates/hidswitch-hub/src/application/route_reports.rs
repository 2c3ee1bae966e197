//! Input routing state machine.
//!
//! Every raw report from the physical keyboard/mouse passes through here
//! exactly once. The router keeps two independent routing flags, evaluates
//! hotkey chords on the physical keyboard, and then forwards the event either
//! to the Bluetooth re-encoder or to the downstream broadcaster.
//!
//! Hotkeys are edge-triggered: a chord fires once when the held set first
//! matches it and must be fully released before it can fire again. The chord
//! event itself is consumed and never routed. Precedence when several chords
//! match at once: macro, power key, keyboard toggle, mouse toggle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use hidswitch_core::{decode_keys, decode_modifiers, decode_mouse, KeymapTable, MouseFrame, ReportError};

use crate::application::remote_keyboard::{OutputReportSink, RemoteKeyboard};
use crate::infrastructure::raw_input::RawReport;

/// Fan-out half of the TCP relay, seen from the router.
///
/// Implementations swallow per-socket write failures (dropping the dead
/// socket); a broadcast itself never fails.
#[async_trait]
pub trait DownstreamBroadcaster: Send + Sync {
    /// Sends one keyboard frame holding `names` to every keyboard downstream.
    async fn broadcast_keys(&self, names: &[String]);
    /// Sends one binary mouse frame to every mouse downstream.
    async fn broadcast_mouse(&self, frame: &MouseFrame);
}

/// One step of the configured macro script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MacroStep {
    /// Press-and-release of a single semantic key name.
    Click { click: String },
    /// Pause between steps.
    Delay { delay_ms: u64 },
}

/// Hotkey chords, loaded from the hub configuration file.
///
/// The macro combo and script carry operator-chosen content (the script often
/// types a credential), so none of it has built-in values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Chord that starts the macro script. Empty disables the macro.
    #[serde(default)]
    pub macro_combo: Vec<String>,
    /// Steps replayed toward the Bluetooth host when the macro fires.
    #[serde(default)]
    pub macro_script: Vec<MacroStep>,
    /// Single key clicked through to the Bluetooth host when pressed.
    #[serde(default = "default_power_key")]
    pub power_key: String,
    /// Chord that flips keyboard routing.
    #[serde(default = "default_toggle_keyboard_combo")]
    pub toggle_keyboard_combo: Vec<String>,
    /// Chord that flips mouse routing.
    #[serde(default = "default_toggle_mouse_combo")]
    pub toggle_mouse_combo: Vec<String>,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            macro_combo: Vec::new(),
            macro_script: Vec::new(),
            power_key: default_power_key(),
            toggle_keyboard_combo: default_toggle_keyboard_combo(),
            toggle_mouse_combo: default_toggle_mouse_combo(),
        }
    }
}

fn default_power_key() -> String {
    "POWER".to_string()
}

fn default_toggle_keyboard_combo() -> Vec<String> {
    vec!["LEFT_CONTROL".to_string(), "LEFT_ALT".to_string(), "K".to_string()]
}

fn default_toggle_mouse_combo() -> Vec<String> {
    vec!["LEFT_CONTROL".to_string(), "LEFT_ALT".to_string(), "M".to_string()]
}

/// Where each input category currently goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingState {
    pub keyboard_to_bluetooth: bool,
    pub mouse_to_bluetooth: bool,
}

impl Default for RoutingState {
    /// Start-up split: keyboard toward the TCP downstreams, mouse toward the
    /// Bluetooth host.
    fn default() -> Self {
        Self {
            keyboard_to_bluetooth: false,
            mouse_to_bluetooth: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hotkey {
    Macro,
    Power,
    ToggleKeyboard,
    ToggleMouse,
}

/// The routing state machine. Owned by the single report dispatch loop.
pub struct InputRouter {
    table: Arc<KeymapTable>,
    remote: Arc<Mutex<RemoteKeyboard>>,
    broadcaster: Arc<dyn DownstreamBroadcaster>,
    raw_sink: Arc<dyn OutputReportSink>,
    hotkeys: HotkeyConfig,
    mouse_speed: f64,
    routing: RoutingState,
    last_keys: Vec<String>,
    last_media: Vec<String>,
    last_button: u8,
    active_hotkey: Option<Hotkey>,
}

impl InputRouter {
    pub fn new(
        table: Arc<KeymapTable>,
        remote: Arc<Mutex<RemoteKeyboard>>,
        broadcaster: Arc<dyn DownstreamBroadcaster>,
        raw_sink: Arc<dyn OutputReportSink>,
        hotkeys: HotkeyConfig,
        mouse_speed: f64,
    ) -> Self {
        Self {
            table,
            remote,
            broadcaster,
            raw_sink,
            hotkeys,
            mouse_speed,
            routing: RoutingState::default(),
            last_keys: Vec::new(),
            last_media: Vec::new(),
            last_button: 0,
            active_hotkey: None,
        }
    }

    pub fn routing(&self) -> RoutingState {
        self.routing
    }

    /// Routes one raw report. Transport failures are logged here and never
    /// abort the dispatch loop.
    pub async fn handle_report(&mut self, report: RawReport) {
        match report {
            RawReport::Keyboard(bytes) => self.handle_keyboard(bytes).await,
            RawReport::Media(bytes) => self.handle_media(bytes).await,
            RawReport::Mouse(bytes) => self.handle_mouse(bytes).await,
        }
    }

    async fn handle_keyboard(&mut self, bytes: [u8; 9]) {
        let keys = match decode_keys(&bytes, &self.table) {
            Ok(keys) => keys,
            Err(ReportError::KeyRollover) => {
                debug!("discarding rollover report");
                return;
            }
            Err(error) => {
                warn!(%error, "undecodable keyboard report");
                return;
            }
        };
        let mut pressed: Vec<String> = keys.iter().map(|s| s.to_string()).collect();
        pressed.extend(
            decode_modifiers(bytes[1], &self.table.modifiers)
                .iter()
                .map(|s| s.to_string()),
        );
        self.last_keys = pressed;

        if self.consume_hotkeys().await {
            return;
        }

        // Keyboard events carry the key set first, then the held media keys.
        let mut names = self.last_keys.clone();
        names.extend(self.last_media.iter().cloned());
        self.route_key_event(names).await;
    }

    async fn handle_media(&mut self, bytes: [u8; 4]) {
        let mut pressed: Vec<String> = decode_modifiers(bytes[1], &self.table.media1)
            .iter()
            .map(|s| s.to_string())
            .collect();
        pressed.extend(decode_modifiers(bytes[2], &self.table.media2).iter().map(|s| s.to_string()));
        pressed.extend(decode_modifiers(bytes[3], &self.table.media3).iter().map(|s| s.to_string()));
        self.last_media = pressed;

        if self.consume_hotkeys().await {
            return;
        }

        // Media events carry the media set first, then the held regular keys.
        let mut names = self.last_media.clone();
        names.extend(self.last_keys.iter().cloned());
        self.route_key_event(names).await;
    }

    async fn route_key_event(&mut self, names: Vec<String>) {
        if self.routing.keyboard_to_bluetooth {
            if let Err(error) = self.remote.lock().await.set_pressed(names).await {
                warn!(%error, "bluetooth key sync failed");
            }
        } else {
            self.broadcaster.broadcast_keys(&names).await;
        }
    }

    async fn handle_mouse(&mut self, bytes: [u8; 7]) {
        let report = decode_mouse(&bytes);
        if self.routing.mouse_to_bluetooth {
            // Pass-through: the Bluetooth host consumes the report format the
            // physical mouse produces, so no re-encode is needed.
            if let Err(error) = self.raw_sink.write_report(&bytes).await {
                warn!(%error, "bluetooth mouse write failed");
            }
        } else {
            let dx = scale_delta(report.x, self.mouse_speed);
            let dy = scale_delta(report.y, self.mouse_speed);
            if dx != 0 || dy != 0 {
                self.broadcaster
                    .broadcast_mouse(&MouseFrame::Move { dx, dy })
                    .await;
            }
            if report.button != self.last_button
                || report.y_scroll != 0
                || report.x_scroll != 0
            {
                self.broadcaster
                    .broadcast_mouse(&MouseFrame::Buttons {
                        button: report.button,
                        y_scroll: report.y_scroll,
                        x_scroll: report.x_scroll,
                    })
                    .await;
            }
        }
        self.last_button = report.button;
    }

    // ── Hotkeys ───────────────────────────────────────────────────────────────

    /// Evaluates hotkey chords against everything currently held. Returns
    /// `true` when the event was consumed by a chord.
    async fn consume_hotkeys(&mut self) -> bool {
        let matched = self.match_hotkey();
        match (matched, self.active_hotkey) {
            (None, _) => {
                self.active_hotkey = None;
                false
            }
            // Still inside a chord that already fired.
            (Some(matched), Some(active)) if matched == active => true,
            (Some(matched), _) => {
                self.active_hotkey = Some(matched);
                self.fire(matched).await;
                true
            }
        }
    }

    fn match_hotkey(&self) -> Option<Hotkey> {
        let held = |name: &String| {
            self.last_keys.iter().any(|k| k == name) || self.last_media.iter().any(|k| k == name)
        };
        let chord = |combo: &[String]| !combo.is_empty() && combo.iter().all(held);

        if chord(&self.hotkeys.macro_combo) {
            Some(Hotkey::Macro)
        } else if !self.hotkeys.power_key.is_empty() && held(&self.hotkeys.power_key) {
            Some(Hotkey::Power)
        } else if chord(&self.hotkeys.toggle_keyboard_combo) {
            Some(Hotkey::ToggleKeyboard)
        } else if chord(&self.hotkeys.toggle_mouse_combo) {
            Some(Hotkey::ToggleMouse)
        } else {
            None
        }
    }

    async fn fire(&mut self, hotkey: Hotkey) {
        match hotkey {
            Hotkey::Macro => {
                info!("macro chord matched, replaying script");
                let remote = Arc::clone(&self.remote);
                let script = self.hotkeys.macro_script.clone();
                tokio::spawn(async move {
                    for step in script {
                        match step {
                            MacroStep::Click { click } => {
                                if let Err(error) = remote.lock().await.click(&click).await {
                                    warn!(%error, key = %click, "macro click failed");
                                }
                            }
                            MacroStep::Delay { delay_ms } => {
                                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                            }
                        }
                    }
                });
            }
            Hotkey::Power => {
                info!("power key pressed, clicking through");
                if let Err(error) = self.remote.lock().await.click(&self.hotkeys.power_key).await {
                    warn!(%error, "power click failed");
                }
            }
            Hotkey::ToggleKeyboard => {
                self.routing.keyboard_to_bluetooth = !self.routing.keyboard_to_bluetooth;
                info!(
                    to_bluetooth = self.routing.keyboard_to_bluetooth,
                    "keyboard routing toggled"
                );
                // Release everything on both sides so no key stays latched in
                // the destination we just switched away from.
                if let Err(error) = self.remote.lock().await.release_all().await {
                    warn!(%error, "bluetooth release-all failed");
                }
                self.broadcaster.broadcast_keys(&[]).await;
            }
            Hotkey::ToggleMouse => {
                self.routing.mouse_to_bluetooth = !self.routing.mouse_to_bluetooth;
                info!(
                    to_bluetooth = self.routing.mouse_to_bluetooth,
                    "mouse routing toggled"
                );
            }
        }
    }
}

/// Applies the configured speed factor to a physical delta and saturates it
/// into the downstream `i8` range.
fn scale_delta(value: i16, speed: f64) -> i8 {
    let scaled = (f64::from(value) * speed).round();
    scaled.clamp(f64::from(i8::MIN), f64::from(i8::MAX)) as i8
}

// ── Tests ─────────────────────────────────────────────────────────────────────
