//! Keyboard frame replay.
//!
//! Each incoming frame is the complete held set; this module diffs it against
//! the previous frame and injects the key-down/key-up transitions. The hub
//! relays held state only, so the agent synthesises the key-repeat cadence
//! itself: the most recently pressed key owns the single repeat slot and is
//! re-injected after an initial delay, then on a fixed interval, until it is
//! released or another key takes the slot.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::infrastructure::injection::InputInjector;
use crate::infrastructure::keymap::injector_key;

/// Pause before the first synthesised repeat.
pub const REPEAT_DELAY: Duration = Duration::from_millis(250);
/// Interval between subsequent repeats.
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(50);

struct RepeatSlot {
    key: String,
    task: JoinHandle<()>,
}

/// Held-set differ and repeat scheduler for one keyboard link.
pub struct KeyReplay {
    injector: Arc<dyn InputInjector>,
    held: Vec<String>,
    repeat: Option<RepeatSlot>,
}

impl KeyReplay {
    pub fn new(injector: Arc<dyn InputInjector>) -> Self {
        Self {
            injector,
            held: Vec::new(),
            repeat: None,
        }
    }

    /// Applies one frame, already in application order (modifiers first).
    /// Releases happen before presses so a key moving between frames is never
    /// double-held.
    pub fn apply_frame(&mut self, names: Vec<String>) {
        let released: Vec<String> = self
            .held
            .iter()
            .filter(|held| !names.contains(held))
            .cloned()
            .collect();
        for key in &released {
            self.key_up(key);
        }
        let pressed: Vec<String> = names
            .iter()
            .filter(|name| !self.held.contains(name))
            .cloned()
            .collect();
        for key in &pressed {
            self.key_down(key);
        }
        self.held = names;
    }

    /// Releases everything, as when the hub connection drops.
    pub fn release_all(&mut self) {
        self.apply_frame(Vec::new());
    }

    fn key_down(&mut self, key: &str) {
        let Some(injector_name) = injector_key(key) else {
            debug!(key, "no local mapping, skipping");
            return;
        };
        if let Err(error) = self.injector.key_toggle(injector_name, true) {
            warn!(key, %error, "key down failed");
        }

        // The newest mapped press takes over the repeat slot.
        if self.repeat.as_ref().is_some_and(|slot| slot.key == key) {
            return;
        }
        self.cancel_repeat();
        let injector = Arc::clone(&self.injector);
        let task = tokio::spawn(async move {
            tokio::time::sleep(REPEAT_DELAY).await;
            loop {
                if let Err(error) = injector.key_toggle(injector_name, true) {
                    warn!(key = injector_name, %error, "key repeat failed");
                }
                tokio::time::sleep(REPEAT_INTERVAL).await;
            }
        });
        self.repeat = Some(RepeatSlot {
            key: key.to_string(),
            task,
        });
    }

    fn key_up(&mut self, key: &str) {
        if self.repeat.as_ref().is_some_and(|slot| slot.key == key) {
            self.cancel_repeat();
        }
        let Some(injector_name) = injector_key(key) else {
            return;
        };
        if let Err(error) = self.injector.key_toggle(injector_name, false) {
            warn!(key, %error, "key up failed");
        }
    }

    fn cancel_repeat(&mut self) {
        if let Some(slot) = self.repeat.take() {
            slot.task.abort();
        }
    }
}

impl Drop for KeyReplay {
    fn drop(&mut self) {
        self.cancel_repeat();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
