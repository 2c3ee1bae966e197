//! Logging injector for headless runs and tests.

use std::sync::Mutex;

use tracing::debug;

use super::{InjectionError, InputInjector, MouseButton};

/// Injects nothing; logs every call and tracks a virtual pointer position so
/// relative movement still behaves.
pub struct MockInjector {
    position: Mutex<(i32, i32)>,
}

impl MockInjector {
    pub fn new() -> Self {
        Self {
            position: Mutex::new((0, 0)),
        }
    }
}

impl Default for MockInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputInjector for MockInjector {
    fn key_toggle(&self, key: &str, down: bool) -> Result<(), InjectionError> {
        debug!(key, down, "mock key toggle");
        Ok(())
    }

    fn mouse_position(&self) -> Result<(i32, i32), InjectionError> {
        Ok(*self.position.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn mouse_move(&self, x: i32, y: i32) -> Result<(), InjectionError> {
        debug!(x, y, "mock mouse move");
        *self.position.lock().unwrap_or_else(|e| e.into_inner()) = (x, y);
        Ok(())
    }

    fn mouse_toggle(&self, button: MouseButton, down: bool) -> Result<(), InjectionError> {
        debug!(?button, down, "mock mouse toggle");
        Ok(())
    }

    fn scroll(&self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        debug!(dx, dy, "mock scroll");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
