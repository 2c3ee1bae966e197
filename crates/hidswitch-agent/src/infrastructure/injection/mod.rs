//! Platform input injection boundary.
//!
//! Everything above this trait is platform-independent; an implementation
//! wraps whatever synthesis API the desktop session offers. The bundled
//! [`MockInjector`] logs instead of injecting and backs the test suite.
//!
//! [`MockInjector`]: mock::MockInjector

pub mod mock;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("platform injection failed: {0}")]
    Platform(String),
}

/// Mouse buttons the wire protocol can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Picks the button out of a wire button mask, lowest bit first.
    /// `None` for an empty mask.
    pub fn from_mask(mask: u8) -> Option<Self> {
        if mask & 0x01 != 0 {
            Some(MouseButton::Left)
        } else if mask & 0x02 != 0 {
            Some(MouseButton::Right)
        } else if mask & 0x04 != 0 {
            Some(MouseButton::Middle)
        } else {
            None
        }
    }
}

/// Synthesises input events in the local desktop session.
///
/// Key names are injector names (see [`injector_key`]), not the semantic
/// names on the wire.
///
/// [`injector_key`]: crate::infrastructure::keymap::injector_key
pub trait InputInjector: Send + Sync {
    fn key_toggle(&self, key: &str, down: bool) -> Result<(), InjectionError>;
    fn mouse_position(&self) -> Result<(i32, i32), InjectionError>;
    fn mouse_move(&self, x: i32, y: i32) -> Result<(), InjectionError>;
    fn mouse_toggle(&self, button: MouseButton, down: bool) -> Result<(), InjectionError>;
    fn scroll(&self, dx: i32, dy: i32) -> Result<(), InjectionError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
