//! HID report codec.
//!
//! Decodes the raw input reports read from the physical composite device and
//! re-encodes held key sets into the boot-protocol output reports written to
//! the Bluetooth peer.
//!
//! Report layouts (byte 0 is always the report id):
//!
//! ```text
//! keyboard in/out: [1, modifier_bits, reserved, k0, k1, k2, k3, k4, k5]   (9 bytes)
//! media in/out:    [2, bits1, bits2, bits3]                               (4 bytes)
//! mouse in/out:    [5, button, p0, p1, p2, y_scroll, x_scroll]            (7 bytes)
//! ```
//!
//! Bytes p0–p2 of the mouse report pack two signed 12-bit deltas, each split
//! into 4-bit nibbles (`high`, `mid`, `low` of the two's-complement value):
//!
//! ```text
//! p0 = (x_mid  << 4) | x_low
//! p1 = (y_low  << 4) | x_high
//! p2 = (y_high << 4) | y_mid
//! ```

use thiserror::Error;
use tracing::warn;

use crate::keymap::{CodeSpace, KeymapTable};

/// Report id of keyboard (boot-protocol) reports.
pub const KEYS_REPORT_ID: u8 = 1;
/// Report id of media-control reports.
pub const MEDIA_REPORT_ID: u8 = 2;
/// Report id of mouse reports.
pub const MOUSE_REPORT_ID: u8 = 5;

/// Total length of a keyboard report.
pub const KEYS_REPORT_LEN: usize = 9;
/// Total length of a media report.
pub const MEDIA_REPORT_LEN: usize = 4;
/// Total length of a mouse report.
pub const MOUSE_REPORT_LEN: usize = 7;

/// Number of simultaneous non-modifier key slots in a boot-protocol report.
pub const KEY_SLOTS: usize = 6;

/// Keycode value signalling keyboard rollover/error: more keys were pressed
/// than the device can report, so the whole frame is meaningless.
const ROLLOVER_SENTINEL: u8 = 0x01;

/// Errors produced while decoding input reports.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The report carried the 0x01 rollover/error sentinel; the frame must be
    /// discarded and the previously known pressed set kept.
    #[error("keyboard rollover/error sentinel in report; frame discarded")]
    KeyRollover,

    /// The byte buffer is shorter than the fixed layout requires.
    #[error("truncated report: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },
}

/// A decoded mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseReport {
    /// Button bitmask (1 = left, 2 = right, 4 = middle).
    pub button: u8,
    /// Horizontal delta, −2048..=2047.
    pub x: i16,
    /// Vertical delta, −2048..=2047.
    pub y: i16,
    /// Vertical wheel delta.
    pub y_scroll: i8,
    /// Horizontal wheel delta.
    pub x_scroll: i8,
}

/// The pair of output reports describing one held key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReports {
    pub keys: [u8; KEYS_REPORT_LEN],
    pub media: [u8; MEDIA_REPORT_LEN],
}

impl KeyReports {
    /// Reports for an empty pressed set (everything released).
    pub fn empty() -> Self {
        Self {
            keys: [KEYS_REPORT_ID, 0, 0, 0, 0, 0, 0, 0, 0],
            media: [MEDIA_REPORT_ID, 0, 0, 0],
        }
    }
}

// ── Mouse codec ───────────────────────────────────────────────────────────────

/// Decodes a raw 7-byte mouse report.
pub fn decode_mouse(bytes: &[u8; MOUSE_REPORT_LEN]) -> MouseReport {
    let x12 = (((bytes[3] & 0x0f) as u16) << 8) | bytes[2] as u16;
    let y12 = ((bytes[4] as u16) << 4) | (bytes[3] >> 4) as u16;

    MouseReport {
        button: bytes[1],
        x: from_u12(x12),
        y: from_u12(y12),
        y_scroll: bytes[5] as i8,
        x_scroll: bytes[6] as i8,
    }
}

/// Encodes a mouse report into the 7-byte wire layout (exact inverse of
/// [`decode_mouse`]). Deltas outside the 12-bit range are saturated.
pub fn encode_mouse(report: &MouseReport) -> [u8; MOUSE_REPORT_LEN] {
    let x = to_u12(report.x);
    let y = to_u12(report.y);

    [
        MOUSE_REPORT_ID,
        report.button,
        (x & 0xff) as u8,
        (((y & 0x0f) << 4) | (x >> 8)) as u8,
        (y >> 4) as u8,
        report.y_scroll as u8,
        report.x_scroll as u8,
    ]
}

/// Converts an unsigned 12-bit field to a signed delta.
fn from_u12(value: u16) -> i16 {
    if value < 2048 {
        value as i16
    } else {
        value as i16 - 4096
    }
}

/// Converts a signed delta to its unsigned 12-bit two's-complement field.
fn to_u12(value: i16) -> u16 {
    let clamped = value.clamp(-2048, 2047);
    if clamped < 0 {
        (clamped + 4096) as u16
    } else {
        clamped as u16
    }
}

// ── Key decoding ──────────────────────────────────────────────────────────────

/// Decodes the key slots of a keyboard report (bytes 2 onward) into semantic
/// names.
///
/// `0x00` means "no key in this slot" and is skipped; unregistered scan codes
/// are silently dropped (not an error).
///
/// # Errors
///
/// Returns [`ReportError::KeyRollover`] if any slot carries the 0x01 sentinel;
/// the caller must discard the frame and keep its previous pressed set.
pub fn decode_keys(bytes: &[u8], table: &KeymapTable) -> Result<Vec<&'static str>, ReportError> {
    let mut pressed = Vec::new();
    for &code in bytes.iter().skip(2) {
        if code == ROLLOVER_SENTINEL {
            return Err(ReportError::KeyRollover);
        }
        if code == 0 {
            continue;
        }
        if let Some(name) = table.keys.name_for(code) {
            pressed.push(name);
        }
    }
    Ok(pressed)
}

/// Decodes a bitmask byte against one code space: every set bit with a
/// registered name contributes that name.
pub fn decode_modifiers(byte: u8, space: &CodeSpace) -> Vec<&'static str> {
    let mut names = Vec::new();
    for bit in 0..8u8 {
        let value = 1 << bit;
        if byte & value != 0 {
            if let Some(name) = space.name_for(value) {
                names.push(name);
            }
        }
    }
    names
}

// ── Key encoding ──────────────────────────────────────────────────────────────

/// Builds the keys + media output reports for a set of held semantic names.
///
/// Each name is reverse-looked-up in all code spaces: regular keys fill the
/// six key slots, modifier and media names OR their bit into the matching
/// byte. Names unknown to every space are ignored.
///
/// More than [`KEY_SLOTS`] simultaneous non-modifier keys cannot be expressed
/// in a boot-protocol report; the first six in press order are kept and the
/// overflow is dropped with a warning.
pub fn encode_keys(pressed: &[&str], table: &KeymapTable) -> KeyReports {
    let mut reports = KeyReports::empty();
    let mut slot = 0usize;
    let mut dropped = 0usize;

    for name in pressed {
        if let Some(code) = table.keys.code_for(name) {
            if slot < KEY_SLOTS {
                reports.keys[3 + slot] = code;
                slot += 1;
            } else {
                dropped += 1;
            }
        }
        if let Some(bit) = table.modifiers.code_for(name) {
            reports.keys[1] |= bit;
        }
        if let Some(bit) = table.media1.code_for(name) {
            reports.media[1] |= bit;
        }
        if let Some(bit) = table.media2.code_for(name) {
            reports.media[2] |= bit;
        }
        if let Some(bit) = table.media3.code_for(name) {
            reports.media[3] |= bit;
        }
    }

    if dropped > 0 {
        warn!(dropped, "key report overflow: more than {KEY_SLOTS} keys held, extra keys dropped");
    }

    reports
}

// ── Tests ─────────────────────────────────────────────────────────────────────
