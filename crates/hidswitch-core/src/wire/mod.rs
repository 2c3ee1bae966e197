//! Downstream wire protocol.
//!
//! Two independent formats, chosen by the role a downstream declares in its
//! handshake:
//!
//! - **Keyboard**: newline-delimited ASCII frames; the payload is the
//!   space-separated list of currently held semantic names, an empty line
//!   meaning "nothing held". The sender writes names in press order; the
//!   receiver must apply them in **reverse** wire order so that modifiers
//!   register before the keys they modify on the injection side. That
//!   reversal is part of the wire contract and lives in [`parse_key_frame`].
//!
//! - **Mouse**: binary frames, self-framing by the leading type byte:
//!
//!   ```text
//!   [0, dx:i8, dy:i8]                          position delta   (3 bytes)
//!   [1, button:u8, y_scroll:i8, x_scroll:i8]   buttons/scroll   (4 bytes)
//!   ```
//!
//!   Frame length is a fixed function of the type byte; a frame is always
//!   written whole, never split.
//!
//! A new downstream connection opens with exactly one JSON handshake line,
//! `{"token": "...", "type": "keyboard"|"mouse"}`, and is a pure one-way
//! event stream afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type byte of a position-delta mouse frame.
pub const MOUSE_FRAME_MOVE: u8 = 0;
/// Type byte of a buttons/scroll mouse frame.
pub const MOUSE_FRAME_BUTTONS: u8 = 1;

/// Errors produced while parsing downstream frames.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The leading type byte of a mouse frame is not a known value.
    #[error("unknown mouse frame type: 0x{0:02X}")]
    UnknownFrameType(u8),
}

// ── Handshake ─────────────────────────────────────────────────────────────────

/// Downstream role declared in the handshake; decides which wire format the
/// connection carries and which broadcast set it joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Keyboard,
    Mouse,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Keyboard => f.write_str("keyboard"),
            Role::Mouse => f.write_str("mouse"),
        }
    }
}

/// The one-line JSON handshake a downstream sends on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRequest {
    pub token: String,
    #[serde(rename = "type")]
    pub role: Role,
}

impl HandshakeRequest {
    /// Serialises the handshake as its newline-terminated wire line.
    pub fn to_line(&self) -> String {
        // Serialization of this two-field struct cannot fail.
        let mut line = serde_json::to_string(self).unwrap_or_default();
        line.push('\n');
        line
    }
}

// ── Keyboard frames ───────────────────────────────────────────────────────────

/// Encodes a held-name set as one newline-terminated keyboard frame.
pub fn encode_key_frame<S: AsRef<str>>(names: &[S]) -> String {
    let mut frame = names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    frame.push('\n');
    frame
}

/// Parses one keyboard frame payload (without the trailing newline) into the
/// held-name list, **reversed** into application order.
///
/// The reversal is the receiver's half of the simultaneous-press ordering
/// contract: the injection side must assert a modifier before the key it
/// modifies.
pub fn parse_key_frame(line: &str) -> Vec<String> {
    line.split(' ')
        .rev()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Mouse frames ──────────────────────────────────────────────────────────────

/// One frame of the binary mouse protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseFrame {
    /// Relative pointer movement; emitted only when `(dx, dy) != (0, 0)`.
    Move { dx: i8, dy: i8 },
    /// Button mask plus wheel deltas; emitted on button change or non-zero
    /// scroll.
    Buttons { button: u8, y_scroll: i8, x_scroll: i8 },
}

impl MouseFrame {
    /// Returns the fixed total length for a frame starting with `type_byte`,
    /// or `None` if the type byte is unknown.
    pub fn frame_len(type_byte: u8) -> Option<usize> {
        match type_byte {
            MOUSE_FRAME_MOVE => Some(3),
            MOUSE_FRAME_BUTTONS => Some(4),
            _ => None,
        }
    }

    /// Encodes the frame as its complete byte sequence.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            MouseFrame::Move { dx, dy } => vec![MOUSE_FRAME_MOVE, dx as u8, dy as u8],
            MouseFrame::Buttons { button, y_scroll, x_scroll } => {
                vec![MOUSE_FRAME_BUTTONS, button, y_scroll as u8, x_scroll as u8]
            }
        }
    }

    /// Decodes one frame from the beginning of `bytes`.
    ///
    /// Returns `Ok(None)` when the buffer holds an incomplete frame (the
    /// caller should read more bytes), otherwise the frame and the number of
    /// bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownFrameType`] if the leading byte is not a
    /// known frame type; the stream cannot be resynchronised after that.
    pub fn decode(bytes: &[u8]) -> Result<Option<(MouseFrame, usize)>, WireError> {
        let Some(&type_byte) = bytes.first() else {
            return Ok(None);
        };
        let len = MouseFrame::frame_len(type_byte).ok_or(WireError::UnknownFrameType(type_byte))?;
        if bytes.len() < len {
            return Ok(None);
        }
        let frame = match type_byte {
            MOUSE_FRAME_MOVE => MouseFrame::Move {
                dx: bytes[1] as i8,
                dy: bytes[2] as i8,
            },
            _ => MouseFrame::Buttons {
                button: bytes[1],
                y_scroll: bytes[2] as i8,
                x_scroll: bytes[3] as i8,
            },
        };
        Ok(Some((frame, len)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_serialises_with_type_field() {
        let hs = HandshakeRequest {
            token: "secret".to_string(),
            role: Role::Mouse,
        };
        let line = hs.to_line();
        assert!(line.ends_with('\n'));
        assert_eq!(
            serde_json::from_str::<HandshakeRequest>(line.trim()).unwrap(),
            hs
        );
        assert!(line.contains("\"type\":\"mouse\""));
    }

    #[test]
    fn test_handshake_rejects_unknown_role() {
        let result =
            serde_json::from_str::<HandshakeRequest>(r#"{"token":"t","type":"gamepad"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_handshake_rejects_missing_token() {
        let result = serde_json::from_str::<HandshakeRequest>(r#"{"type":"keyboard"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_key_frame_encodes_space_separated_names() {
        assert_eq!(encode_key_frame(&["LEFT_SHIFT", "Q"]), "LEFT_SHIFT Q\n");
    }

    #[test]
    fn test_key_frame_empty_set_is_empty_line() {
        assert_eq!(encode_key_frame::<&str>(&[]), "\n");
    }

    #[test]
    fn test_parse_key_frame_reverses_wire_order() {
        // The sender wrote press order; the receiver applies reverse order so
        // LEFT_SHIFT (written first) is injected before Q.
        assert_eq!(parse_key_frame("Q LEFT_SHIFT"), vec!["LEFT_SHIFT", "Q"]);
    }

    #[test]
    fn test_parse_key_frame_empty_line_means_nothing_held() {
        assert!(parse_key_frame("").is_empty());
    }

    #[test]
    fn test_mouse_move_frame_is_three_bytes() {
        let frame = MouseFrame::Move { dx: 5, dy: -3 };
        assert_eq!(frame.encode(), vec![0, 5, 253]);
    }

    #[test]
    fn test_mouse_buttons_frame_is_four_bytes() {
        let frame = MouseFrame::Buttons { button: 2, y_scroll: -1, x_scroll: 1 };
        assert_eq!(frame.encode(), vec![1, 2, 255, 1]);
    }

    #[test]
    fn test_mouse_frame_decode_round_trip() {
        for frame in [
            MouseFrame::Move { dx: -128, dy: 127 },
            MouseFrame::Buttons { button: 4, y_scroll: 0, x_scroll: -2 },
        ] {
            let bytes = frame.encode();
            let (decoded, consumed) = MouseFrame::decode(&bytes).unwrap().unwrap();
            assert_eq!(decoded, frame);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn test_mouse_frame_decode_incomplete_returns_none() {
        assert_eq!(MouseFrame::decode(&[]), Ok(None));
        assert_eq!(MouseFrame::decode(&[0, 5]), Ok(None));
        assert_eq!(MouseFrame::decode(&[1, 2, 3]), Ok(None));
    }

    #[test]
    fn test_mouse_frame_decode_unknown_type_is_an_error() {
        assert_eq!(
            MouseFrame::decode(&[9, 0, 0, 0]),
            Err(WireError::UnknownFrameType(9))
        );
    }

    #[test]
    fn test_mouse_frame_decode_consumes_exactly_one_frame() {
        // Two concatenated frames: decode must report the first frame's length.
        let mut bytes = MouseFrame::Move { dx: 1, dy: 1 }.encode();
        bytes.extend(MouseFrame::Buttons { button: 1, y_scroll: 0, x_scroll: 0 }.encode());
        let (frame, consumed) = MouseFrame::decode(&bytes).unwrap().unwrap();
        assert_eq!(frame, MouseFrame::Move { dx: 1, dy: 1 });
        assert_eq!(consumed, 3);
    }
}
