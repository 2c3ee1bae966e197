//! # hidswitch-core
//!
//! Shared library for HID-Switch containing the keymap translation tables,
//! the raw HID report codec, and the downstream wire protocol.
//!
//! This crate is used by both the hub and the replay agent. It has zero
//! dependencies on OS APIs or network sockets.
//!
//! HID-Switch is a software keyboard/mouse switch: the hub machine reads raw
//! composite-HID reports from a physically attached keyboard/mouse and either
//! re-encodes them toward a paired Bluetooth host (the hub impersonates a
//! Bluetooth keyboard/mouse) or relays translated events over TCP to replay
//! agents running on other machines.
//!
//! The three modules map onto the three shared concerns:
//!
//! - **`keymap`** – fixed bidirectional tables between hardware scan codes /
//!   bit values and the semantic key names used on the downstream wire.
//!
//! - **`report`** – decoding raw input-report byte buffers (including the
//!   nibble-packed 12-bit mouse coordinates) and re-encoding held key sets
//!   into boot-protocol output reports.
//!
//! - **`wire`** – the two downstream protocols (newline key-name frames,
//!   self-framing binary mouse frames) plus the JSON handshake line.

pub mod keymap;
pub mod report;
pub mod wire;

pub use keymap::{CodeSpace, KeymapTable};
pub use report::{
    decode_keys, decode_modifiers, decode_mouse, encode_keys, encode_mouse, KeyReports,
    MouseReport, ReportError,
};
pub use wire::{parse_key_frame, HandshakeRequest, MouseFrame, Role, WireError};
