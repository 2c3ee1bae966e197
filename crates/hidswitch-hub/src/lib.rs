//! # hidswitch-hub
//!
//! The hub half of HID-Switch. It owns the physically attached keyboard and
//! mouse, reads their raw composite-HID reports, and routes every event to
//! exactly one of two destinations:
//!
//! - the paired Bluetooth host, by re-encoding held state into boot-protocol
//!   output reports written to the HID interrupt channel, or
//! - the downstream replay agents, by translating reports into the wire
//!   protocol and broadcasting them over TCP.
//!
//! Routing is flipped at runtime with hotkey chords on the physical keyboard,
//! so the hub behaves like a KVM switch without any video.
//!
//! The crate is split the usual way:
//!
//! - **`application`** – the routing state machine and the Bluetooth
//!   re-encoder, written against traits so they are testable without sockets.
//! - **`infrastructure`** – raw report framing, the TCP listener and
//!   broadcaster, the Bluetooth interrupt channel, and file configuration.

pub mod application;
pub mod infrastructure;
