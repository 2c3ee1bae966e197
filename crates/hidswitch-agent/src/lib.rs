//! # hidswitch-agent
//!
//! The downstream half of HID-Switch. An agent connects to the hub over TCP,
//! declares a role (keyboard or mouse) in its handshake, and replays every
//! relayed event into the local desktop session through an [`InputInjector`].
//!
//! The keyboard role diffs each incoming held-set frame against the previous
//! one and synthesises key-down/key-up transitions locally, including the
//! key-repeat cadence the hub deliberately does not relay. The mouse role
//! decodes the binary frame stream into pointer moves, button transitions and
//! scrolling.
//!
//! [`InputInjector`]: infrastructure::injection::InputInjector

pub mod application;
pub mod infrastructure;
