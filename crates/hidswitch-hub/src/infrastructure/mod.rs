//! Infrastructure adapters for the hub: raw report framing, the TCP relay,
//! the Bluetooth interrupt channel, and file configuration.

pub mod bluetooth;
pub mod broadcast;
pub mod config;
pub mod listener;
pub mod raw_input;
