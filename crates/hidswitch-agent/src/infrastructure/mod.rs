//! Infrastructure adapters for the agent: the hub connection supervisor,
//! platform input injection, the injector key table, and file configuration.

pub mod config;
pub mod connection;
pub mod injection;
pub mod keymap;
