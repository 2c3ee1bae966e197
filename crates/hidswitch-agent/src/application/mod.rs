//! Application services for the agent.

pub mod replay_keys;
pub mod replay_mouse;

pub use replay_keys::KeyReplay;
pub use replay_mouse::MouseReplay;
