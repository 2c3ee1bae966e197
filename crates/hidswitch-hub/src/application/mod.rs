//! Application services for the hub.

pub mod remote_keyboard;
pub mod route_reports;

pub use remote_keyboard::{OutputReportSink, RemoteKeyboard};
pub use route_reports::{HotkeyConfig, InputRouter, MacroStep, RoutingState};
