//! autimaat - a long-lived IRC bot that can replace its own binary without
//! dropping the server connection.
//!
//! - [`network`]: dial or adopt the server connection
//! - [`commands`]: command registry and dispatcher
//! - [`handoff`]: signal-driven fork/exec with descriptor passing
//! - [`plugins`]: plugin host and built-in commands
//! - [`bot`]: the orchestrator wiring all of the above together

pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod handoff;
pub mod network;
pub mod outbound;
pub mod plugins;
pub mod telemetry;

pub use bot::{Bot, Control};
pub use error::BotError;
