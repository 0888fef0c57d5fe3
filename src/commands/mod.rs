//! Command registry and dispatcher.
//!
//! Inbound messages starting with the command prefix are split into a name
//! and arguments, matched against the bound [`Command`]s, authorized,
//! validated, and handed to the command's [`Handler`] on a tracked task.
//!
//! ```text
//! "!weather Amsterdam"
//!   └─ prefix ─ split ─ find ─ authorize ─ count ─ validate ─ spawn
//! ```

mod command;
mod param;
pub mod patterns;
mod registry;
mod split;
mod text;

pub use command::{Command, Handler, Invocation, ParamSpec};
pub use param::{Param, ParamList};
pub use registry::{CommandBuilder, DispatchOutcome, HELP_LINE_DELAY, Registry};
pub use split::split;
