//! Process handoff: replace the running binary without dropping the
//! server connection.
//!
//! ```text
//!   parent                                   child
//!   ──────                                   ─────
//!   Reload ─► pause reads ─► spawn ───────►  --fork 1 <root>
//!                                            adopt fd 3
//!   Stop ◄───────────────────────────────── SIGINT to parent
//!   close, exit                              serve
//! ```
//!
//! OS signals are one adapter ([`forward_signals`]) feeding
//! [`ControlEvent`]s into the single control loop ([`Controller::run`]).

mod controller;
mod inherit;
mod signals;
mod spawn;

pub use controller::{Controller, HANDOFF_TIMEOUT, HandoffState, ShutdownReason};
pub use inherit::{
    INHERITED_FD_BASE, inherited_descriptors, inherited_descriptors_from, notify_parent,
};
pub use signals::forward_signals;
pub use spawn::{ExecSpawner, HandoffRequest, Spawner};

use std::os::fd::RawFd;
use thiserror::Error;

/// Input to the control loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// Hand the connection to a fresh copy of the binary.
    Reload,
    /// Shut down cleanly.
    Stop(StopSignal),
    /// The read loop ended; the connection is gone.
    Disconnected(String),
}

/// Which stop signal arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
    Hangup,
    Quit,
}

/// Handoff failures. None of these are fatal to a running process.
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("failed to spawn child: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("inherited descriptor {fd} is unusable: {source}")]
    Descriptor {
        fd: RawFd,
        #[source]
        source: std::io::Error,
    },

    #[error("signal handling failed: {0}")]
    Signal(#[source] std::io::Error),
}
