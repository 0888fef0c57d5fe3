//! Tracing setup and standard spans.

use tracing_subscriber::EnvFilter;

/// Target for inbound traffic logging, enabled by the profile's `logging` flag.
pub const INBOUND_TARGET: &str = "autimaat::inbound";

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span covering the whole process; parent and child log side by side
    /// during a handoff, so every record carries the pid.
    pub fn process() -> Span {
        info_span!("process", pid = std::process::id())
    }

    /// Span for a server connection.
    pub fn connection(address: &str) -> Span {
        info_span!("connection", address = %address)
    }

    /// Span for a command execution.
    pub fn command(name: &str, source: &str, target: &str) -> Span {
        if target.is_empty() {
            info_span!("command", name = %name, source = %source)
        } else {
            info_span!("command", name = %name, source = %source, target = %target)
        }
    }
}
