//! Top-level error taxonomy for the bot.
//!
//! Module errors convert into [`BotError`] with `?`; `main` turns it into an
//! `anyhow::Error` and a non-zero exit so a supervisor can restart the bot.

use crate::config::ProfileError;
use crate::handoff::HandoffError;
use crate::network::ConnectionError;
use crate::outbound::WriteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Dial, adoption or TLS setup failed.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// The registration handshake could not be written.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    #[error("handoff error: {0}")]
    Handoff(#[from] HandoffError),
}

impl BotError {
    /// Static label for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Profile(_) => "profile",
            Self::Connection(ConnectionError::ConnectFailed(_)) => "connect_failed",
            Self::Connection(_) => "connection",
            Self::Write(_) => "write",
            Self::Handoff(_) => "handoff",
        }
    }
}
