//! Network module.
//!
//! Contains the server [`Connection`] (plain or TLS), its split
//! [`LineReader`]/[`ConnectionWriter`] halves and TLS client setup.

mod connection;
mod stream;
mod tls;

pub use connection::{Connection, ConnectionWriter, IDLE_TIMEOUT, LineReader};
pub use stream::Stream;
pub use tls::client_config;

use autimaat_proto::ProtocolError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the connection layer.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Dial, adoption or TLS handshake failed. Fatal for the current run.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// TLS material could not be loaded or combined into a client config.
    #[error("TLS setup failed: {0}")]
    Tls(String),

    /// The peer closed the stream or the connection was closed locally.
    #[error("connection closed")]
    Closed,

    /// No successful read or write within the idle window.
    #[error("no traffic for {0:?}")]
    TimedOut(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProtocolError> for ConnectionError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => Self::Io(e),
            other => Self::Io(std::io::Error::other(other)),
        }
    }
}
