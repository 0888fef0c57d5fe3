//! Outbound writes.
//!
//! [`ResponseWriter`] is the capability handed to command handlers and
//! plugins: something that can put one framed line on the wire. The helper
//! functions below format the bot's commands and perform the one or more
//! writes each of them needs.

use crate::network::{ConnectionError, ConnectionWriter};
use async_trait::async_trait;
use autimaat_proto::OutboundCommand;
use bytes::Bytes;
use thiserror::Error;

/// Failure to write a line.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Anything that can write framed protocol lines.
#[async_trait]
pub trait ResponseWriter: Send + Sync {
    /// Write one CRLF-terminated line in full.
    async fn write_line(&self, line: Bytes) -> Result<(), WriteError>;
}

#[async_trait]
impl ResponseWriter for ConnectionWriter {
    async fn write_line(&self, line: Bytes) -> Result<(), WriteError> {
        ConnectionWriter::write_line(self, &line).await?;
        Ok(())
    }
}

/// Encode and write a command. Empty lines are skipped silently.
pub async fn send(w: &dyn ResponseWriter, cmd: OutboundCommand) -> Result<(), WriteError> {
    match cmd.encode() {
        Some(line) => w.write_line(line).await,
        None => Ok(()),
    }
}

/// `PASS`, skipped when no password is set.
pub async fn pass(w: &dyn ResponseWriter, password: &str) -> Result<(), WriteError> {
    if password.is_empty() {
        return Ok(());
    }
    send(w, OutboundCommand::pass(password)).await
}

pub async fn user(w: &dyn ResponseWriter, username: &str, realname: &str) -> Result<(), WriteError> {
    send(w, OutboundCommand::user(username, "8", realname)).await
}

/// `NICK`, followed by an identify message to the nick service when a
/// password is set. The second line is only sent if the first succeeded.
pub async fn nick(w: &dyn ResponseWriter, nickname: &str, password: &str) -> Result<(), WriteError> {
    send(w, OutboundCommand::nick(nickname)).await?;
    if password.is_empty() {
        return Ok(());
    }
    send(w, OutboundCommand::privmsg("nickserv", &format!("IDENTIFY {password}"))).await
}

/// `JOIN` with an optional key, followed by an identify message to the
/// channel service when a channel password is set.
pub async fn join(
    w: &dyn ResponseWriter,
    channel: &str,
    key: &str,
    password: &str,
) -> Result<(), WriteError> {
    send(w, OutboundCommand::join(channel, Some(key))).await?;
    if password.is_empty() {
        return Ok(());
    }
    send(
        w,
        OutboundCommand::privmsg("chanserv", &format!("IDENTIFY {channel} {password}")),
    )
    .await
}

pub async fn part(w: &dyn ResponseWriter, channel: &str) -> Result<(), WriteError> {
    send(w, OutboundCommand::part(channel)).await
}

pub async fn privmsg(w: &dyn ResponseWriter, target: &str, text: &str) -> Result<(), WriteError> {
    send(w, OutboundCommand::privmsg(target, text)).await
}

pub async fn notice(w: &dyn ResponseWriter, target: &str, text: &str) -> Result<(), WriteError> {
    send(w, OutboundCommand::notice(target, text)).await
}

pub async fn pong(w: &dyn ResponseWriter, payload: &str) -> Result<(), WriteError> {
    send(w, OutboundCommand::pong(payload)).await
}

pub async fn mode(
    w: &dyn ResponseWriter,
    target: &str,
    mode: &str,
    argument: Option<&str>,
) -> Result<(), WriteError> {
    send(w, OutboundCommand::mode(target, mode, argument)).await
}

/// Ask the nick service to release `nickname` to us.
pub async fn recover(w: &dyn ResponseWriter, nickname: &str, password: &str) -> Result<(), WriteError> {
    send(w, OutboundCommand::recover(nickname, password)).await
}

/// `OPER`, skipped when no password is set.
pub async fn oper(w: &dyn ResponseWriter, name: &str, password: &str) -> Result<(), WriteError> {
    if password.is_empty() {
        return Ok(());
    }
    send(w, OutboundCommand::oper(name, password)).await
}
