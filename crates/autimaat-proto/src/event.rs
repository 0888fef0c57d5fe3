//! Inbound line decoding.
//!
//! Server lines come in two shapes that matter to the bot:
//!
//! ```text
//! PING :irc.example.net                       (no sender prefix)
//! :nick!~user@host PRIVMSG #channel :hi all   (prefix, type, target, payload)
//! ```
//!
//! Decoding is deliberately shallow. Fields are split on whitespace, a single
//! leading `:` is stripped from the first four of them, and the payload is
//! re-joined with single spaces.

use std::fmt;

use crate::chan::ChannelExt;

/// A single decoded server message.
///
/// Immutable once built. The orchestrator may produce a copy with a
/// rewritten target (see [`InboundEvent::with_target`]) when the message was
/// addressed to the bot itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    /// Nickname of the sender.
    pub sender_nick: String,
    /// Hostmask of the sender (`~user@host`). Equals the nick for server
    /// prefixes without a `!`.
    pub sender_mask: String,
    /// Message type: `PRIVMSG`, `PING`, `ERROR`, numeric codes like `001`.
    pub message_type: String,
    /// Channel or nick the message was sent to.
    pub target: String,
    /// Message content.
    pub payload: String,
}

impl InboundEvent {
    /// Build an event for prefix-less service lines (`PING`, `ERROR`).
    fn service(message_type: &str, payload: String) -> Self {
        Self {
            message_type: message_type.to_string(),
            payload,
            ..Self::default()
        }
    }

    /// Returns a copy of this event addressed to `target`.
    pub fn with_target(&self, target: &str) -> Self {
        Self {
            target: target.to_string(),
            ..self.clone()
        }
    }

    /// True if the message came from a channel rather than a user or service.
    pub fn from_channel(&self) -> bool {
        self.target.is_channel_name()
    }

    /// True for `PRIVMSG` events, the usual input for command dispatch.
    pub fn is_privmsg(&self) -> bool {
        self.message_type == "PRIVMSG"
    }

    /// Payload words after skipping the first `n`.
    ///
    /// Returns an empty list when `n` is past the last word.
    pub fn fields(&self, n: usize) -> Vec<&str> {
        self.payload.split_whitespace().skip(n).collect()
    }
}

impl fmt::Display for InboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.sender_mask, self.sender_nick, self.message_type, self.target, self.payload
        )
    }
}

/// Decode one raw line into an event.
///
/// Returns `None` for empty input, for lines with fewer than three fields, and
/// for any line containing `QUIT`. Quit notifications are not consumed by
/// anything in the bot and are filtered here on purpose.
pub fn decode(line: &str) -> Option<InboundEvent> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return None;
    }

    if line.contains("QUIT") {
        return None;
    }

    if line.starts_with("PING") {
        return Some(InboundEvent::service("PING", service_payload(&fields)));
    }

    if line.starts_with("ERROR") {
        return Some(InboundEvent::service("ERROR", service_payload(&fields)));
    }

    let [source, message_type, target, rest @ ..] = fields.as_slice() else {
        return None;
    };

    let source = strip_colon(source);
    let (sender_nick, sender_mask) = source.split_once('!').unwrap_or((source, source));

    let payload = match rest.split_first() {
        Some((first, tail)) => {
            let mut words = Vec::with_capacity(rest.len());
            words.push(strip_colon(first));
            words.extend_from_slice(tail);
            words.join(" ")
        }
        None => String::new(),
    };

    Some(InboundEvent {
        sender_nick: sender_nick.to_string(),
        sender_mask: sender_mask.to_string(),
        message_type: strip_colon(message_type).to_string(),
        target: strip_colon(target).to_string(),
        payload,
    })
}

/// Everything after the verb of a `PING`/`ERROR` line, minus the `:` marker.
fn service_payload(fields: &[&str]) -> String {
    match fields.get(1..) {
        Some([first, tail @ ..]) => {
            let mut words = vec![strip_colon(first)];
            words.extend_from_slice(tail);
            words.join(" ")
        }
        _ => String::new(),
    }
}

fn strip_colon(field: &str) -> &str {
    field.strip_prefix(':').unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_payload_drops_marker() {
        let event = decode("PING :abc").unwrap();
        assert_eq!(event.message_type, "PING");
        assert_eq!(event.payload, "abc");
        assert!(event.sender_nick.is_empty());
        assert!(event.target.is_empty());
    }

    #[test]
    fn ping_without_payload() {
        let event = decode("PING").unwrap();
        assert_eq!(event.message_type, "PING");
        assert_eq!(event.payload, "");
    }

    #[test]
    fn error_keeps_full_reason() {
        let event = decode("ERROR :Closing Link: bot (Ping timeout)").unwrap();
        assert_eq!(event.message_type, "ERROR");
        assert_eq!(event.payload, "Closing Link: bot (Ping timeout)");
    }

    #[test]
    fn quit_lines_are_dropped() {
        assert!(decode(":nick!~u@host QUIT :Leaving").is_none());
    }

    #[test]
    fn empty_and_blank_lines() {
        assert!(decode("").is_none());
        assert!(decode("   \t ").is_none());
    }

    #[test]
    fn too_few_fields() {
        assert!(decode(":server NOTICE").is_none());
    }

    #[test]
    fn privmsg_with_hostmask() {
        let event = decode(":alice!~al@example.org PRIVMSG #rust :hello   big world").unwrap();
        assert_eq!(event.sender_nick, "alice");
        assert_eq!(event.sender_mask, "~al@example.org");
        assert_eq!(event.message_type, "PRIVMSG");
        assert_eq!(event.target, "#rust");
        assert_eq!(event.payload, "hello big world");
        assert!(event.from_channel());
        assert!(event.is_privmsg());
    }

    #[test]
    fn server_prefix_without_bang() {
        let event = decode(":irc.example.net 001 bot :Welcome to the network").unwrap();
        assert_eq!(event.sender_nick, "irc.example.net");
        assert_eq!(event.sender_mask, "irc.example.net");
        assert_eq!(event.message_type, "001");
        assert_eq!(event.target, "bot");
        assert_eq!(event.payload, "Welcome to the network");
        assert!(!event.from_channel());
    }

    #[test]
    fn only_first_payload_word_loses_colon() {
        let event = decode(":a!b@c PRIVMSG bot ::) :again").unwrap();
        assert_eq!(event.payload, ":) :again");
    }

    #[test]
    fn no_payload() {
        let event = decode(":a!b@c JOIN #chan").unwrap();
        assert_eq!(event.target, "#chan");
        assert_eq!(event.payload, "");
    }

    #[test]
    fn fields_skips_words() {
        let event = decode(":a!b@c PRIVMSG #x :!weather Amsterdam now").unwrap();
        assert_eq!(event.fields(1), vec!["Amsterdam", "now"]);
        assert!(event.fields(5).is_empty());
    }

    #[test]
    fn with_target_rewrites_only_target() {
        let event = decode(":a!b@c PRIVMSG bot :hi").unwrap();
        let rewritten = event.with_target("a");
        assert_eq!(rewritten.target, "a");
        assert_eq!(rewritten.payload, event.payload);
        assert_eq!(event.target, "bot");
    }

    #[test]
    fn display_form() {
        let event = decode(":a!b@c PRIVMSG #x :hi there").unwrap();
        assert_eq!(event.to_string(), "b@c a PRIVMSG #x hi there");
    }
}
