//! Property-based tests for the wire codec.
//!
//! Verifies that:
//! 1. Well-formed lines survive encode followed by decode
//! 2. Overlong lines are always cut to exactly 512 bytes ending in CRLF
//! 3. Decoding arbitrary input never panics

use autimaat_proto::{decode, encode_line, OutboundCommand, MAX_LINE_LEN};
use proptest::prelude::*;

// =============================================================================
// STRATEGIES
// =============================================================================

fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]^_`{|}][a-zA-Z0-9\\-\\[\\]^_`{|}]{0,8}")
        .expect("valid regex")
}

fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("~?[a-zA-Z][a-zA-Z0-9]{0,9}").expect("valid regex")
}

fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]+(\\.[a-z0-9]+){0,3}").expect("valid regex")
}

fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&][a-zA-Z0-9_\\-]{1,49}").expect("valid regex")
}

/// Words separated by single spaces; the decoder collapses runs of
/// whitespace, so only this shape round-trips exactly.
fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9,.!?'\\-]{1,12}( [a-zA-Z0-9,.!?:'\\-]{1,12}){0,25}")
        .expect("valid regex")
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn privmsg_roundtrip(
        nick in nickname_strategy(),
        user in username_strategy(),
        host in hostname_strategy(),
        channel in channel_strategy(),
        text in text_strategy(),
    ) {
        let cmd = OutboundCommand::privmsg(&channel, &text)
            .with_source(format!("{nick}!{user}@{host}"));
        let line = cmd.to_line();
        prop_assume!(line.len() < MAX_LINE_LEN - 2);
        prop_assume!(!line.contains("QUIT"));

        let encoded = cmd.encode().expect("non-empty line");
        let raw = std::str::from_utf8(&encoded).expect("ascii line");
        let event = decode(raw).expect("decodable line");

        prop_assert_eq!(event.sender_nick, nick);
        prop_assert_eq!(event.sender_mask, format!("{user}@{host}"));
        prop_assert_eq!(event.message_type, "PRIVMSG");
        prop_assert_eq!(event.target, channel);
        prop_assert_eq!(event.payload, text);
    }

    #[test]
    fn overlong_lines_are_exactly_max_len(body in "[ -~]{511,2000}") {
        let encoded = encode_line(&body).expect("non-empty line");
        prop_assert_eq!(encoded.len(), MAX_LINE_LEN);
        prop_assert!(encoded.ends_with(b"\r\n"));
        prop_assert_eq!(&encoded[..MAX_LINE_LEN - 2], &body.as_bytes()[..MAX_LINE_LEN - 2]);
    }

    #[test]
    fn short_lines_keep_their_bytes(body in "[!-~][ -~]{0,508}") {
        let encoded = encode_line(&body).expect("non-empty line");
        prop_assert_eq!(encoded.len(), body.len() + 2);
        prop_assert_eq!(&encoded[..body.len()], body.as_bytes());
    }

    #[test]
    fn decode_never_panics(raw in "\\PC{0,600}") {
        let _ = decode(&raw);
    }
}
