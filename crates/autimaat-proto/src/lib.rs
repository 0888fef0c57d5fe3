//! # autimaat-proto
//!
//! Wire codec for the autimaat IRC bot.
//!
//! - [`decode`] turns one raw server line into an [`InboundEvent`]
//! - [`OutboundCommand`] and [`encode_line`] produce CRLF-terminated lines
//!   that never exceed the 512 byte protocol ceiling
//! - [`LineCodec`] frames a byte stream into trimmed lines (tokio feature)
//!
//! Nothing in this crate performs I/O or holds state between lines.
//!
//! ```rust
//! use autimaat_proto::{decode, OutboundCommand};
//!
//! let event = decode(":nick!~user@host PRIVMSG #rust :hello there").unwrap();
//! assert_eq!(event.sender_nick, "nick");
//! assert_eq!(event.payload, "hello there");
//!
//! let reply = OutboundCommand::privmsg(&event.target, "hi");
//! assert_eq!(&reply.encode().unwrap()[..], b"PRIVMSG #rust :hi\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod chan;
pub mod encode;
pub mod error;
pub mod event;
pub mod format;
#[cfg(feature = "tokio")]
pub mod line;
pub mod response;

pub use self::chan::ChannelExt;
pub use self::encode::{encode_line, OutboundCommand, MAX_LINE_LEN};
pub use self::error::ProtocolError;
pub use self::event::{decode, InboundEvent};
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, MAX_INBOUND_LINE_LEN};
pub use self::response::Response;
