//! Line-based framing codec for tokio.
//!
//! Splits the inbound byte stream on `\n` and yields each line with
//! surrounding whitespace (including the `\r`) trimmed. Bytes are decoded as
//! UTF-8 lossily: servers relay whatever encoding users type in, and one
//! badly encoded message must not take the connection down.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::warn;

use crate::error;

/// Longest inbound line accepted before it is discarded.
pub const MAX_INBOUND_LINE_LEN: usize = 8191;

/// Newline-delimited line decoder.
///
/// Lines longer than the configured maximum are dropped in their entirety
/// and decoding resumes at the next newline; they never surface as errors.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Skipping the remainder of an overlong line
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default inbound limit.
    pub fn new() -> Self {
        Self::with_max_len(MAX_INBOUND_LINE_LEN)
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let newline = src[self.next_index..].iter().position(|b| *b == b'\n');

            let Some(offset) = newline else {
                if src.len() > self.max_len {
                    if !self.discarding {
                        warn!(limit = self.max_len, "Discarding overlong inbound line");
                    }
                    src.clear();
                    self.discarding = true;
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }

            if line.len() > self.max_len {
                warn!(length = line.len(), limit = self.max_len, "Discarding overlong inbound line");
                continue;
            }

            return Ok(Some(String::from_utf8_lossy(&line).trim().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn splits_and_trims() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PING :a\r\n  :x PRIVMSG #c :hi \r\n"[..]);
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING :a", ":x PRIVMSG #c :hi"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_line_waits_for_more() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PING :par"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"tial\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PING :partial"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #c :caf\xe9\r\n"[..]);
        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert!(line.starts_with("PRIVMSG #c :caf"));
        assert!(line.ends_with('\u{FFFD}'));
    }

    #[test]
    fn overlong_complete_line_is_skipped() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[b'x'; 40]);
        buf.extend_from_slice(b"\nPING :ok\n");
        // Whole buffer arrives at once: the long line is seen complete.
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING :ok"]);
    }

    #[test]
    fn overlong_partial_line_is_discarded_until_newline() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from(&[b'x'; 20][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());

        buf.extend_from_slice(b"xxxx\nPING :after\n");
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING :after"]);
    }
}
