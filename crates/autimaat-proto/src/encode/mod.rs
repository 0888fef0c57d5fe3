//! Outbound line encoding.
//!
//! Every line the bot writes passes through [`encode_line`], which enforces
//! the protocol framing rules:
//!
//! - lines end in `\r\n`
//! - a line is at most [`MAX_LINE_LEN`] bytes, terminator included
//! - an empty line is never written
//!
//! Truncation is byte-exact. An overlong line is cut at 512 bytes and its
//! last two bytes are overwritten with `\r\n`, even if that splits a
//! multi-byte character.

mod command;

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// Maximum length of an outbound line, including the trailing `\r\n`.
pub const MAX_LINE_LEN: usize = 512;

/// Frame a formatted line for the wire.
///
/// Returns `None` when the line is empty: nothing should be written and this
/// is not an error.
pub fn encode_line(line: &str) -> Option<Bytes> {
    let mut data = BytesMut::with_capacity(line.len().min(MAX_LINE_LEN) + 2);
    data.put_slice(line.as_bytes());
    data.put_slice(b"\r\n");

    if data.len() <= 2 {
        return None;
    }

    if data.len() > MAX_LINE_LEN {
        data.truncate(MAX_LINE_LEN);
        data[MAX_LINE_LEN - 2] = b'\r';
        data[MAX_LINE_LEN - 1] = b'\n';
    }

    Some(data.freeze())
}

/// A protocol command ready to be formatted into one line.
///
/// ```text
/// [:source ]VERB param1 param2 ... [:trailing]
/// ```
///
/// Middle parameters must not contain spaces; anything that may (message
/// text, real names) belongs in the trailing parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundCommand {
    source: Option<String>,
    verb: String,
    params: Vec<String>,
    trailing: Option<String>,
}

impl OutboundCommand {
    /// Start a command with the given verb.
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            ..Self::default()
        }
    }

    /// Append a middle parameter.
    pub fn param(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Append a middle parameter if present and non-empty.
    pub fn param_opt(self, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.param(v),
            _ => self,
        }
    }

    /// Set the trailing parameter. It is always written with a `:` marker.
    pub fn trailing(mut self, value: impl Into<String>) -> Self {
        self.trailing = Some(value.into());
        self
    }

    /// Set a source prefix. Clients normally omit it; it is mostly useful
    /// for producing server-style lines in tests.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The command verb.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Middle parameters, in order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Trailing parameter, if any.
    pub fn trailing_param(&self) -> Option<&str> {
        self.trailing.as_deref()
    }

    /// Format into a line without terminator.
    ///
    /// CR and LF inside parameters are replaced by spaces so a parameter can
    /// never smuggle a second line onto the wire.
    pub fn to_line(&self) -> String {
        if self.verb.is_empty() {
            return String::new();
        }

        let mut line = String::with_capacity(64);
        if let Some(source) = &self.source {
            line.push(':');
            line.push_str(&sanitize(source));
            line.push(' ');
        }
        line.push_str(&sanitize(&self.verb));

        for param in &self.params {
            line.push(' ');
            line.push_str(&sanitize(param));
        }

        if let Some(trailing) = &self.trailing {
            line.push_str(" :");
            line.push_str(&sanitize(trailing));
        }

        line
    }

    /// Format and frame for the wire. See [`encode_line`].
    pub fn encode(&self) -> Option<Bytes> {
        encode_line(&self.to_line())
    }
}

impl fmt::Display for OutboundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

fn sanitize(value: &str) -> std::borrow::Cow<'_, str> {
    const LINE_BREAKS: &[char] = &['\r', '\n'];
    if value.contains(LINE_BREAKS) {
        std::borrow::Cow::Owned(value.replace(LINE_BREAKS, " "))
    } else {
        std::borrow::Cow::Borrowed(value)
    }
}
