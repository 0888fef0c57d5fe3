//! Channel name helpers.

/// Extension trait for channel-name checks on string types.
pub trait ChannelExt {
    /// True if the name starts with a channel prefix (`#`, `&`, `+`, `!`).
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        matches!(self.as_bytes().first(), Some(b'#' | b'&' | b'+' | b'!'))
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
