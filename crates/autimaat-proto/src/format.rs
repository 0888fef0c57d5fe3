//! Text formatting wrappers.
//!
//! Control codes understood by common clients:
//! - 0x02 (^B): Bold
//! - 0x1D (^]): Italic
//! - 0x1F (^_): Underline
//! - 0x01 ACTION ... 0x01: CTCP action (`/me`)

/// Wrap text in bold markers.
pub fn bold(text: &str) -> String {
    format!("\x02{text}\x02")
}

/// Wrap text in italic markers.
pub fn italic(text: &str) -> String {
    format!("\x1d{text}\x1d")
}

/// Wrap text in underline markers.
pub fn underline(text: &str) -> String {
    format!("\x1f{text}\x1f")
}

/// Format text as a CTCP ACTION, shown by clients as `* nick text`.
pub fn action(text: &str) -> String {
    format!("\x01ACTION {text}\x01")
}
