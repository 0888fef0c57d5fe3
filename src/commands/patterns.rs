//! Standard parameter patterns.
//!
//! All patterns are anchored and match the whole argument.

use regex::Regex;
use std::sync::LazyLock;

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => unreachable!("invalid builtin pattern {pattern}: {e}"),
    }
}

/// Any value.
pub static ANY: LazyLock<Regex> = LazyLock::new(|| compile(r"^.*$"));

/// Signed decimal integer.
pub static INT: LazyLock<Regex> = LazyLock::new(|| compile(r"^[+-]?[0-9]+$"));

/// Unsigned decimal integer.
pub static UINT: LazyLock<Regex> = LazyLock::new(|| compile(r"^[+]?[0-9]+$"));

/// Decimal number with optional fraction and exponent.
pub static FLOAT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[+-]?[0-9]+(\.[0-9]+([eE][+-]?[0-9]+)?)?$"));

/// Boolean words accepted by [`Param::as_bool`](super::Param::as_bool).
pub static BOOL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(1|0|t(rue)?|f(alse)?|y(es)?|no?|on|off)$"));

/// Channel name.
pub static CHANNEL: LazyLock<Regex> = LazyLock::new(|| compile(r"^[#&+!][^ ,:]{1,50}$"));

/// Single user mode change, e.g. `+o`.
pub static MODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[+-][obveI]$"));

/// HTTP(S) URL.
pub static URL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^https?\://[a-zA-Z0-9\-\.]+\.[a-zA-Z]+(\:[0-9]+)?(/\S*)?$")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert!(INT.is_match("-42"));
        assert!(INT.is_match("+7"));
        assert!(!INT.is_match("4.2"));
        assert!(UINT.is_match("+7"));
        assert!(!UINT.is_match("-7"));
        assert!(FLOAT.is_match("1.5e10"));
        assert!(FLOAT.is_match("3"));
        assert!(!FLOAT.is_match("1e10"));
    }

    #[test]
    fn numbers_are_ascii_only() {
        for arabic_three in ["\u{0663}", "\u{0663}.5"] {
            assert!(!INT.is_match(arabic_three));
            assert!(!UINT.is_match(arabic_three));
            assert!(!FLOAT.is_match(arabic_three));
        }
        assert!(!FLOAT.is_match("1.\u{0665}"));
    }

    #[test]
    fn words() {
        for v in ["1", "0", "t", "true", "f", "false", "y", "yes", "n", "no", "on", "off"] {
            assert!(BOOL.is_match(v), "{v}");
        }
        assert!(!BOOL.is_match("maybe"));
        assert!(CHANNEL.is_match("#rust"));
        assert!(!CHANNEL.is_match("#a,b"));
        assert!(!CHANNEL.is_match("rust"));
        assert!(MODE.is_match("+o"));
        assert!(!MODE.is_match("o"));
        assert!(URL.is_match("https://example.com:8080/path?q=1"));
        assert!(!URL.is_match("ftp://example.com"));
        assert!(ANY.is_match(""));
    }
}
