//! Numeric replies the bot reacts to.
//!
//! Only the handful of codes with special handling are modeled; every other
//! numeric is passed through as a plain message type string.

/// Numeric reply codes with special handling.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Response {
    /// 001 - registration accepted.
    RPL_WELCOME = 1,
    /// 376 - end of the message of the day.
    RPL_ENDOFMOTD = 376,
    /// 422 - the server has no message of the day.
    ERR_NOMOTD = 422,
    /// 433 - requested nickname is taken.
    ERR_NICKNAMEINUSE = 433,
}

impl Response {
    /// Look up a three-digit message type.
    pub fn from_code(code: &str) -> Option<Self> {
        if code.len() != 3 {
            return None;
        }
        match code.parse::<u16>().ok()? {
            1 => Some(Self::RPL_WELCOME),
            376 => Some(Self::RPL_ENDOFMOTD),
            422 => Some(Self::ERR_NOMOTD),
            433 => Some(Self::ERR_NICKNAMEINUSE),
            _ => None,
        }
    }

    /// Numeric value of the reply.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// True for replies that mark the end of the login sequence. Channel
    /// joins and operator login wait for one of these.
    pub fn is_login_complete(self) -> bool {
        matches!(self, Self::RPL_ENDOFMOTD | Self::ERR_NOMOTD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes() {
        assert_eq!(Response::from_code("001"), Some(Response::RPL_WELCOME));
        assert_eq!(Response::from_code("433"), Some(Response::ERR_NICKNAMEINUSE));
        assert_eq!(Response::from_code("376").map(Response::code), Some(376));
    }

    #[test]
    fn rejects_other_types() {
        assert_eq!(Response::from_code("1"), None);
        assert_eq!(Response::from_code("PRIVMSG"), None);
        assert_eq!(Response::from_code("999"), None);
    }

    #[test]
    fn login_completion() {
        assert!(Response::RPL_ENDOFMOTD.is_login_complete());
        assert!(Response::ERR_NOMOTD.is_login_complete());
        assert!(!Response::RPL_WELCOME.is_login_complete());
    }
}
