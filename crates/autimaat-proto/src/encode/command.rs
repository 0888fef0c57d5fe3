//! Constructors for the commands the bot sends.
//!
//! Each constructor fixes the arity of its command. Anything that needs more
//! than one line (identifying to a service after a join, for instance) is
//! composed by the caller out of several of these.

use super::OutboundCommand;

impl OutboundCommand {
    /// `PASS password`: connection password, sent before registration.
    pub fn pass(password: &str) -> Self {
        Self::new("PASS").param(password)
    }

    /// `USER username mode * :realname`
    pub fn user(username: &str, mode: &str, realname: &str) -> Self {
        Self::new("USER")
            .param(username)
            .param(mode)
            .param("*")
            .trailing(realname)
    }

    /// `NICK nickname`
    pub fn nick(nickname: &str) -> Self {
        Self::new("NICK").param(nickname)
    }

    /// `JOIN channel [key]`
    pub fn join(channel: &str, key: Option<&str>) -> Self {
        Self::new("JOIN").param(channel).param_opt(key)
    }

    /// `PART channel`
    pub fn part(channel: &str) -> Self {
        Self::new("PART").param(channel)
    }

    /// `PRIVMSG target :text`
    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new("PRIVMSG").param(target).trailing(text)
    }

    /// `NOTICE target :text`. Automatic replies must never answer a notice.
    pub fn notice(target: &str, text: &str) -> Self {
        Self::new("NOTICE").param(target).trailing(text)
    }

    /// `PONG :payload` in reply to a server `PING`.
    pub fn pong(payload: &str) -> Self {
        Self::new("PONG").trailing(payload)
    }

    /// `MODE target mode [argument]`
    pub fn mode(target: &str, mode: &str, argument: Option<&str>) -> Self {
        Self::new("MODE").param(target).param(mode).param_opt(argument)
    }

    /// `OPER name password`
    pub fn oper(name: &str, password: &str) -> Self {
        Self::new("OPER").param(name).param(password)
    }

    /// `NS RECOVER nickname password`: reclaim a registered nick that is
    /// currently held by someone else.
    pub fn recover(nickname: &str, password: &str) -> Self {
        Self::new("NS")
            .param("RECOVER")
            .param(nickname)
            .param(password)
    }

    /// `QUIT [:message]`
    pub fn quit(message: Option<&str>) -> Self {
        match message {
            Some(m) => Self::new("QUIT").trailing(m),
            None => Self::new("QUIT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(cmd: OutboundCommand) -> String {
        cmd.to_line()
    }

    #[test]
    fn registration_commands() {
        assert_eq!(line(OutboundCommand::pass("secret")), "PASS secret");
        assert_eq!(line(OutboundCommand::user("bot", "8", "bot")), "USER bot 8 * :bot");
        assert_eq!(line(OutboundCommand::nick("bot")), "NICK bot");
    }

    #[test]
    fn join_with_and_without_key() {
        assert_eq!(line(OutboundCommand::join("#a", None)), "JOIN #a");
        assert_eq!(line(OutboundCommand::join("#a", Some("k"))), "JOIN #a k");
    }

    #[test]
    fn messaging_commands() {
        assert_eq!(line(OutboundCommand::privmsg("#a", "hi all")), "PRIVMSG #a :hi all");
        assert_eq!(line(OutboundCommand::notice("bob", "no")), "NOTICE bob :no");
        assert_eq!(line(OutboundCommand::pong("irc.net")), "PONG :irc.net");
    }

    #[test]
    fn mode_and_recover() {
        assert_eq!(line(OutboundCommand::mode("#a", "+o", Some("bob"))), "MODE #a +o bob");
        assert_eq!(line(OutboundCommand::mode("bot", "+B", None)), "MODE bot +B");
        assert_eq!(line(OutboundCommand::recover("bot", "pw")), "NS RECOVER bot pw");
    }

    #[test]
    fn part_oper_quit() {
        assert_eq!(line(OutboundCommand::part("#a")), "PART #a");
        assert_eq!(line(OutboundCommand::oper("bot", "pw")), "OPER bot pw");
        assert_eq!(line(OutboundCommand::quit(None)), "QUIT");
        assert_eq!(line(OutboundCommand::quit(Some("bye now"))), "QUIT :bye now");
    }
}
