//! Profile data as stored on disk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persistent part of a bot profile (`profile.toml`).
///
/// Plain values come first so the TOML serializer can emit the array of
/// channel tables and the `[tls]` table after them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileData {
    /// Server address as `host:port`.
    pub address: String,
    /// Nickname the bot registers with.
    pub nickname: String,
    /// Password used to identify with the nick service.
    #[serde(default)]
    pub nickserv_password: String,
    /// Password for `OPER`, sent once login completes.
    #[serde(default)]
    pub oper_password: String,
    /// Connection password sent with `PASS`.
    #[serde(default)]
    pub connection_password: String,
    /// Prefix that marks a message as a bot command.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Log every inbound event.
    #[serde(default)]
    pub logging: bool,
    /// Hostmasks allowed to run restricted commands.
    #[serde(default)]
    pub whitelist: Vec<String>,
    /// Channels joined after login.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    /// Client certificate settings. TLS is used when this table is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsPaths>,
}

fn default_command_prefix() -> String {
    "!".to_string()
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            address: "server.net:6667".to_string(),
            nickname: "bot_name".to_string(),
            nickserv_password: String::new(),
            oper_password: String::new(),
            connection_password: String::new(),
            command_prefix: default_command_prefix(),
            logging: false,
            whitelist: vec!["~user@server.com".to_string()],
            channels: vec![ChannelConfig {
                name: "#test_channel".to_string(),
                key: String::new(),
                password: String::new(),
            }],
            tls: None,
        }
    }
}

/// A channel to join after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel name, including its prefix.
    pub name: String,
    /// Channel key for `JOIN`.
    #[serde(default)]
    pub key: String,
    /// Password to identify with the channel service after joining.
    #[serde(default)]
    pub password: String,
}

/// PEM files for the TLS client.
///
/// Relative paths are resolved against the profile root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsPaths {
    /// Client certificate chain.
    pub cert: PathBuf,
    /// Private key for `cert`.
    pub key: PathBuf,
    /// Replacement set of trusted roots. Native roots are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<PathBuf>,
}
