//! Profile loading, persistence and runtime access.
//!
//! - [`types`]: the serialized form ([`ProfileData`], [`ChannelConfig`], [`TlsPaths`])
//! - [`Profile`]: a shared handle with accessors; setters persist immediately

mod types;

pub use types::{ChannelConfig, ProfileData, TlsPaths};

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// File name of the profile inside its root directory.
pub const PROFILE_FILE: &str = "profile.toml";

/// Profile loading and saving errors.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to access profile {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profile: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize profile: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Shared, thread-safe handle to a bot profile.
///
/// Cloning is cheap; all clones see the same data.
#[derive(Debug, Clone)]
pub struct Profile {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    root: PathBuf,
    data: RwLock<ProfileData>,
}

impl Profile {
    /// Build a handle from in-memory data.
    pub fn new(root: impl Into<PathBuf>, data: ProfileData) -> Self {
        Self {
            inner: Arc::new(Inner {
                root: root.into(),
                data: RwLock::new(data),
            }),
        }
    }

    /// The default profile for a fresh root, as written by `--new`.
    pub fn new_default(root: impl Into<PathBuf>) -> Self {
        Self::new(root, ProfileData::default())
    }

    /// Load `<root>/profile.toml`.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ProfileError> {
        let root = root.into();
        let path = root.join(PROFILE_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| ProfileError::Io {
            path: path.clone(),
            source,
        })?;
        let data: ProfileData = toml::from_str(&content)?;
        Ok(Self::new(root, data))
    }

    /// Write the profile back to `<root>/profile.toml`.
    pub fn save(&self) -> Result<(), ProfileError> {
        let content = toml::to_string_pretty(&*self.inner.data.read())?;
        let path = self.path();
        std::fs::write(&path, content).map_err(|source| ProfileError::Io { path, source })
    }

    /// Path of the profile file.
    pub fn path(&self) -> PathBuf {
        self.inner.root.join(PROFILE_FILE)
    }

    /// Profile root directory.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Arguments a handed-off child needs after the descriptor count.
    pub fn fork_args(&self) -> Vec<String> {
        vec![self.inner.root.to_string_lossy().into_owned()]
    }

    /// Copy of the current data.
    pub fn snapshot(&self) -> ProfileData {
        self.inner.data.read().clone()
    }

    pub fn address(&self) -> String {
        self.inner.data.read().address.clone()
    }

    /// TLS file paths resolved against the profile root.
    pub fn tls(&self) -> Option<TlsPaths> {
        let tls = self.inner.data.read().tls.clone()?;
        Some(TlsPaths {
            cert: self.resolve(&tls.cert),
            key: self.resolve(&tls.key),
            ca: tls.ca.as_deref().map(|ca| self.resolve(ca)),
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.inner.root.join(path)
        }
    }

    pub fn nickname(&self) -> String {
        self.inner.data.read().nickname.clone()
    }

    pub fn set_nickname(&self, nickname: &str) -> Result<(), ProfileError> {
        self.inner.data.write().nickname = nickname.to_string();
        self.save()
    }

    /// True if `name` is the bot's own nickname.
    pub fn is_nick(&self, name: &str) -> bool {
        self.inner.data.read().nickname.eq_ignore_ascii_case(name)
    }

    pub fn nickserv_password(&self) -> String {
        self.inner.data.read().nickserv_password.clone()
    }

    pub fn set_nickserv_password(&self, password: &str) -> Result<(), ProfileError> {
        self.inner.data.write().nickserv_password = password.to_string();
        self.save()
    }

    pub fn oper_password(&self) -> String {
        self.inner.data.read().oper_password.clone()
    }

    pub fn connection_password(&self) -> String {
        self.inner.data.read().connection_password.clone()
    }

    pub fn command_prefix(&self) -> String {
        self.inner.data.read().command_prefix.clone()
    }

    pub fn channels(&self) -> Vec<ChannelConfig> {
        self.inner.data.read().channels.clone()
    }

    pub fn logging(&self) -> bool {
        self.inner.data.read().logging
    }

    pub fn set_logging(&self, enabled: bool) -> Result<(), ProfileError> {
        self.inner.data.write().logging = enabled;
        self.save()
    }

    pub fn whitelist(&self) -> Vec<String> {
        self.inner.data.read().whitelist.clone()
    }

    /// True if `mask` is on the whitelist, ignoring ASCII case.
    pub fn is_whitelisted(&self, mask: &str) -> bool {
        self.inner
            .data
            .read()
            .whitelist
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mask))
    }

    /// Add a hostmask. Existing entries are left alone and nothing is saved.
    pub fn whitelist_add(&self, mask: &str) -> Result<(), ProfileError> {
        {
            let mut data = self.inner.data.write();
            if data.whitelist.iter().any(|m| m.eq_ignore_ascii_case(mask)) {
                return Ok(());
            }
            data.whitelist.push(mask.to_string());
        }
        self.save()
    }

    pub fn whitelist_remove(&self, mask: &str) -> Result<(), ProfileError> {
        self.inner
            .data
            .write()
            .whitelist
            .retain(|m| !m.eq_ignore_ascii_case(mask));
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new_default(dir.path());
        profile.save().unwrap();

        let loaded = Profile::load(dir.path()).unwrap();
        assert_eq!(loaded.snapshot(), ProfileData::default());
        assert_eq!(loaded.command_prefix(), "!");
    }

    #[test]
    fn minimal_profile_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROFILE_FILE),
            "address = \"irc.example.net:6697\"\nnickname = \"autimaat\"\n",
        )
        .unwrap();

        let profile = Profile::load(dir.path()).unwrap();
        assert_eq!(profile.address(), "irc.example.net:6697");
        assert_eq!(profile.command_prefix(), "!");
        assert!(profile.channels().is_empty());
        assert!(profile.tls().is_none());
        assert!(!profile.logging());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Profile::load(dir.path()).unwrap_err();
        assert!(matches!(err, ProfileError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROFILE_FILE), "address = [").unwrap();
        let err = Profile::load(dir.path()).unwrap_err();
        assert!(matches!(err, ProfileError::Parse(_)));
    }

    #[test]
    fn setters_persist() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new_default(dir.path());
        profile.set_nickname("autimaat_").unwrap();
        profile.set_logging(true).unwrap();

        let loaded = Profile::load(dir.path()).unwrap();
        assert_eq!(loaded.nickname(), "autimaat_");
        assert!(loaded.logging());
    }

    #[test]
    fn nick_and_whitelist_ignore_case() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new_default(dir.path());
        assert!(profile.is_nick("BOT_NAME"));
        assert!(profile.is_whitelisted("~USER@server.com"));

        profile.whitelist_add("~Admin@host").unwrap();
        profile.whitelist_add("~admin@HOST").unwrap();
        assert_eq!(profile.whitelist().len(), 2);

        profile.whitelist_remove("~ADMIN@host").unwrap();
        assert!(!profile.is_whitelisted("~admin@host"));
    }

    #[test]
    fn tls_paths_resolve_against_root() {
        let dir = tempfile::tempdir().unwrap();
        let data = ProfileData {
            tls: Some(TlsPaths {
                cert: PathBuf::from("client.pem"),
                key: PathBuf::from("/etc/bot/client.key"),
                ca: Some(PathBuf::from("ca.pem")),
            }),
            ..ProfileData::default()
        };
        let profile = Profile::new(dir.path(), data);
        let tls = profile.tls().unwrap();
        assert_eq!(tls.cert, dir.path().join("client.pem"));
        assert_eq!(tls.key, PathBuf::from("/etc/bot/client.key"));
        assert_eq!(tls.ca, Some(dir.path().join("ca.pem")));
    }

    #[test]
    fn fork_args_is_root() {
        let profile = Profile::new_default("/srv/bot");
        assert_eq!(profile.fork_args(), vec!["/srv/bot".to_string()]);
    }
}
