//! Integration test common infrastructure.
//!
//! Provides a loopback stand-in for the IRC server and helpers for building
//! bot profiles that point at it.

pub mod server;

#[allow(unused_imports)]
pub use server::{FakeServer, Peer};

use autimaat::config::{ChannelConfig, Profile, ProfileData};
use std::path::Path;

/// Profile pointing at `address`, saved under `root`.
#[allow(dead_code)]
pub fn profile(root: &Path, address: &str, nickserv_password: &str) -> Profile {
    let data = ProfileData {
        address: address.to_string(),
        nickname: "autimaat".to_string(),
        nickserv_password: nickserv_password.to_string(),
        whitelist: vec!["~boss@admin.host".to_string()],
        channels: vec![ChannelConfig {
            name: "#rust".to_string(),
            key: String::new(),
            password: String::new(),
        }],
        ..ProfileData::default()
    };
    let profile = Profile::new(root, data);
    profile.save().expect("save profile");
    profile
}
