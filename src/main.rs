//! autimaat - IRC bot with zero-downtime binary handoff.

use anyhow::Context;
use autimaat::config::{PROFILE_FILE, Profile};
use autimaat::handoff::{self, ExecSpawner, ShutdownReason};
use autimaat::telemetry::{self, spans};
use autimaat::{Bot, Control};
use clap::Parser;
use std::os::fd::OwnedFd;
use std::path::PathBuf;
use tracing::{Instrument, error, info};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "autimaat", version, about = "IRC bot with zero-downtime binary handoff")]
struct Args {
    /// Number of inherited connection descriptors (set by a parent process
    /// during handoff).
    #[arg(long, default_value_t = 0)]
    fork: usize,

    /// Write a default profile to the profile directory and exit.
    #[arg(long)]
    new: bool,

    /// Profile directory.
    profile: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Claimed before anything else can reuse the slots.
    let inherited = handoff::inherited_descriptors(args.fork)?;

    telemetry::init();
    run(args, inherited).instrument(spans::process()).await
}

async fn run(args: Args, inherited: Vec<OwnedFd>) -> anyhow::Result<()> {
    if args.new {
        std::fs::create_dir_all(&args.profile)
            .with_context(|| format!("creating {}", args.profile.display()))?;
        let profile = Profile::new_default(std::fs::canonicalize(&args.profile)?);
        profile.save()?;
        info!(path = %profile.path().display(), "Wrote default profile");
        return Ok(());
    }

    let root = std::fs::canonicalize(&args.profile)
        .with_context(|| format!("profile directory {}", args.profile.display()))?;
    let profile = Profile::load(&root).map_err(|e| {
        error!(path = %root.join(PROFILE_FILE).display(), error = %e, "Failed to load profile");
        e
    })?;

    std::env::set_current_dir(&root)?;
    std::fs::write("app.pid", std::process::id().to_string()).context("writing app.pid")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %profile.address(),
        inherited = inherited.len(),
        "Starting autimaat"
    );

    let control = Control::new();
    handoff::forward_signals(control.sender.clone())?;

    let reason = Bot::new(profile)
        .run(control, inherited, ExecSpawner)
        .await
        .map_err(|e| {
            error!(error = %e, code = e.error_code(), "Bot stopped with an error");
            e
        })?;

    match reason {
        ShutdownReason::Signal(signal) => {
            info!(?signal, "Stopped");
            Ok(())
        }
        ShutdownReason::Disconnected(reason) => {
            anyhow::bail!("disconnected: {reason}")
        }
    }
}
