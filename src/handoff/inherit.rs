//! Descriptor inheritance on the child side.

use super::HandoffError;
use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use nix::sys::signal::{Signal, kill};
use nix::unistd::getppid;
use std::os::fd::{FromRawFd, OwnedFd, RawFd};
use tracing::info;

/// First slot of inherited descriptors.
pub const INHERITED_FD_BASE: RawFd = 3;

/// Take ownership of `count` descriptors inherited at `3, 4, ...`.
///
/// Must be called once, at startup, before anything else opens files.
pub fn inherited_descriptors(count: usize) -> Result<Vec<OwnedFd>, HandoffError> {
    inherited_descriptors_from(INHERITED_FD_BASE, count)
}

/// Take ownership of `count` descriptors starting at `base`.
///
/// Each slot must hold an open descriptor that nothing else in this process
/// owns. The descriptors are marked close-on-exec so they only reach a
/// later child through an explicit handoff.
pub fn inherited_descriptors_from(
    base: RawFd,
    count: usize,
) -> Result<Vec<OwnedFd>, HandoffError> {
    let mut descriptors = Vec::with_capacity(count);
    for fd in (base..).take(count) {
        let check = fcntl(fd, FcntlArg::F_GETFD)
            .and_then(|_| fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)));
        if let Err(errno) = check {
            return Err(HandoffError::Descriptor {
                fd,
                source: errno.into(),
            });
        }

        #[allow(unsafe_code)]
        // SAFETY: fcntl just confirmed the slot is open, and inherited slots
        // are not owned by any other object in this process.
        let owned = unsafe { OwnedFd::from_raw_fd(fd) };
        descriptors.push(owned);
    }

    if count > 0 {
        info!(count, base, "Inherited descriptors");
    }
    Ok(descriptors)
}

/// Tell the parent we took over: it stops on SIGINT.
pub fn notify_parent() -> Result<(), HandoffError> {
    let parent = getppid();
    kill(parent, Signal::SIGINT).map_err(|errno| HandoffError::Signal(errno.into()))?;
    info!(parent = parent.as_raw(), "Signalled parent to stop");
    Ok(())
}
