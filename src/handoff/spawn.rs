//! Fork and exec of the handoff child.

use super::{HandoffError, INHERITED_FD_BASE};
use std::os::fd::RawFd;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;

/// One fork+exec: program, its arguments, and the descriptors the child
/// finds at slots `3, 4, ...` in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRequest {
    pub program: PathBuf,
    pub argv: Vec<String>,
    pub descriptors: Vec<RawFd>,
}

impl HandoffRequest {
    /// Request that re-runs `program` as `program --fork N <fork_args...>`.
    pub fn new(program: PathBuf, fork_args: &[String], descriptors: Vec<RawFd>) -> Self {
        let mut argv = vec!["--fork".to_string(), descriptors.len().to_string()];
        argv.extend(fork_args.iter().cloned());
        Self {
            program,
            argv,
            descriptors,
        }
    }
}

/// Starts handoff children.
pub trait Spawner: Send {
    /// Start the child and return its pid. Must not wait for it.
    fn spawn(&mut self, request: &HandoffRequest) -> Result<u32, HandoffError>;
}

/// Spawner that really forks and execs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecSpawner;

impl Spawner for ExecSpawner {
    fn spawn(&mut self, request: &HandoffRequest) -> Result<u32, HandoffError> {
        let descriptors = request.descriptors.clone();
        let mut command = Command::new(&request.program);
        command.args(&request.argv);

        #[allow(unsafe_code)]
        // SAFETY: the closure runs in the forked child before exec and only
        // issues fcntl and dup2, which are async-signal-safe. It reads the
        // moved-in vector without allocating.
        unsafe {
            command.pre_exec(move || place_descriptors(&descriptors));
        }

        let child = command.spawn().map_err(HandoffError::Spawn)?;
        Ok(child.id())
    }
}

/// Move `descriptors` to `3..3+N` in order.
///
/// Sources are first duplicated above the target range so a source that
/// already sits on a target slot is never overwritten before it is copied.
/// Those temporaries are close-on-exec; the final `dup2` copies are not.
fn place_descriptors(descriptors: &[RawFd]) -> std::io::Result<()> {
    use nix::fcntl::{FcntlArg, fcntl};
    use nix::unistd::dup2;

    const MAX_DESCRIPTORS: usize = 16;
    if descriptors.len() > MAX_DESCRIPTORS {
        return Err(std::io::Error::from_raw_os_error(nix::libc::EMFILE));
    }

    let above = INHERITED_FD_BASE + descriptors.len() as RawFd;
    let mut temporaries = [0 as RawFd; MAX_DESCRIPTORS];
    for (slot, &fd) in temporaries.iter_mut().zip(descriptors) {
        *slot = fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(above))?;
    }

    for (i, &temporary) in temporaries[..descriptors.len()].iter().enumerate() {
        dup2(temporary, INHERITED_FD_BASE + i as RawFd)?;
    }
    Ok(())
}
