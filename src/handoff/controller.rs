//! Handoff state machine and control loop.

use super::spawn::{HandoffRequest, Spawner};
use super::{ControlEvent, StopSignal};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// How long a spawned child gets to confirm adoption before the parent
/// resumes reading.
pub const HANDOFF_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffState {
    /// Serving normally.
    Running,
    /// A child was spawned and has not confirmed yet. Reads are paused.
    HandoffInProgress,
    /// Shutting down.
    Terminated,
}

/// Why the control loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A stop signal, including the child's confirmation after a handoff.
    Signal(StopSignal),
    /// The connection died.
    Disconnected(String),
}

/// Drives handoffs and shutdown from a stream of [`ControlEvent`]s.
///
/// The read gate handed out by [`read_gate`](Self::read_gate) is closed
/// while a child is being spawned, so the parent's read loop never competes
/// with the child for inbound data.
pub struct Controller<S> {
    spawner: S,
    request: HandoffRequest,
    state: HandoffState,
    gate: watch::Sender<bool>,
    handoff_timeout: Duration,
}

impl<S: Spawner> Controller<S> {
    pub fn new(spawner: S, request: HandoffRequest) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            spawner,
            request,
            state: HandoffState::Running,
            gate,
            handoff_timeout: HANDOFF_TIMEOUT,
        }
    }

    pub fn with_handoff_timeout(mut self, timeout: Duration) -> Self {
        self.handoff_timeout = timeout;
        self
    }

    pub fn state(&self) -> HandoffState {
        self.state
    }

    /// Receiver that is `true` while the read loop may read.
    pub fn read_gate(&self) -> watch::Receiver<bool> {
        self.gate.subscribe()
    }

    /// Consume events until shutdown.
    pub async fn run(&mut self, events: &mut mpsc::Receiver<ControlEvent>) -> ShutdownReason {
        loop {
            let next = if self.state == HandoffState::HandoffInProgress {
                match tokio::time::timeout(self.handoff_timeout, events.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(timeout = ?self.handoff_timeout, "Handoff child did not confirm, resuming");
                        self.resume();
                        continue;
                    }
                }
            } else {
                events.recv().await
            };

            let Some(event) = next else {
                self.state = HandoffState::Terminated;
                return ShutdownReason::Disconnected("control channel closed".to_string());
            };

            if let Some(reason) = self.handle(event) {
                return reason;
            }
        }
    }

    /// Apply one event. Returns the shutdown reason once terminated.
    pub fn handle(&mut self, event: ControlEvent) -> Option<ShutdownReason> {
        if self.state == HandoffState::Terminated {
            return None;
        }

        match event {
            ControlEvent::Reload => {
                self.handoff();
                None
            }
            ControlEvent::Stop(signal) => {
                info!(?signal, state = ?self.state, "Stopping");
                self.state = HandoffState::Terminated;
                Some(ShutdownReason::Signal(signal))
            }
            ControlEvent::Disconnected(reason) => {
                info!(%reason, "Connection lost");
                self.state = HandoffState::Terminated;
                Some(ShutdownReason::Disconnected(reason))
            }
        }
    }

    fn handoff(&mut self) {
        if self.state != HandoffState::Running {
            debug!("Handoff already in progress");
            return;
        }

        info!(argv = ?self.request.argv, "Forking process");
        self.state = HandoffState::HandoffInProgress;
        self.gate.send_replace(false);

        match self.spawner.spawn(&self.request) {
            Ok(pid) => info!(child = pid, "Handoff child started"),
            Err(e) => {
                error!(error = %e, "Handoff failed");
                self.resume();
            }
        }
    }

    fn resume(&mut self) {
        self.state = HandoffState::Running;
        self.gate.send_replace(true);
    }
}
