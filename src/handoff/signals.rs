//! OS signal adapter.

use super::{ControlEvent, HandoffError, StopSignal};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Translate process signals into control events.
///
/// SIGUSR1 becomes [`ControlEvent::Reload`]; SIGINT, SIGTERM, SIGHUP and
/// SIGQUIT become [`ControlEvent::Stop`]. The task ends when the receiver
/// is dropped.
pub fn forward_signals(events: mpsc::Sender<ControlEvent>) -> Result<JoinHandle<()>, HandoffError> {
    let mut reload = signal(SignalKind::user_defined1()).map_err(HandoffError::Signal)?;
    let mut interrupt = signal(SignalKind::interrupt()).map_err(HandoffError::Signal)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(HandoffError::Signal)?;
    let mut hangup = signal(SignalKind::hangup()).map_err(HandoffError::Signal)?;
    let mut quit = signal(SignalKind::quit()).map_err(HandoffError::Signal)?;

    Ok(tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                Some(()) = reload.recv() => ControlEvent::Reload,
                Some(()) = interrupt.recv() => ControlEvent::Stop(StopSignal::Interrupt),
                Some(()) = terminate.recv() => ControlEvent::Stop(StopSignal::Terminate),
                Some(()) = hangup.recv() => ControlEvent::Stop(StopSignal::Hangup),
                Some(()) = quit.recv() => ControlEvent::Stop(StopSignal::Quit),
                else => break,
            };

            info!(?event, "Received signal");
            if events.send(event).await.is_err() {
                break;
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::{Signal, raise};

    #[tokio::test]
    async fn sigusr1_becomes_reload() {
        let (tx, mut rx) = mpsc::channel(4);
        let task = forward_signals(tx).unwrap();

        raise(Signal::SIGUSR1).unwrap();
        assert_eq!(rx.recv().await, Some(ControlEvent::Reload));

        drop(rx);
        task.abort();
    }
}
