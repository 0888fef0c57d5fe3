//! Orchestrator: wires the connection, dispatcher, plugins and handoff
//! controller together.
//!
//! ```text
//! LineReader ─► decode ─► Session::handle_event ─┬─► PING/ERROR/numerics
//!                                                ├─► PluginHost (own tasks)
//!                                                └─► Registry  (own tasks)
//! signals ─► Control ─► Controller::run ─► ShutdownReason
//! ```

use crate::commands::Registry;
use crate::config::Profile;
use crate::error::BotError;
use crate::handoff::{self, ControlEvent, Controller, HandoffRequest, ShutdownReason, Spawner};
use crate::network::{self, Connection, ConnectionError, LineReader};
use crate::outbound::{self, ResponseWriter};
use crate::plugins::{Builtin, Plugin, PluginContext, PluginHost};
use crate::telemetry::{INBOUND_TARGET, spans};
use autimaat_proto::{InboundEvent, Response, decode};
use std::os::fd::OwnedFd;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{Instrument, debug, info, warn};

const CONTROL_CHANNEL_SIZE: usize = 16;

/// Both ends of the control channel.
pub struct Control {
    pub sender: mpsc::Sender<ControlEvent>,
    pub receiver: mpsc::Receiver<ControlEvent>,
}

impl Control {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(CONTROL_CHANNEL_SIZE);
        Self { sender, receiver }
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::new()
    }
}

/// One bot instance bound to a profile.
pub struct Bot {
    profile: Profile,
    registry: Arc<Registry>,
    plugins: PluginHost,
    fork_on_start: bool,
    idle_timeout: Option<Duration>,
    program: Option<PathBuf>,
}

impl Bot {
    /// Create a bot with the built-in plugin registered.
    pub fn new(profile: Profile) -> Self {
        let whitelist = profile.clone();
        let registry = Arc::new(Registry::new(profile.command_prefix(), move |mask| {
            whitelist.is_whitelisted(mask)
        }));

        let mut plugins = PluginHost::new();
        plugins.register(Builtin::new());

        Self {
            profile,
            registry,
            plugins,
            fork_on_start: true,
            idle_timeout: None,
            program: None,
        }
    }

    pub fn register_plugin(&mut self, plugin: impl Plugin + 'static) {
        self.plugins.register(plugin);
    }

    /// Whether a fresh session hands off once right after connecting, for
    /// supervisors that expect the started process to fork. On by default.
    pub fn fork_on_start(mut self, enabled: bool) -> Self {
        self.fork_on_start = enabled;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Binary started by a handoff. Defaults to the current executable.
    pub fn program(mut self, program: PathBuf) -> Self {
        self.program = Some(program);
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Connect (or adopt `inherited[0]`), then serve until a stop signal
    /// or disconnect.
    ///
    /// Inherited descriptors beyond the first are closed: a bot has one
    /// connection.
    pub async fn run<S: Spawner>(
        self,
        control: Control,
        inherited: Vec<OwnedFd>,
        spawner: S,
    ) -> Result<ShutdownReason, BotError> {
        let address = self.profile.address();
        self.serve(control, inherited, spawner)
            .instrument(spans::connection(&address))
            .await
    }

    async fn serve<S: Spawner>(
        self,
        mut control: Control,
        inherited: Vec<OwnedFd>,
        spawner: S,
    ) -> Result<ShutdownReason, BotError> {
        let Bot {
            profile,
            registry,
            plugins,
            fork_on_start,
            idle_timeout,
            program,
        } = self;

        let address = profile.address();
        let tls = profile
            .tls()
            .map(|paths| network::client_config(&paths))
            .transpose()?;

        let fresh = inherited.is_empty();
        let mut connection = match inherited.into_iter().next() {
            Some(fd) => {
                info!(%address, "Inheriting connection");
                let connection = Connection::adopt(fd, &address, tls).await?;
                if let Err(e) = handoff::notify_parent() {
                    warn!(error = %e, "Failed to signal parent");
                }
                connection
            }
            None => {
                info!(%address, "Opening new connection");
                Connection::dial(&address, tls).await?
            }
        };
        if let Some(timeout) = idle_timeout {
            connection = connection.with_idle_timeout(timeout);
        }

        let fd = connection.raw_fd();
        let (reader, writer) = connection.split();
        let responder: Arc<dyn ResponseWriter> = Arc::new(writer.clone());

        if fresh {
            register(&*responder, &profile).await?;
        }

        let program = match program {
            Some(program) => program,
            None => std::env::current_exe().map_err(handoff::HandoffError::Spawn)?,
        };

        let ctx = PluginContext {
            profile: profile.clone(),
            registry: Arc::clone(&registry),
            control: control.sender.clone(),
        };
        plugins.load_all(&ctx);

        let request = HandoffRequest::new(program, &profile.fork_args(), vec![fd]);
        let mut controller = Controller::new(spawner, request);

        let session = Arc::new(Session {
            profile,
            registry,
            plugins,
            writer: responder,
        });
        let read_loop = tokio::spawn(
            read_loop(
                reader,
                Arc::clone(&session),
                controller.read_gate(),
                control.sender.clone(),
            )
            .in_current_span(),
        );

        if fresh && fork_on_start {
            // Self-triggered first handoff.
            let _ = control.sender.send(ControlEvent::Reload).await;
        }

        info!("Waiting for control events");
        let reason = controller.run(&mut control.receiver).await;
        info!(?reason, "Shutting down");

        writer.close().await;
        // Dropping the controller releases a read loop parked on the gate.
        drop(controller);
        if let Err(e) = read_loop.await {
            warn!(error = %e, "Read loop task failed");
        }
        session.plugins.unload_all(&ctx);

        Ok(reason)
    }
}

/// Registration handshake for a fresh connection.
async fn register(w: &dyn ResponseWriter, profile: &Profile) -> Result<(), BotError> {
    let nickname = profile.nickname();
    outbound::pass(w, &profile.connection_password()).await?;
    outbound::user(w, &nickname, &nickname).await?;
    outbound::nick(w, &nickname, &profile.nickserv_password()).await?;
    Ok(())
}

/// Everything the read loop needs per event.
struct Session {
    profile: Profile,
    registry: Arc<Registry>,
    plugins: PluginHost,
    writer: Arc<dyn ResponseWriter>,
}

async fn read_loop(
    mut reader: LineReader,
    session: Arc<Session>,
    mut gate: watch::Receiver<bool>,
    control: mpsc::Sender<ControlEvent>,
) {
    info!("Entering data loop");

    let reason = loop {
        let open = *gate.borrow();
        if !open && gate.wait_for(|open| *open).await.is_err() {
            break "control loop ended".to_string();
        }

        let line = tokio::select! {
            biased;
            paused = gate.wait_for(|open| !*open) => {
                if paused.is_err() {
                    break "control loop ended".to_string();
                }
                debug!("Reads paused for handoff");
                continue;
            }
            line = reader.read_line() => line,
        };

        match line {
            Ok(line) => {
                if let Some(event) = decode(&line) {
                    session.handle_event(event).await;
                }
            }
            Err(ConnectionError::Closed) => break "connection closed".to_string(),
            Err(e) => break e.to_string(),
        }
    };

    info!(%reason, "Data loop ended");
    let _ = control.send(ControlEvent::Disconnected(reason)).await;
}

impl Session {
    async fn handle_event(&self, event: InboundEvent) {
        // Private messages are answered to the sender, not to ourselves.
        let event = if self.profile.is_nick(&event.target) {
            event.with_target(&event.sender_nick)
        } else {
            event
        };

        match event.message_type.as_str() {
            "PING" => {
                if let Err(e) = outbound::pong(&*self.writer, &event.payload).await {
                    warn!(error = %e, "Failed to answer PING");
                }
                return;
            }
            "ERROR" => {
                warn!(error = %event.payload, "Network error");
                return;
            }
            _ => {}
        }

        match Response::from_code(&event.message_type) {
            Some(Response::RPL_WELCOME) => info!(nick = %event.target, "Registered"),
            Some(response) if response.is_login_complete() => self.on_login().await,
            Some(Response::ERR_NICKNAMEINUSE) => self.on_nick_in_use().await,
            _ => {}
        }

        if self.profile.logging() {
            info!(target: INBOUND_TARGET, "{event}");
        }

        self.plugins.dispatch(&self.writer, &event);
        self.registry.dispatch(Arc::clone(&self.writer), &event).await;
    }

    async fn on_login(&self) {
        let w = &*self.writer;
        if let Err(e) = outbound::oper(w, &self.profile.nickname(), &self.profile.oper_password()).await {
            warn!(error = %e, "Failed to send OPER");
        }

        for channel in self.profile.channels() {
            info!(channel = %channel.name, "Joining channel");
            if let Err(e) = outbound::join(w, &channel.name, &channel.key, &channel.password).await {
                warn!(channel = %channel.name, error = %e, "Failed to join channel");
            }
        }
    }

    async fn on_nick_in_use(&self) {
        let w = &*self.writer;
        let nickname = self.profile.nickname();
        let password = self.profile.nickserv_password();

        let result = if password.is_empty() {
            let alternative = format!("{nickname}_");
            info!(taken = %nickname, trying = %alternative, "Nickname in use");
            if let Err(e) = self.profile.set_nickname(&alternative) {
                warn!(error = %e, "Failed to save new nickname");
            }
            outbound::nick(w, &alternative, "").await
        } else {
            info!(nick = %nickname, "Nickname in use, recovering");
            outbound::recover(w, &nickname, &password).await
        };

        if let Err(e) = result {
            warn!(error = %e, "Failed to handle nickname collision");
        }
    }
}
