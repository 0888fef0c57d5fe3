//! Command registry: bind, unbind and dispatch.

use super::command::{Command, Handler, Invocation, ParamSpec};
use super::param::{Param, ParamList};
use super::split::split;
use super::text;
use crate::outbound::{self, ResponseWriter};
use crate::telemetry::spans;
use autimaat_proto::InboundEvent;
use autimaat_proto::format::bold;
use futures_util::FutureExt;
use parking_lot::RwLock;
use regex::Regex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, warn};

/// Pause between help lines, to stay under server flood limits.
pub const HELP_LINE_DELAY: Duration = Duration::from_millis(750);

/// Result of [`Registry::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The payload does not start with the command prefix.
    NotCommand,
    /// No command is bound under that name.
    UnknownCommand,
    /// Restricted command, sender not authorized. A reply was sent.
    AccessDenied,
    /// Fewer arguments than required parameters. A reply was sent.
    MissingParameters,
    /// An argument failed its pattern. A reply was sent.
    InvalidParameter { param: String },
    /// The handler was started.
    Spawned,
}

impl DispatchOutcome {
    /// True only if a handler was started.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Spawned)
    }
}

type Authorizer = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Bound commands, kept unique and sorted by name.
pub struct Registry {
    prefix: String,
    authorize: Authorizer,
    commands: RwLock<Vec<Arc<Command>>>,
    tasks: TaskTracker,
}

impl Registry {
    /// Create an empty registry.
    ///
    /// `authorize` receives the sender's hostmask and decides whether it may
    /// run restricted commands.
    pub fn new(
        prefix: impl Into<String>,
        authorize: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            authorize: Box::new(authorize),
            commands: RwLock::new(Vec::new()),
            tasks: TaskTracker::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Bind a command. Parameters are added through the returned builder;
    /// the command becomes visible when the builder is dropped.
    ///
    /// Binding a name that already exists replaces the old command.
    pub fn bind(&self, name: &str, restricted: bool, handler: impl Handler) -> CommandBuilder<'_> {
        CommandBuilder {
            registry: self,
            command: Some(Command::new(name, restricted, Arc::new(handler))),
        }
    }

    /// Remove a command. Returns false if it was not bound.
    pub fn unbind(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        let mut commands = self.commands.write();
        match commands.binary_search_by(|c| c.name.as_str().cmp(&name)) {
            Ok(index) => {
                commands.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    fn insert(&self, command: Command) {
        let mut commands = self.commands.write();
        match commands.binary_search_by(|c| c.name.cmp(&command.name)) {
            Ok(index) => {
                debug!(command = %command.name, "Replacing bound command");
                commands[index] = Arc::new(command);
            }
            Err(index) => commands.insert(index, Arc::new(command)),
        }
    }

    /// Look up a command, ignoring case.
    pub fn find(&self, name: &str) -> Option<Arc<Command>> {
        let name = name.to_lowercase();
        let commands = self.commands.read();
        commands
            .binary_search_by(|c| c.name.as_str().cmp(&name))
            .ok()
            .map(|index| Arc::clone(&commands[index]))
    }

    /// Snapshot of all commands, sorted by name.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.commands.read().clone()
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Match an event against the bound commands and start the handler.
    ///
    /// Returns once the handler task is spawned, not when it finishes.
    /// Rejections are answered with a notice to the sender.
    pub async fn dispatch(
        &self,
        writer: Arc<dyn ResponseWriter>,
        event: &InboundEvent,
    ) -> DispatchOutcome {
        let Some(rest) = event.payload.strip_prefix(self.prefix.as_str()) else {
            return DispatchOutcome::NotCommand;
        };
        let Some((name, args)) = split(rest) else {
            return DispatchOutcome::NotCommand;
        };
        let Some(command) = self.find(&name) else {
            return DispatchOutcome::UnknownCommand;
        };

        if command.restricted && !(self.authorize)(&event.sender_mask) {
            debug!(command = %command.name, sender = %event.sender_mask, "Access denied");
            self.reply(&*writer, event, &text::access_denied(&command.name))
                .await;
            return DispatchOutcome::AccessDenied;
        }

        if args.len() < command.required_params() {
            debug!(command = %command.name, given = args.len(), "Missing parameters");
            self.reply(&*writer, event, &text::missing_parameters(&command.name))
                .await;
            return DispatchOutcome::MissingParameters;
        }

        let mut params = Vec::with_capacity(args.len().min(command.params.len()));
        for (spec, arg) in command.params.iter().zip(&args) {
            if !spec.validate(arg) {
                debug!(command = %command.name, param = %spec.name, "Invalid parameter");
                self.reply(
                    &*writer,
                    event,
                    &text::invalid_parameter(&command.name, &spec.name),
                )
                .await;
                return DispatchOutcome::InvalidParameter {
                    param: spec.name.clone(),
                };
            }
            params.push(Param::new(arg.as_str()));
        }

        self.spawn(command, writer, event.clone(), ParamList::new(params));
        DispatchOutcome::Spawned
    }

    fn spawn(
        &self,
        command: Arc<Command>,
        writer: Arc<dyn ResponseWriter>,
        event: InboundEvent,
        params: ParamList,
    ) {
        let span = spans::command(&command.name, &event.sender_mask, &event.target);
        let handler = Arc::clone(&command.handler);
        let name = command.name.clone();

        self.tasks.spawn(
            async move {
                let trigger = event.clone();
                let invocation = Invocation {
                    writer,
                    event,
                    params,
                };
                if let Err(panic) = AssertUnwindSafe(handler.call(invocation))
                    .catch_unwind()
                    .await
                {
                    error!(
                        command = %name,
                        error = panic_message(&*panic),
                        event = ?trigger,
                        "Command error"
                    );
                }
            }
            .instrument(span),
        );
    }

    async fn reply(&self, writer: &dyn ResponseWriter, event: &InboundEvent, text: &str) {
        if let Err(e) = outbound::notice(writer, &event.sender_nick, text).await {
            warn!(error = %e, "Failed to send reply");
        }
    }

    /// Wait until every handler started so far has finished.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Handler listing all commands, or describing the one named by its
    /// first argument. Bind it with one optional parameter.
    pub fn help_handler(self: &Arc<Self>) -> impl Handler + use<> {
        let registry = Arc::downgrade(self);
        move |invocation: Invocation| {
            let registry = registry.clone();
            async move {
                if let Some(registry) = registry.upgrade() {
                    registry.help(invocation).await;
                }
            }
        }
    }

    async fn help(&self, invocation: Invocation) {
        let writer = &*invocation.writer;
        let event = &invocation.event;

        let Some(param) = invocation.params.get(0) else {
            for command in self.commands() {
                let marker = if command.restricted { "*" } else { "" };
                let line = format!(
                    "{}{}{}: {}",
                    self.prefix,
                    bold(&command.name),
                    marker,
                    command.description
                );
                if outbound::notice(writer, &event.sender_nick, &line).await.is_err() {
                    return;
                }
                tokio::time::sleep(HELP_LINE_DELAY).await;
            }
            return;
        };

        let Some(command) = self.find(param.as_str()) else {
            return;
        };

        let status = if command.restricted {
            format!(" {}", text::RESTRICTED)
        } else {
            String::new()
        };
        let header = format!(
            "{}{}:{} {}",
            self.prefix,
            bold(&command.name),
            status,
            command.description
        );
        if outbound::notice(writer, &event.sender_nick, &header).await.is_err() {
            return;
        }

        for spec in &command.params {
            tokio::time::sleep(HELP_LINE_DELAY).await;
            let optional = if spec.required {
                String::new()
            } else {
                format!(" {}", text::OPTIONAL)
            };
            let line = format!(" <{}>:{} {}", bold(&spec.name), optional, spec.description);
            if outbound::notice(writer, &event.sender_nick, &line).await.is_err() {
                return;
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

/// Adds description and parameters to a command being bound.
pub struct CommandBuilder<'a> {
    registry: &'a Registry,
    command: Option<Command>,
}

impl CommandBuilder<'_> {
    /// Description shown by the help handler.
    pub fn description(mut self, description: &str) -> Self {
        if let Some(command) = self.command.as_mut() {
            command.description = description.to_string();
        }
        self
    }

    /// Declare the next parameter. Arguments are matched to parameters by
    /// position.
    pub fn add_param(self, name: &str, required: bool, pattern: &Regex) -> Self {
        self.add_described_param(name, "", required, pattern)
    }

    /// Like [`add_param`](Self::add_param), with a help description.
    pub fn add_described_param(
        mut self,
        name: &str,
        description: &str,
        required: bool,
        pattern: &Regex,
    ) -> Self {
        if let Some(command) = self.command.as_mut() {
            command.params.push(ParamSpec {
                name: name.to_lowercase(),
                description: description.to_string(),
                required,
                pattern: pattern.clone(),
            });
        }
        self
    }
}

impl Drop for CommandBuilder<'_> {
    fn drop(&mut self) {
        if let Some(command) = self.command.take() {
            self.registry.insert(command);
        }
    }
}
