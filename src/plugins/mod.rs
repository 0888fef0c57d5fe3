//! Plugin host.
//!
//! Plugins bind their commands into the shared [`Registry`] on load and get
//! a copy of every inbound event, whether or not a command handled it.

mod builtin;

pub use builtin::Builtin;

use crate::commands::Registry;
use crate::config::Profile;
use crate::handoff::ControlEvent;
use crate::outbound::ResponseWriter;
use async_trait::async_trait;
use autimaat_proto::InboundEvent;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{error, info};

/// What a plugin gets on load and unload.
#[derive(Clone)]
pub struct PluginContext {
    pub profile: Profile,
    pub registry: Arc<Registry>,
    pub control: mpsc::Sender<ControlEvent>,
}

/// A bot plugin.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Acquire resources and bind commands.
    fn load(&self, ctx: &PluginContext) -> anyhow::Result<()>;

    /// Unbind commands and persist state.
    fn unload(&self, ctx: &PluginContext) -> anyhow::Result<()>;

    /// Observe an inbound event. Runs on its own task.
    async fn dispatch(&self, _writer: Arc<dyn ResponseWriter>, _event: InboundEvent) {}
}

/// Owns the plugin set. Errors from one plugin never stop the others.
#[derive(Default)]
pub struct PluginHost {
    plugins: Vec<Arc<dyn Plugin>>,
    tasks: TaskTracker,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: impl Plugin + 'static) {
        self.plugins.push(Arc::new(plugin));
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn load_all(&self, ctx: &PluginContext) {
        for plugin in &self.plugins {
            info!(plugin = plugin.name(), "Loading plugin");
            if let Err(e) = plugin.load(ctx) {
                error!(plugin = plugin.name(), error = %e, "Plugin failed to load");
            }
        }
    }

    pub fn unload_all(&self, ctx: &PluginContext) {
        for plugin in &self.plugins {
            info!(plugin = plugin.name(), "Unloading plugin");
            if let Err(e) = plugin.unload(ctx) {
                error!(plugin = plugin.name(), error = %e, "Plugin failed to unload");
            }
        }
    }

    /// Hand the event to every plugin, each on its own task.
    pub fn dispatch(&self, writer: &Arc<dyn ResponseWriter>, event: &InboundEvent) {
        for plugin in &self.plugins {
            let plugin = Arc::clone(plugin);
            let writer = Arc::clone(writer);
            let event = event.clone();
            self.tasks.spawn(async move {
                let name = plugin.name();
                let run = AssertUnwindSafe(plugin.dispatch(writer, event)).catch_unwind();
                if run.await.is_err() {
                    error!(plugin = name, "Plugin panicked while handling an event");
                }
            });
        }
    }

    /// Wait for all in-flight plugin dispatches.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}
