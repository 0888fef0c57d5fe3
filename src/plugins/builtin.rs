//! Built-in commands: `help`, `version` and the restricted `reload`.

use super::{Plugin, PluginContext};
use crate::commands::{Invocation, patterns};
use crate::handoff::ControlEvent;
use crate::outbound;
use chrono::{DateTime, Utc};
use tracing::warn;

const COMMANDS: [&str; 3] = ["help", "version", "reload"];

/// Commands every bot has.
pub struct Builtin {
    started: DateTime<Utc>,
}

impl Builtin {
    pub fn new() -> Self {
        Self {
            started: Utc::now(),
        }
    }
}

impl Default for Builtin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for Builtin {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn load(&self, ctx: &PluginContext) -> anyhow::Result<()> {
        let registry = &ctx.registry;

        registry
            .bind("help", false, registry.help_handler())
            .description("List all commands, or describe one.")
            .add_described_param("command", "Command to describe.", false, &patterns::ANY);

        let started = self.started;
        registry
            .bind("version", false, move |inv: Invocation| async move {
                let text = version_text(started, Utc::now());
                if let Err(e) = outbound::privmsg(&*inv.writer, &inv.event.target, &text).await {
                    warn!(error = %e, "Failed to send version");
                }
            })
            .description("Show the bot version and uptime.");

        let control = ctx.control.clone();
        registry
            .bind("reload", true, move |inv: Invocation| {
                let control = control.clone();
                async move {
                    let _ = outbound::notice(&*inv.writer, &inv.event.sender_nick, "Reloading.").await;
                    if control.send(ControlEvent::Reload).await.is_err() {
                        warn!("Control loop is gone, cannot reload");
                    }
                }
            })
            .description("Hand the connection to a freshly started copy of the bot.");

        Ok(())
    }

    fn unload(&self, ctx: &PluginContext) -> anyhow::Result<()> {
        for name in COMMANDS {
            ctx.registry.unbind(name);
        }
        Ok(())
    }
}

fn version_text(started: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let uptime = now.signed_duration_since(started);
    format!(
        "{} {}, up {}d {}h {}m (since {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        uptime.num_days(),
        uptime.num_hours() % 24,
        uptime.num_minutes() % 60,
        started.format("%Y-%m-%d %H:%M UTC"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Registry;
    use crate::config::Profile;
    use crate::outbound::testing::RecordingWriter;
    use autimaat_proto::decode;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn setup() -> (PluginContext, mpsc::Receiver<ControlEvent>) {
        let (control, rx) = mpsc::channel(4);
        let ctx = PluginContext {
            profile: Profile::new_default("/nonexistent"),
            registry: Arc::new(Registry::new("!", |mask| mask == "~admin@host")),
            control,
        };
        (ctx, rx)
    }

    #[test]
    fn load_and_unload_bind_commands() {
        let (ctx, _rx) = setup();
        let plugin = Builtin::new();
        plugin.load(&ctx).unwrap();

        assert_eq!(ctx.registry.len(), 3);
        assert!(ctx.registry.find("reload").unwrap().is_restricted());
        assert!(!ctx.registry.find("help").unwrap().is_restricted());

        plugin.unload(&ctx).unwrap();
        assert!(ctx.registry.is_empty());
    }

    #[tokio::test]
    async fn reload_sends_control_event() {
        let (ctx, mut rx) = setup();
        Builtin::new().load(&ctx).unwrap();

        let writer = Arc::new(RecordingWriter::default());
        let event = decode(":boss!~admin@host PRIVMSG #chan :!reload").unwrap();
        assert!(ctx.registry.dispatch(writer.clone(), &event).await.is_handled());
        ctx.registry.wait_idle().await;

        assert_eq!(rx.try_recv().ok(), Some(ControlEvent::Reload));
        assert_eq!(writer.lines(), vec!["NOTICE boss :Reloading."]);
    }

    #[tokio::test]
    async fn reload_denied_for_strangers() {
        let (ctx, mut rx) = setup();
        Builtin::new().load(&ctx).unwrap();

        let writer = Arc::new(RecordingWriter::default());
        let event = decode(":eve!~eve@elsewhere PRIVMSG #chan :!reload").unwrap();
        assert!(!ctx.registry.dispatch(writer.clone(), &event).await.is_handled());
        ctx.registry.wait_idle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn version_replies_to_target() {
        let (ctx, _rx) = setup();
        Builtin::new().load(&ctx).unwrap();

        let writer = Arc::new(RecordingWriter::default());
        let event = decode(":x!~x@h PRIVMSG #chan :!version").unwrap();
        ctx.registry.dispatch(writer.clone(), &event).await;
        ctx.registry.wait_idle().await;

        let lines = writer.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("PRIVMSG #chan :autimaat "));
    }

    #[test]
    fn uptime_format() {
        let started = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 5, 7, 0).unwrap();
        assert_eq!(
            version_text(started, now),
            format!(
                "autimaat {}, up 2d 5h 7m (since 2024-01-01 00:00 UTC)",
                env!("CARGO_PKG_VERSION")
            )
        );
    }
}
