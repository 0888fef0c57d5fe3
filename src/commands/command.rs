//! Command schema and handler contract.

use super::param::ParamList;
use crate::outbound::ResponseWriter;
use async_trait::async_trait;
use autimaat_proto::InboundEvent;
use regex::Regex;
use std::future::Future;
use std::sync::Arc;

/// Everything a handler gets for one invocation.
pub struct Invocation {
    /// Where replies go.
    pub writer: Arc<dyn ResponseWriter>,
    /// The message that triggered the command.
    pub event: InboundEvent,
    /// Validated arguments.
    pub params: ParamList,
}

/// A command handler. Runs on its own task for every invocation.
///
/// Implemented for any `Fn(Invocation) -> impl Future<Output = ()>`.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, invocation: Invocation);
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn call(&self, invocation: Invocation) {
        (self)(invocation).await
    }
}

/// Declared parameter of a command.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub pattern: Regex,
}

impl ParamSpec {
    pub fn validate(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

/// A bound command.
pub struct Command {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) restricted: bool,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) handler: Arc<dyn Handler>,
}

impl Command {
    pub(crate) fn new(name: &str, restricted: bool, handler: Arc<dyn Handler>) -> Self {
        Self {
            name: name.to_lowercase(),
            description: String::new(),
            restricted,
            params: Vec::new(),
            handler,
        }
    }

    /// Lower-cased command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// True if only authorized hostmasks may run this command.
    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Number of parameters the caller must supply.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| p.required).count()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("restricted", &self.restricted)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
