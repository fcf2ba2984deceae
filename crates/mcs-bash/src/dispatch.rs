//! Command lookup

use std::sync::Arc;

use mcs_core::traits::CommandFactory;
use mcs_core::{Endpoint, Environment, McsError};
use tokio_util::sync::CancellationToken;

/// Registered commands, consulted in registration order
#[derive(Default)]
pub struct CommandRegistry {
    factories: Vec<Arc<dyn CommandFactory>>,
}

impl CommandRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command factory
    pub fn register(&mut self, factory: Arc<dyn CommandFactory>) {
        self.factories.push(factory);
    }

    /// First factory that handles `name`
    pub fn find(&self, name: &str) -> Option<Arc<dyn CommandFactory>> {
        self.factories
            .iter()
            .find(|factory| factory.can_handle(name))
            .cloned()
    }

    /// Run the command named `name`
    pub async fn dispatch(
        &self,
        name: &str,
        terminal: Endpoint,
        env: &Environment,
        shutdown: CancellationToken,
    ) -> Result<(), McsError> {
        let factory = self
            .find(name)
            .ok_or_else(|| McsError::UnknownCommand(name.to_string()))?;

        tracing::debug!("Dispatching command '{}'", name);
        factory.execute(name, terminal, env, shutdown).await
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if no factories are registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
