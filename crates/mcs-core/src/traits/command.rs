//! Command traits

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::endpoint::Endpoint;
use crate::error::McsError;
use crate::types::Environment;

/// A factory for a named shell command
#[async_trait]
pub trait CommandFactory: Send + Sync {
    /// Whether this factory handles the command token `name`
    fn can_handle(&self, name: &str) -> bool;

    /// Run the command against the user's terminal.
    ///
    /// Returns once the command has finished or `shutdown` has been
    /// cancelled and the command has wound down.
    async fn execute(
        &self,
        name: &str,
        terminal: Endpoint,
        env: &Environment,
        shutdown: CancellationToken,
    ) -> Result<(), McsError>;
}
