//! Command service abstraction
//!
//! Provides a common interface for requesting command suggestions from the
//! external crawler backend.

mod error;
mod http;
mod types;

pub use error::{ServiceError, ServiceErrorKind};
pub use http::{HttpCommandService, ServiceConfig};
pub use types::{ServiceCall, Suggestion};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for command suggestion providers
///
/// Each operation resolves to a structured suggestion or `None` when the
/// service has nothing usable to offer.
#[async_trait]
pub trait CommandService: Send + Sync {
    /// Ask for the next command given the session context so far
    async fn confirm(&self) -> Result<Option<Suggestion>, ServiceError>;

    /// Declare a new objective and ask for the first command toward it
    async fn objective(&self, objective: &str) -> Result<Option<Suggestion>, ServiceError>;

    /// Ask for a command suggestion for a one-off objective
    async fn suggest(&self, objective: &str) -> Result<Option<Suggestion>, ServiceError>;
}

/// Logging wrapper for command services
pub struct LoggingService {
    inner: Arc<dyn CommandService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn CommandService>) -> Self {
        Self { inner }
    }

    fn record(
        command: &str,
        duration: std::time::Duration,
        result: &Result<Option<Suggestion>, ServiceError>,
    ) {
        match result {
            Ok(Some(_)) => {
                tracing::info!(
                    command = %command,
                    duration_ms = %duration.as_millis(),
                    "Command service call completed"
                );
            }
            Ok(None) => {
                tracing::info!(
                    command = %command,
                    duration_ms = %duration.as_millis(),
                    "Command service call returned no suggestion"
                );
            }
            Err(e) => {
                tracing::error!(
                    command = %command,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "Command service call failed"
                );
            }
        }
    }
}

#[async_trait]
impl CommandService for LoggingService {
    async fn confirm(&self) -> Result<Option<Suggestion>, ServiceError> {
        let start = std::time::Instant::now();
        let result = self.inner.confirm().await;
        Self::record("confirm", start.elapsed(), &result);
        result
    }

    async fn objective(&self, objective: &str) -> Result<Option<Suggestion>, ServiceError> {
        let start = std::time::Instant::now();
        let result = self.inner.objective(objective).await;
        Self::record("objective", start.elapsed(), &result);
        result
    }

    async fn suggest(&self, objective: &str) -> Result<Option<Suggestion>, ServiceError> {
        let start = std::time::Instant::now();
        let result = self.inner.suggest(objective).await;
        Self::record("suggest", start.elapsed(), &result);
        result
    }
}
