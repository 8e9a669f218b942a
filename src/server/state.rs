//! Server application state

use std::sync::Arc;

use crate::config::Config;
use crate::error::QaError;
use crate::llm::{HttpTransport, RetryPolicy, RetryingTransport, Transport};

/// Shared application state for all route handlers
pub struct AppState {
    /// Process-wide defaults, read-only after startup
    pub config: Config,
    /// Shared HTTP transport (connection pool + retry policy)
    pub transport: Arc<dyn Transport>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, QaError> {
        let http = HttpTransport::new(config.timeout())?;
        let transport = RetryingTransport::new(http, RetryPolicy::from_config(&config));
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Config for one request, with optional per-request overrides.
    pub fn session_config(&self, api_key: Option<&str>, model: Option<&str>) -> Config {
        self.config.with_api_key(api_key).with_model(model)
    }
}
