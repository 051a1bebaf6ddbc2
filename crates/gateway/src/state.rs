//! Shared application state.
//!
//! Immutable after startup: the gateway keeps no per-session data.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::fm_client::FmClient;

#[derive(Clone)]
pub struct AppState {
    /// Data API client (pooled connections, no session state)
    pub fm: Arc<FmClient>,

    /// Gateway configuration
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let fm = FmClient::new(&config.backend)?;
        Ok(Self {
            fm: Arc::new(fm),
            config: Arc::new(config),
        })
    }
}
