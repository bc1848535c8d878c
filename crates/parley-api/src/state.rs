use parley_llm::CompletionClient;
use std::sync::Arc;

use crate::config::Config;
use crate::proxy::{ChatProxy, ProxySettings};

/// Shared application state passed to all handlers
///
/// Immutable after startup; requests never share mutable data.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub proxy: Arc<ChatProxy>,
}

impl AppState {
    pub fn new(config: Config, client: Arc<dyn CompletionClient>) -> Self {
        let proxy = ChatProxy::new(client, ProxySettings::from_config(&config));
        Self {
            config: Arc::new(config),
            proxy: Arc::new(proxy),
        }
    }
}
