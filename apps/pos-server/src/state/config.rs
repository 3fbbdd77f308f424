//! # Configuration State
//!
//! The loaded [`ServerConfig`], read-only after startup.

use std::ops::Deref;
use std::sync::Arc;

use crate::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct ConfigState(Arc<ServerConfig>);

impl ConfigState {
    pub fn new(config: ServerConfig) -> Self {
        ConfigState(Arc::new(config))
    }
}

impl Deref for ConfigState {
    type Target = ServerConfig;

    fn deref(&self) -> &ServerConfig {
        &self.0
    }
}
