//! Runtime configuration.
//!
//! Settings that the explorer front end used to read from a global store
//! (backend URL, selected currency) are loaded here once and handed to the
//! controllers explicitly.

mod loader;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use loader::{get_default_config, load_configuration, write_config_to};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Base URL of the explorer backend API.
    pub api_url: String,
    /// Currency selected in the explorer.
    pub currency: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl ExplorerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api/".to_string(),
            currency: "NEO".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}
