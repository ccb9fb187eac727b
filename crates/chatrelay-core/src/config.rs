use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::lifecycle::Platform;
use crate::relative_time::RelativeTimeLocale;

/// Relay configuration, read from `config.toml`.
///
/// Every field has a default so an empty or partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Number of most recent messages restored when a conversation opens.
    /// Small enough that a lazily rendered list can still scroll to the bottom
    /// on first paint.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,

    #[serde(default)]
    pub locale: RelativeTimeLocale,

    #[serde(default)]
    pub platform: Platform,

    /// Location of the file-backed store; resolved by the infrastructure
    /// layer when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Buffer size of the relay change-event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_history_page_size() -> usize {
    13
}

fn default_event_capacity() -> usize {
    256
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            history_page_size: default_history_page_size(),
            locale: RelativeTimeLocale::default(),
            platform: Platform::default(),
            store_path: None,
            event_capacity: default_event_capacity(),
        }
    }
}

impl RelayConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
