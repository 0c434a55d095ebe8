//! Batch import configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Stop the batch at the first unreadable row instead of skipping it.
    #[serde(default)]
    pub stop_on_error: bool,
}
