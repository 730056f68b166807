use serde::{Deserialize, Serialize};

/// Runtime options for [`super::ResultAggregator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Issue thumbnail downloads for published files.
    pub request_thumbnails: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            request_thumbnails: true,
        }
    }
}
