use serde::{Deserialize, Serialize};

use crate::output::DEFAULT_GLOBAL_NAME;

pub const DEFAULT_ENTRY_POINT: &str = "/App.js";

/// Per-build settings that are not part of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundlerConfig {
    /// Entry point used when a request does not name one.
    pub default_entry_point: String,
    /// Global the bundle attaches its exported value to.
    pub global_name: String,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            default_entry_point: DEFAULT_ENTRY_POINT.to_string(),
            global_name: DEFAULT_GLOBAL_NAME.to_string(),
        }
    }
}
