//! Request and result types, serialized the way the HTTP boundary exchanges them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    /// Path -> source text. Order is kept for stylesheet aggregation.
    #[serde(default)]
    pub files: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

impl BuildRequest {
    pub fn new<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(path, content)| (path.into(), content.into()))
                .collect(),
            entry_point: None,
        }
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub js: String,
    pub css: String,
}

/// A successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub bundle: Bundle,
    pub warnings: Vec<String>,
    pub required_globals: Vec<String>,
}

/// Wire form of a build outcome. `bundle` is present exactly when `success` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub success: bool,
    pub bundle: Option<Bundle>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_globals: Vec<String>,
}

impl From<Result<BuildOutput, BuildError>> for BuildResult {
    fn from(result: Result<BuildOutput, BuildError>) -> Self {
        match result {
            Ok(output) => BuildResult {
                success: true,
                bundle: Some(output.bundle),
                error: None,
                warnings: output.warnings,
                required_globals: output.required_globals,
            },
            Err(err) => BuildResult {
                success: false,
                bundle: None,
                error: Some(err.to_string()),
                warnings: vec![],
                required_globals: vec![],
            },
        }
    }
}
