//! Registry of synthetic adapter modules that stand in for external packages.

mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

lazy_static! {
    /// Built-in shims, constructed once per process.
    pub static ref DEFAULT_SHIMS: ShimRegistry = ShimRegistry::builtin();
}

/// Adapter source for one package specifier, plus the host globals it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimModule {
    pub specifier: String,
    pub source: String,
    pub globals: Vec<String>,
}

impl ShimModule {
    pub fn new(specifier: &str, source: impl Into<String>, globals: &[&str]) -> Self {
        Self {
            specifier: specifier.to_string(),
            source: source.into(),
            globals: globals.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// Configuration form of a shim, as read from a shim file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimDefinition {
    pub source: String,
    #[serde(default)]
    pub globals: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShimRegistry {
    shims: HashMap<String, ShimModule>,
}

impl ShimRegistry {
    /// A registry without any shims.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::empty().with_overrides(builtin::builtin_shims())
    }

    /// Adds shims, replacing existing entries with the same specifier.
    pub fn with_overrides(mut self, shims: impl IntoIterator<Item = ShimModule>) -> Self {
        for shim in shims {
            self.shims.insert(shim.specifier.clone(), shim);
        }
        self
    }

    pub fn with_definitions(
        self,
        definitions: impl IntoIterator<Item = (String, ShimDefinition)>,
    ) -> Self {
        self.with_overrides(definitions.into_iter().map(|(specifier, def)| ShimModule {
            specifier,
            source: def.source,
            globals: def.globals,
        }))
    }

    /// Exact match first, then the longest registered subpath prefix.
    ///
    /// `react-dom/client/extra` finds `react-dom/client` before `react-dom`.
    pub fn lookup(&self, specifier: &str) -> Option<&ShimModule> {
        let mut candidate = specifier;
        loop {
            if let Some(shim) = self.shims.get(candidate) {
                return Some(shim);
            }
            candidate = &candidate[..candidate.rfind('/')?];
        }
    }

    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.lookup(specifier).map(|shim| shim.source.as_str())
    }

    /// True when `specifier` equals a registered specifier or is a subpath of one.
    pub fn matches(&self, specifier: &str) -> bool {
        self.lookup(specifier).is_some()
    }

    pub fn specifiers(&self) -> impl Iterator<Item = &str> {
        self.shims.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.shims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shims.is_empty()
    }
}
