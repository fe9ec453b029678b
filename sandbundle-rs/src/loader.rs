//! Source loading for resolved modules.

use crate::resolver::Namespace;
use crate::shims::ShimRegistry;
use crate::vfs::{FileKind, VirtualFileSystem};
use anyhow::anyhow;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

/// Syntax a loaded module is transpiled as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Js,
    Jsx,
    Ts,
    Tsx,
    Json,
    Css,
}

impl From<FileKind> for Dialect {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::Js => Dialect::Js,
            FileKind::Jsx => Dialect::Jsx,
            FileKind::Ts => Dialect::Ts,
            FileKind::Tsx => Dialect::Tsx,
            FileKind::Json => Dialect::Json,
            FileKind::Css => Dialect::Css,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub contents: String,
    pub dialect: Dialect,
}

pub struct Loader<'a> {
    vfs: &'a VirtualFileSystem,
    shims: &'a ShimRegistry,
}

impl<'a> Loader<'a> {
    pub fn new(vfs: &'a VirtualFileSystem, shims: &'a ShimRegistry) -> Self {
        Self { vfs, shims }
    }

    /// Loads the module behind a resolution result.
    ///
    /// Only a virtual path missing from the file system fails; resolution
    /// never produces one except for a missing entry point.
    pub fn load(&self, path: &str, namespace: Namespace) -> anyhow::Result<LoadedModule> {
        match namespace {
            Namespace::Shim => {
                let source = self
                    .shims
                    .get(path)
                    .ok_or_else(|| anyhow!("No shim registered for \"{}\"", path))?;
                Ok(LoadedModule {
                    contents: source.to_string(),
                    dialect: Dialect::Js,
                })
            }
            Namespace::Empty => Ok(LoadedModule {
                contents: empty_stub(std::iter::empty::<&str>()),
                dialect: Dialect::Js,
            }),
            Namespace::Virtual => {
                let file = self.vfs.lookup(path).ok_or_else(|| {
                    anyhow!("Could not load \"{}\": no such file in the build", path)
                })?;
                Ok(LoadedModule {
                    contents: file.content.clone(),
                    dialect: file.kind.into(),
                })
            }
        }
    }
}

/// Single-line module exporting an inert placeholder.
///
/// The placeholder is a function returning `null`, so it also renders as an
/// empty component. Each requested name is exported as the same placeholder.
pub fn empty_stub<'n>(names: impl IntoIterator<Item = &'n str>) -> String {
    let mut stub = String::from("const __inert = function () { return null; }; export default __inert;");
    let named: Vec<String> = names
        .into_iter()
        .filter(|name| *name != "default" && IDENTIFIER_RE.is_match(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|name| format!("__inert as {name}"))
        .collect();
    if !named.is_empty() {
        stub.push_str(&format!(" export {{ {} }};", named.join(", ")));
    }
    stub
}
