//! Import resolution against the virtual file system and the shim registry.
//!
//! Resolution is total: every specifier maps to exactly one
//! [`ResolutionResult`]. Anything that is neither a shim nor a virtual file
//! resolves to the `empty` namespace, which loads as an inert stub.

use crate::shims::ShimRegistry;
use crate::vfs::VirtualFileSystem;
use serde::Serialize;
use std::fmt;

/// Suffixes tried, in order, after the bare candidate path.
const EXTENSION_SUFFIXES: &[&str] = &["", ".js", ".jsx", ".ts", ".tsx", ".json"];
const INDEX_SUFFIXES: &[&str] = &["/index.js", "/index.jsx", "/index.ts", "/index.tsx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Virtual,
    Shim,
    Empty,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Virtual => "virtual",
            Namespace::Shim => "shim",
            Namespace::Empty => "empty",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionResult {
    pub resolved_path: String,
    pub namespace: Namespace,
}

impl ResolutionResult {
    fn new(resolved_path: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            resolved_path: resolved_path.into(),
            namespace,
        }
    }
}

pub struct Resolver<'a> {
    vfs: &'a VirtualFileSystem,
    shims: &'a ShimRegistry,
    entry_point: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(vfs: &'a VirtualFileSystem, shims: &'a ShimRegistry, entry_point: &'a str) -> Self {
        Self {
            vfs,
            shims,
            entry_point,
        }
    }

    pub fn entry_point(&self) -> &str {
        self.entry_point
    }

    /// Resolves `specifier` as imported from `importer` (`None` for the entry point).
    pub fn resolve(&self, specifier: &str, importer: Option<&str>) -> ResolutionResult {
        if self.shims.matches(specifier) {
            return ResolutionResult::new(specifier, Namespace::Shim);
        }

        if is_relative(specifier) {
            if let Some(path) = self.resolve_relative(specifier, importer) {
                return ResolutionResult::new(path, Namespace::Virtual);
            }
        } else if self.is_entry_alias(specifier) {
            return ResolutionResult::new(self.entry_point, Namespace::Virtual);
        } else if specifier.starts_with('/') && self.vfs.contains(specifier) {
            return ResolutionResult::new(specifier, Namespace::Virtual);
        }

        ResolutionResult::new(specifier, Namespace::Empty)
    }

    fn resolve_relative(&self, specifier: &str, importer: Option<&str>) -> Option<String> {
        let dir = importer.map(parent_dir).unwrap_or("/");
        let candidate = join_path(dir, specifier);

        EXTENSION_SUFFIXES
            .iter()
            .chain(INDEX_SUFFIXES)
            .map(|suffix| {
                if candidate == "/" && suffix.starts_with('/') {
                    suffix.to_string()
                } else {
                    format!("{candidate}{suffix}")
                }
            })
            .find(|path| self.vfs.contains(path))
    }

    fn is_entry_alias(&self, specifier: &str) -> bool {
        let bare_entry = self.entry_point.trim_start_matches('/');
        !bare_entry.is_empty() && (specifier == self.entry_point || specifier == bare_entry)
    }
}

pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Directory part of an absolute path; `/` for top-level files.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Applies `.` and `..` components of `relative` onto `dir`. `..` never climbs above `/`.
pub fn join_path(dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shims::{ShimModule, DEFAULT_SHIMS};
    use rstest::rstest;

    fn vfs(paths: &[&str]) -> VirtualFileSystem {
        VirtualFileSystem::from_files(paths.iter().map(|p| (*p, "")))
    }

    #[rstest]
    #[case("/", "./a", "/a")]
    #[case("/src", "./a/b", "/src/a/b")]
    #[case("/src/components", "../utils/x", "/src/utils/x")]
    #[case("/src", "../../../x", "/x")]
    #[case("/src", "./a/./b/../c", "/src/a/c")]
    #[case("/src", "./dir/", "/src/dir")]
    #[case("/src", "..", "/")]
    fn test_join_path(#[case] dir: &str, #[case] relative: &str, #[case] expected: &str) {
        assert_eq!(join_path(dir, relative), expected);
    }

    #[rstest]
    #[case("/App.js", "/")]
    #[case("/src/App.js", "/src")]
    #[case("/a/b/c.ts", "/a/b")]
    fn test_parent_dir(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(parent_dir(path), expected);
    }

    #[rstest]
    #[case(&["/Foo"], "/Foo")]
    #[case(&["/Foo.js", "/Foo.jsx"], "/Foo.js")]
    #[case(&["/Foo.jsx", "/Foo.ts"], "/Foo.jsx")]
    #[case(&["/Foo.ts", "/Foo.tsx"], "/Foo.ts")]
    #[case(&["/Foo.tsx", "/Foo.json"], "/Foo.tsx")]
    #[case(&["/Foo.json", "/Foo/index.js"], "/Foo.json")]
    #[case(&["/Foo/index.js", "/Foo/index.jsx"], "/Foo/index.js")]
    #[case(&["/Foo/index.jsx", "/Foo/index.ts"], "/Foo/index.jsx")]
    #[case(&["/Foo/index.ts", "/Foo/index.tsx"], "/Foo/index.ts")]
    #[case(&["/Foo/index.tsx"], "/Foo/index.tsx")]
    fn test_extension_lookup_order(#[case] files: &[&str], #[case] expected: &str) {
        let vfs = vfs(files);
        let resolver = Resolver::new(&vfs, &DEFAULT_SHIMS, "/App.js");
        assert_eq!(
            resolver.resolve("./Foo", Some("/App.js")),
            ResolutionResult::new(expected, Namespace::Virtual)
        );
    }

    #[test]
    fn test_relative_from_nested_importer() {
        let vfs = vfs(&["/src/App.js", "/src/lib/math.ts", "/shared/theme.json"]);
        let resolver = Resolver::new(&vfs, &DEFAULT_SHIMS, "/src/App.js");

        assert_eq!(
            resolver.resolve("./lib/math", Some("/src/App.js")).resolved_path,
            "/src/lib/math.ts"
        );
        assert_eq!(
            resolver.resolve("../../shared/theme", Some("/src/lib/math.ts")).resolved_path,
            "/shared/theme.json"
        );
    }

    #[test]
    fn test_shim_precedence_over_virtual_file() {
        let vfs = vfs(&["/react", "/react.js", "/App.js"]);
        let resolver = Resolver::new(&vfs, &DEFAULT_SHIMS, "/App.js");

        assert_eq!(
            resolver.resolve("react", Some("/App.js")),
            ResolutionResult::new("react", Namespace::Shim)
        );
        assert_eq!(
            resolver.resolve("react-dom/client", Some("/App.js")),
            ResolutionResult::new("react-dom/client", Namespace::Shim)
        );
    }

    #[test]
    fn test_custom_shim_registry() {
        let shims = ShimRegistry::empty().with_overrides([ShimModule::new("lodash", "", &[])]);
        let vfs = vfs(&["/App.js"]);
        let resolver = Resolver::new(&vfs, &shims, "/App.js");

        assert_eq!(resolver.resolve("lodash/debounce", None).namespace, Namespace::Shim);
        assert_eq!(resolver.resolve("react", None).namespace, Namespace::Empty);
    }

    #[rstest]
    #[case("/App.js")]
    #[case("App.js")]
    fn test_entry_alias(#[case] specifier: &str) {
        let vfs = vfs(&["/App.js"]);
        let resolver = Resolver::new(&vfs, &DEFAULT_SHIMS, "/App.js");
        assert_eq!(
            resolver.resolve(specifier, None),
            ResolutionResult::new("/App.js", Namespace::Virtual)
        );
    }

    #[test]
    fn test_absolute_path_in_vfs() {
        let vfs = vfs(&["/App.js", "/lib/util.js"]);
        let resolver = Resolver::new(&vfs, &DEFAULT_SHIMS, "/App.js");

        assert_eq!(
            resolver.resolve("/lib/util.js", Some("/App.js")),
            ResolutionResult::new("/lib/util.js", Namespace::Virtual)
        );
        assert_eq!(
            resolver.resolve("/lib/util", Some("/App.js")),
            ResolutionResult::new("/lib/util", Namespace::Empty)
        );
    }

    #[rstest]
    #[case("./does-not-exist")]
    #[case("../../nope")]
    #[case("lodash")]
    #[case("@scope/unknown/deep")]
    #[case("")]
    #[case("https://cdn.example.com/x.js")]
    #[case("App")]
    fn test_fallback_is_empty(#[case] specifier: &str) {
        let vfs = vfs(&["/App.js"]);
        let resolver = Resolver::new(&vfs, &DEFAULT_SHIMS, "/App.js");
        assert_eq!(
            resolver.resolve(specifier, Some("/App.js")),
            ResolutionResult::new(specifier, Namespace::Empty)
        );
    }

    #[test]
    fn test_relative_without_importer_uses_root() {
        let vfs = vfs(&["/App.js", "/index.js"]);
        let resolver = Resolver::new(&vfs, &DEFAULT_SHIMS, "/App.js");

        assert_eq!(resolver.resolve("./App", None).resolved_path, "/App.js");
        assert_eq!(resolver.resolve("./", None).resolved_path, "/index.js");
    }
}
