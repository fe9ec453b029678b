//! In-memory virtual file system for a single build.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Syntax kind of a virtual file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Js,
    Jsx,
    Ts,
    Tsx,
    Json,
    Css,
}

impl FileKind {
    /// `.js` and unknown extensions are treated as JSX, which is a superset of JS.
    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "ts" | "mts" | "cts" => FileKind::Ts,
            "tsx" => FileKind::Tsx,
            "json" => FileKind::Json,
            "css" => FileKind::Css,
            "mjs" | "cjs" => FileKind::Js,
            _ => FileKind::Jsx,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    pub path: String,
    pub content: String,
    pub kind: FileKind,
}

/// Path -> file map. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct VirtualFileSystem {
    files: IndexMap<String, VirtualFile>,
}

impl VirtualFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut vfs = Self::new();
        for (path, content) in files {
            vfs.insert(path.as_ref(), content);
        }
        vfs
    }

    /// Adds a file, replacing the content of an existing file with the same path.
    pub fn insert(&mut self, path: &str, content: impl Into<String>) {
        let path = normalize_path(path);
        let kind = FileKind::from_path(&path);
        self.files.insert(
            path.clone(),
            VirtualFile {
                path,
                content: content.into(),
                kind,
            },
        );
    }

    pub fn lookup(&self, path: &str) -> Option<&VirtualFile> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &VirtualFile> {
        self.files.values()
    }

    pub fn files_of_kind(&self, kind: FileKind) -> impl Iterator<Item = &VirtualFile> {
        self.files.values().filter(move |file| file.kind == kind)
    }
}

/// Makes a path absolute by prefixing `/` when it is missing.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
