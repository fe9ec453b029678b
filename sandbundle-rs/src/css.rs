//! Stylesheet aggregation.
//!
//! All `css` files of a build are concatenated in insertion order. Directives
//! that need a build-time preprocessor (Tailwind-style at-rules) or a network
//! fetch (`@import url(...)`) are removed; everything else is copied verbatim.

use crate::vfs::{FileKind, VirtualFileSystem};
use regex::Regex;

lazy_static! {
    /// A utility-framework directive on its own line, including the line break.
    static ref DIRECTIVE_LINE_RE: Regex = Regex::new(
        r"(?m)^[ \t]*@(?:tailwind|apply|config|plugin)\b[^;{}\n]*;[ \t]*(?:\r?\n|$)"
    )
    .unwrap();

    /// A utility-framework directive sharing a line with other declarations.
    static ref DIRECTIVE_INLINE_RE: Regex =
        Regex::new(r"@(?:tailwind|apply|config|plugin)\b[^;{}]*;[ \t]*").unwrap();

    /// `@import url(...)`, remote string imports and `@import "tailwindcss..."`.
    static ref IMPORT_LINE_RE: Regex = Regex::new(
        r#"(?m)^[ \t]*@import\s+(?:url\([^)]*\)|"(?:https?:)?//[^"]*"|'(?:https?:)?//[^']*'|"tailwindcss[^"]*"|'tailwindcss[^']*')[^;\n]*;[ \t]*(?:\r?\n|$)"#
    )
    .unwrap();

    static ref IMPORT_INLINE_RE: Regex =
        Regex::new(r"@import\s+url\([^)]*\)[^;]*;[ \t]*").unwrap();
}

/// Removes directives that have no meaning inside the sandbox.
pub fn strip_directives(css: &str) -> String {
    let css = IMPORT_LINE_RE.replace_all(css, "");
    let css = IMPORT_INLINE_RE.replace_all(&css, "");
    let css = DIRECTIVE_LINE_RE.replace_all(&css, "");
    DIRECTIVE_INLINE_RE.replace_all(&css, "").into_owned()
}

/// Concatenates every stylesheet of the build, one `/* <path> */` header per file.
pub fn aggregate_css(vfs: &VirtualFileSystem) -> String {
    let mut bundle = String::new();

    for file in vfs.files_of_kind(FileKind::Css) {
        log::debug!("Aggregating stylesheet {}", file.path);
        if !bundle.is_empty() {
            bundle.push('\n');
        }
        bundle.push_str(&format!("/* {} */\n", file.path));
        bundle.push_str(&strip_directives(&file.content));
        if !bundle.ends_with('\n') {
            bundle.push('\n');
        }
    }

    bundle
}
