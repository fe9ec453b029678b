use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use sandbundle_rs::{
    build, build_with_config, initialize_engine, shared_engine, BuildRequest, BundlerConfig,
    EngineStatus,
};

static INIT: Once = Once::new();

pub fn initialize() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn collect_files(dir: &Path, root: &Path, files: &mut Vec<(String, String)>) {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap_or_else(|_| panic!("Failed to read {:?}", dir))
        .map(|entry| entry.unwrap().path())
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_files(&path, root, files);
        } else {
            let relative = path.strip_prefix(root).unwrap();
            let virtual_path = format!("/{}", relative.to_str().unwrap().replace('\\', "/"));
            let content = fs::read_to_string(&path)
                .unwrap_or_else(|_| panic!("Failed to read {:?}", path));
            files.push((virtual_path, content));
        }
    }
}

/// Reads `tests/projects/<name>` into a request, one virtual file per file on disk.
fn load_project(name: &str) -> BuildRequest {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("projects")
        .join(name);
    let mut files = Vec::new();
    collect_files(&root, &root, &mut files);
    BuildRequest::new(files)
}

#[rustfmt::skip]
mod test_projects {
    use crate::*;

    #[rstest]
    fn test(
        #[values(
            ("react_counter", "/App.js"),
            ("cross_file", "/App.js"),
            ("missing_imports", "/App.js"),
            ("i18n_app", "/App.tsx")
        )]
        project: (&str, &str),
    ) {
        initialize();
        let (name, entry_point) = project;

        let request = load_project(name).with_entry_point(entry_point);
        let result = futures::executor::block_on(build(request));

        assert!(result.success, "{} failed: {:?}", name, result.error);
        assert!(result.error.is_none());
        let bundle = result.bundle.unwrap();
        assert!(bundle.js.contains("__SANDBOX_APP__"));
        assert!(!bundle.js.contains("import "));
    }

    #[test]
    fn test_marker() {} // Help IDE detect test module
}

#[tokio::test]
async fn test_react_import_is_replaced_by_shim() {
    initialize();
    let request = BuildRequest::new([(
        "/App.js",
        "import React from 'react';\nexport default () => <div>Hello</div>;",
    )]);

    let result = build(request).await;
    assert!(result.success, "{:?}", result.error);

    let js = result.bundle.unwrap().js;
    assert!(js.contains("globalThis.React"));
    assert!(js.contains("createElement"));
    assert!(!js.contains("from \"react\""));
    assert!(!js.contains("from 'react'"));
    assert_eq!(result.required_globals, vec!["React"]);
}

#[tokio::test]
async fn test_unused_react_hook_import_requires_react() {
    initialize();
    let request = BuildRequest::new([(
        "/App.js",
        "import {useState} from 'react'; export default function App(){ return null; }",
    )]);

    let result = build(request).await;
    assert!(result.success, "{:?}", result.error);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let js = result.bundle.unwrap().js;
    assert!(js.contains("globalThis.React"));
    assert!(!js.contains("from \"react\""));
    assert!(!js.contains("from 'react'"));
    assert_eq!(result.required_globals, vec!["React"]);
}

#[tokio::test]
async fn test_cross_file_extension_lookup() {
    initialize();
    let request = BuildRequest::new([
        ("/App.js", "import Foo from './Foo'; export default Foo;"),
        ("/Foo.jsx", "export default function Foo() { return <div>foo</div>; }"),
    ]);

    let result = build(request).await;
    assert!(result.success, "{:?}", result.error);
    let js = result.bundle.unwrap().js;
    assert!(js.contains("function Foo"));
    assert!(js.contains("\"foo\""));
}

#[tokio::test]
async fn test_missing_relative_import_degrades() {
    initialize();
    let request = BuildRequest::new([(
        "/App.js",
        "import X from './does-not-exist';\nexport default () => X;",
    )]);

    let result = build(request).await;
    assert!(result.success, "{:?}", result.error);
    assert!(result.bundle.is_some());
    assert_eq!(
        result.warnings,
        vec!["Unresolved import \"./does-not-exist\" from \"/App.js\" replaced with an empty module"]
    );
}

#[tokio::test]
async fn test_no_files_is_request_error() {
    let result = build(BuildRequest::default()).await;

    assert!(!result.success);
    assert!(result.bundle.is_none());
    assert!(result
        .error
        .unwrap()
        .to_lowercase()
        .contains("no files provided"));
}

#[tokio::test]
async fn test_syntax_error_is_engine_error() {
    initialize();
    let request = BuildRequest::new([("/App.js", "export default function App( {")]);

    let result = build(request).await;
    assert!(!result.success);
    assert!(result.bundle.is_none());
    let error = result.error.unwrap();
    assert!(!error.is_empty());
    assert!(error.contains("App.js"), "{}", error);
}

#[tokio::test]
async fn test_invalid_source_fails_without_bundle() {
    initialize();
    let request = BuildRequest::new([("/App.js", "this is not valid syntax {{{")]);

    let result = build(request.clone()).await;
    assert!(!result.success);
    assert!(result.bundle.is_none());
    assert!(!result.error.unwrap_or_default().is_empty());

    let err = build_with_config(request, &BundlerConfig::default())
        .await
        .unwrap_err();
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_missing_entry_point_is_engine_error() {
    initialize();
    let request = BuildRequest::new([("/index.js", "export default 1;")]);

    let err = build_with_config(request, &BundlerConfig::default())
        .await
        .unwrap_err();
    assert!(!err.is_client_error());
    assert!(err.to_string().contains("/App.js"));
}

#[tokio::test]
async fn test_entry_point_without_leading_slash() {
    initialize();
    let request = BuildRequest::new([("src/main.js", "export default 'main';")])
        .with_entry_point("src/main.js");

    let result = build(request).await;
    assert!(result.success, "{:?}", result.error);
}

#[tokio::test]
async fn test_shim_wins_over_virtual_file() {
    initialize();
    let request = BuildRequest::new([
        ("/App.js", "import { useState } from 'react'; export default useState;"),
        ("/react.js", "export const useState = 'virtual react';"),
    ]);

    let js = build(request).await.bundle.unwrap().js;
    assert!(js.contains("globalThis.React"));
    assert!(!js.contains("virtual react"));
}

#[tokio::test]
async fn test_named_imports_from_stub_are_defined() {
    initialize();
    let output = build_with_config(
        load_project("missing_imports"),
        &BundlerConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(output.warnings.len(), 3);
    for specifier in ["chart-kit", "./does-not-exist", "./theme.css"] {
        assert!(output
            .warnings
            .iter()
            .any(|warning| warning.contains(&format!("\"{}\"", specifier))));
    }
    assert!(output.bundle.js.contains("__inert"));
}

#[tokio::test]
async fn test_css_is_aggregated() {
    initialize();
    let output = build_with_config(load_project("react_counter"), &BundlerConfig::default())
        .await
        .unwrap();

    let css = output.bundle.css;
    assert!(css.starts_with("/* /styles.css */\n"));
    assert!(!css.contains("@tailwind"));
    assert!(!css.contains("@apply"));
    assert!(css.contains(".app {\n  font-family: system-ui, sans-serif;\n  padding: 2rem;\n}\n"));
    assert_eq!(output.required_globals, vec!["React", "clsx"]);
}

#[tokio::test]
async fn test_custom_global_name() {
    initialize();
    let config = BundlerConfig {
        global_name: "PreviewApp".to_string(),
        ..Default::default()
    };
    let request = BuildRequest::new([("/App.js", "export const answer = 42;")]);

    let output = build_with_config(request, &config).await.unwrap();
    assert!(output.bundle.js.contains("root[\"PreviewApp\"]"));
    assert!(output.bundle.js.contains("root[\"PreviewApp_EXPORTS\"]"));
    assert!(!output.bundle.js.contains("__SANDBOX_APP__"));
}

#[test]
fn test_initialization_is_idempotent() {
    initialize_engine().unwrap();
    assert_eq!(
        initialize_engine().unwrap(),
        EngineStatus::AlreadyInitialized
    );

    let started: Vec<EngineStatus> = (0..8)
        .map(|_| std::thread::spawn(|| initialize_engine().unwrap()))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert!(started
        .iter()
        .all(|status| *status == EngineStatus::AlreadyInitialized));

    assert!(shared_engine().unwrap().ptr_eq(&shared_engine().unwrap()));
}
