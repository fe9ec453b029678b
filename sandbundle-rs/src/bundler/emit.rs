//! Core bundling logic using the SWC bundler.
//!
//! A build runs in three steps:
//! 1. The entry point is resolved and registered as the single bundle entry
//! 2. SWC drives the traversal, calling back into [`SandboxResolver`] and
//!    [`SandboxLoader`], which answer from the virtual file system and the shim
//!    registry. Every module is transpiled with deno_ast before SWC sees it
//! 3. The linked module is printed as one IIFE script

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, bail};
use deno_ast::swc::ast::{EsVersion, ModuleItem, Stmt};
use deno_ast::swc::bundler::{Bundler, Config, Load, ModuleData, ModuleType, Resolve};
use deno_ast::swc::codegen::text_writer::JsWriter;
use deno_ast::swc::codegen::{Config as CodegenConfig, Emitter};
use deno_ast::swc::common::comments::SingleThreadedComments;
use deno_ast::swc::common::sync::Lrc;
use deno_ast::swc::common::{FileName, Globals, SourceMap, GLOBALS};
use deno_ast::swc::loader::resolve::Resolution;
use deno_ast::swc::parser::lexer::Lexer;
use deno_ast::swc::parser::{EsSyntax, Parser, StringInput, Syntax};
use deno_ast::{
    EmitOptions, MediaType, ModuleSpecifier, ParseParams, SourceMapOption, TranspileModuleOptions,
    TranspileOptions,
};
use regex::Regex;

use super::bundle_hook::BundleHook;
use super::text::{strip_bom, transform_json_source, STYLESHEET_MODULE};
use crate::loader::{empty_stub, Dialect, Loader};
use crate::resolver::{Namespace, ResolutionResult, Resolver};
use crate::shims::ShimRegistry;
use crate::vfs::VirtualFileSystem;

lazy_static! {
    /// `import {a, b as c} from "x"`, `import D, {a} from "x"` and `export {a} from "x"`.
    static ref NAMED_BINDINGS_RE: Regex = Regex::new(
        r#"\b(?:import|export)\s+(?:[\w$]+\s*,\s*)?\{([^}]*)\}\s*from\s*["']([^"']+)["']"#
    )
    .unwrap();
}

/// The result of a bundle operation.
#[derive(Debug, Clone, Default)]
pub struct BundleEmit {
    /// The bundled JavaScript code.
    pub code: String,
    /// True when `code` is a single expression statement evaluating to the
    /// entry's export namespace.
    pub is_expression: bool,
    /// One entry per import that was replaced with an empty module.
    pub warnings: Vec<String>,
    /// Host globals read by the shims included in the bundle.
    pub required_globals: BTreeSet<String>,
}

/// Bundles the module graph reachable from `entry_point` into a single IIFE script.
///
/// Unresolvable imports never fail the bundle. Errors are limited to a
/// missing entry point, syntax errors and internal bundler failures.
pub fn bundle(
    vfs: &VirtualFileSystem,
    shims: &ShimRegistry,
    entry_point: &str,
) -> Result<BundleEmit, anyhow::Error> {
    let globals = Globals::new();

    GLOBALS.set(&globals, || {
        let source_map = Lrc::new(SourceMap::default());
        let session = BuildSession::new(vfs, shims, entry_point, source_map.clone());

        let entry = session.register(None, &session.resolver.resolve(entry_point, None));

        let config = Config {
            module: ModuleType::Iife,
            external_modules: vec![],
            ..Default::default()
        };

        let mut bundler = Bundler::new(
            &globals,
            source_map.clone(),
            SandboxLoader { session: &session },
            SandboxResolver { session: &session },
            config,
            Box::new(BundleHook),
        );

        let mut entries = HashMap::new();
        entries.insert("bundle".to_string(), FileName::Custom(entry));

        let bundles = bundler.bundle(entries)?;
        if bundles.is_empty() {
            bail!("Bundler produced no output");
        }
        let module = &bundles[0].module;

        let mut buf = Vec::new();
        {
            let cfg = CodegenConfig::default()
                .with_minify(false)
                .with_target(EsVersion::Es2020)
                .with_omit_last_semi(false);

            let mut emitter = Emitter {
                cfg,
                cm: source_map.clone(),
                comments: None,
                wr: Box::new(JsWriter::new(source_map.clone(), "\n", &mut buf, None)),
            };

            emitter.emit_module(module)?;
        }

        let is_expression = matches!(
            module.body.as_slice(),
            [ModuleItem::Stmt(Stmt::Expr(_))]
        );

        Ok(BundleEmit {
            code: String::from_utf8(buf)?,
            is_expression,
            warnings: session.warnings(),
            required_globals: session.required_globals(),
        })
    })
}

/// Identity of a module inside one build, keyed by its SWC file name.
#[derive(Debug, Clone)]
struct ModuleId {
    path: String,
    namespace: Namespace,
}

/// State shared by the resolve and load hooks of a single build.
struct BuildSession<'a> {
    resolver: Resolver<'a>,
    loader: Loader<'a>,
    shims: &'a ShimRegistry,
    source_map: Lrc<SourceMap>,
    modules: Mutex<HashMap<String, ModuleId>>,
    stub_exports: Mutex<HashMap<String, BTreeSet<String>>>,
    warnings: Mutex<Vec<String>>,
    required_globals: Mutex<BTreeSet<String>>,
}

impl<'a> BuildSession<'a> {
    fn new(
        vfs: &'a VirtualFileSystem,
        shims: &'a ShimRegistry,
        entry_point: &'a str,
        source_map: Lrc<SourceMap>,
    ) -> Self {
        Self {
            resolver: Resolver::new(vfs, shims, entry_point),
            loader: Loader::new(vfs, shims),
            shims,
            source_map,
            modules: Default::default(),
            stub_exports: Default::default(),
            warnings: Default::default(),
            required_globals: Default::default(),
        }
    }

    /// Records a resolution and returns the module key it is bundled under.
    ///
    /// Empty stubs get one module per importer so each can export exactly the
    /// names its importer asks for.
    fn register(&self, importer: Option<&str>, resolution: &ResolutionResult) -> String {
        let key = module_key(importer, resolution);
        lock(&self.modules)
            .entry(key.clone())
            .or_insert_with(|| ModuleId {
                path: resolution.resolved_path.clone(),
                namespace: resolution.namespace,
            });
        key
    }

    fn module(&self, key: &str) -> Option<ModuleId> {
        lock(&self.modules).get(key).cloned()
    }

    fn warn(&self, message: String) {
        let mut warnings = lock(&self.warnings);
        if !warnings.contains(&message) {
            log::warn!("{}", message);
            warnings.push(message);
        }
    }

    fn warnings(&self) -> Vec<String> {
        lock(&self.warnings).clone()
    }

    fn required_globals(&self) -> BTreeSet<String> {
        lock(&self.required_globals).clone()
    }

    /// Notes the names that `importer` imports from modules that will be stubbed.
    fn collect_stub_exports(&self, importer: &str, code: &str) {
        for caps in NAMED_BINDINGS_RE.captures_iter(code) {
            let resolution = self.resolver.resolve(&caps[2], Some(importer));
            if resolution.namespace != Namespace::Empty {
                continue;
            }

            let names = caps[1]
                .split(',')
                .filter_map(|item| item.split_whitespace().next())
                .filter(|name| *name != "type")
                .map(str::to_string);

            lock(&self.stub_exports)
                .entry(module_key(Some(importer), &resolution))
                .or_default()
                .extend(names);
        }
    }

    fn load_module(&self, key: &str) -> Result<String, anyhow::Error> {
        let id = self
            .module(key)
            .ok_or_else(|| anyhow!("Module was never resolved: {}", key))?;
        log::debug!("Loading {} ({})", id.path, id.namespace);

        match id.namespace {
            Namespace::Empty => {
                let stub_exports = lock(&self.stub_exports);
                let names = stub_exports.get(key).into_iter().flatten();
                Ok(empty_stub(names.map(String::as_str)))
            }
            Namespace::Shim => {
                if let Some(shim) = self.shims.lookup(&id.path) {
                    lock(&self.required_globals).extend(shim.globals.iter().cloned());
                }
                Ok(self.loader.load(&id.path, id.namespace)?.contents)
            }
            Namespace::Virtual => {
                let module = self.loader.load(&id.path, id.namespace)?;
                let code = transpile(&id.path, &module.contents, module.dialect)?;
                self.collect_stub_exports(&id.path, &code);
                Ok(code)
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn module_key(importer: Option<&str>, resolution: &ResolutionResult) -> String {
    match resolution.namespace {
        Namespace::Empty => format!(
            "empty:{} (from {})",
            resolution.resolved_path,
            importer.unwrap_or("<entry>")
        ),
        namespace => format!("{}:{}", namespace, resolution.resolved_path),
    }
}

/// SWC bundler Load trait implementation that serves modules of the build.
struct SandboxLoader<'s, 'a> {
    session: &'s BuildSession<'a>,
}

impl Load for SandboxLoader<'_, '_> {
    fn load(&self, file: &FileName) -> Result<ModuleData, anyhow::Error> {
        let key = match file {
            FileName::Custom(key) => key,
            _ => bail!("Unsupported file name: {:?}", file),
        };

        let code = self.session.load_module(key)?;
        let (source_file, module) = parse_module(key, code, &self.session.source_map)?;

        Ok(ModuleData {
            fm: source_file,
            module,
            helpers: Default::default(),
        })
    }
}

/// SWC bundler Resolve trait implementation backed by the sandbox [`Resolver`].
struct SandboxResolver<'s, 'a> {
    session: &'s BuildSession<'a>,
}

impl Resolve for SandboxResolver<'_, '_> {
    fn resolve(
        &self,
        base: &FileName,
        module_specifier: &str,
    ) -> Result<Resolution, anyhow::Error> {
        let base_key = match base {
            FileName::Custom(key) => key,
            _ => bail!("Unsupported base file name: {:?}", base),
        };
        let importer = self
            .session
            .module(base_key)
            .filter(|id| id.namespace == Namespace::Virtual)
            .map(|id| id.path);

        let resolution = self
            .session
            .resolver
            .resolve(module_specifier, importer.as_deref());
        log::debug!(
            "Resolved \"{}\" from {} to {} ({})",
            module_specifier,
            base_key,
            resolution.resolved_path,
            resolution.namespace
        );

        if resolution.namespace == Namespace::Empty {
            self.session.warn(format!(
                "Unresolved import \"{}\" from \"{}\" replaced with an empty module",
                module_specifier,
                importer.as_deref().unwrap_or(base_key)
            ));
        }

        let key = self.session.register(importer.as_deref(), &resolution);
        Ok(Resolution {
            filename: FileName::Custom(key),
            slug: None,
        })
    }
}

/// Transpiles JSX and TypeScript down to plain ES modules.
///
/// JSON is wrapped as a default export and stylesheets become empty modules.
fn transpile(path: &str, source: &str, dialect: Dialect) -> Result<String, anyhow::Error> {
    let source = strip_bom(source);

    let media_type = match dialect {
        Dialect::Json => return Ok(transform_json_source(source)),
        Dialect::Css => return Ok(STYLESHEET_MODULE.to_string()),
        Dialect::Js => MediaType::JavaScript,
        Dialect::Jsx => MediaType::Jsx,
        Dialect::Ts => MediaType::TypeScript,
        Dialect::Tsx => MediaType::Tsx,
    };

    let specifier = ModuleSpecifier::parse(&format!("file://{}", path))
        .or_else(|_| ModuleSpecifier::parse("file:///sandbox-module.js"))?;

    let parsed = deno_ast::parse_module(ParseParams {
        specifier,
        text: Arc::from(source),
        media_type,
        capture_tokens: false,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|e| anyhow!("{}", e))?;

    // Plain JS keeps every import so unused bindings still load their module.
    let transpile_options = TranspileOptions {
        verbatim_module_syntax: matches!(dialect, Dialect::Js | Dialect::Jsx),
        ..Default::default()
    };

    let emitted = parsed
        .transpile(
            &transpile_options,
            &TranspileModuleOptions::default(),
            &EmitOptions {
                source_map: SourceMapOption::None,
                ..Default::default()
            },
        )
        .map_err(|e| anyhow!("{}", e))?
        .into_source();

    Ok(emitted.text)
}

/// Parses already transpiled module code into the SWC AST.
fn parse_module(
    key: &str,
    code: String,
    source_map: &Lrc<SourceMap>,
) -> Result<
    (
        Rc<deno_ast::swc::common::SourceFile>,
        deno_ast::swc::ast::Module,
    ),
    anyhow::Error,
> {
    let source_file = source_map.new_source_file(FileName::Custom(key.to_string()).into(), code);

    let comments = SingleThreadedComments::default();
    let input = StringInput::from(&*source_file);
    let lexer = Lexer::new(
        Syntax::Es(EsSyntax::default()),
        EsVersion::Es2020,
        input,
        Some(&comments),
    );
    let mut parser = Parser::new_from(lexer);

    let module = parser
        .parse_module()
        .map_err(|e| anyhow!("Parse error in {}: {:?}", key, e.kind()))?;

    Ok((Rc::new((*source_file).clone()), module))
}
