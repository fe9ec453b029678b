//! JavaScript bundler for sandboxed builds.
//!
//! Wires the sandbox [`Resolver`](crate::resolver::Resolver) and
//! [`Loader`](crate::loader::Loader) into the SWC bundler as its resolve and
//! load hooks. Modules are transpiled with deno_ast (JSX, TypeScript) and the
//! linked graph is printed as a single unminified ES2020 IIFE.
//!
//! # Architecture
//!
//! - `emit`: Core bundling logic using the SWC bundler
//! - `bundle_hook`: Handles `import.meta` rewriting during bundling
//! - `text`: Source text helpers (BOM, JSON modules)

mod bundle_hook;
mod emit;
mod text;

pub use emit::{bundle, BundleEmit};
