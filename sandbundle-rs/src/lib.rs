#![allow(clippy::uninlined_format_args)]
#![doc = include_str!("../README.md")]

pub mod build;
pub mod bundler;
pub mod config;
pub mod css;
pub mod engine;
pub mod error;
pub mod loader;
pub mod output;
pub mod request;
pub mod resolver;
pub mod shims;
pub mod vfs;

#[macro_use]
extern crate lazy_static;

pub use build::{build, build_with_config};
pub use config::{BundlerConfig, DEFAULT_ENTRY_POINT};
pub use engine::{initialize_engine, initialize_engine_with, shared_engine, EngineStatus};
pub use error::BuildError;
pub use request::{BuildOutput, BuildRequest, BuildResult, Bundle};
pub use shims::{ShimDefinition, ShimModule, ShimRegistry};
pub use vfs::{FileKind, VirtualFileSystem};
