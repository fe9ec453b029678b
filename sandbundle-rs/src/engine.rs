//! The process-wide bundling engine.
//!
//! The SWC bundler keeps its state in `Rc` source maps and scoped globals, so
//! all builds run on one dedicated worker thread. Callers hold a cheap
//! [`BundleEngine`] handle and talk to the worker over a bounded channel.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, bail};
use futures::channel::{mpsc, mpsc::Sender, oneshot};
use futures::{SinkExt, StreamExt};

use crate::bundler::{self, BundleEmit};
use crate::error::BuildError;
use crate::shims::{ShimRegistry, DEFAULT_SHIMS};
use crate::vfs::VirtualFileSystem;

lazy_static! {
    static ref ENGINE: Mutex<Option<BundleEngine>> = Mutex::new(None);
}

/// Outcome of an initialization request. Both variants are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Started,
    AlreadyInitialized,
}

/// Starts the engine with the built-in shims.
pub fn initialize_engine() -> Result<EngineStatus, BuildError> {
    start_engine_with(|| DEFAULT_SHIMS.clone())
}

/// Starts the engine with `shims`, unless it is already running.
///
/// Initialization is serialized: concurrent callers observe exactly one
/// `Started`. When the engine already runs, `shims` is discarded.
pub fn initialize_engine_with(shims: ShimRegistry) -> Result<EngineStatus, BuildError> {
    start_engine_with(|| shims)
}

/// The registry is only built when the engine actually starts.
fn start_engine_with(
    shims: impl FnOnce() -> ShimRegistry,
) -> Result<EngineStatus, BuildError> {
    let mut engine = ENGINE.lock().unwrap_or_else(PoisonError::into_inner);
    if engine.is_some() {
        log::debug!("Bundling engine already initialized");
        return Ok(EngineStatus::AlreadyInitialized);
    }

    *engine = Some(BundleEngine::start(shims()).map_err(BuildError::engine)?);
    log::info!("Bundling engine started");
    Ok(EngineStatus::Started)
}

/// Handle to the running engine, starting it with the built-in shims if needed.
pub fn shared_engine() -> Result<BundleEngine, BuildError> {
    if let Some(engine) = running_engine() {
        return Ok(engine);
    }
    initialize_engine()?;
    running_engine().ok_or_else(|| BuildError::Engine("Bundling engine is not running".to_string()))
}

fn running_engine() -> Option<BundleEngine> {
    ENGINE.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

pub enum EngineCommand {
    Bundle {
        vfs: VirtualFileSystem,
        entry_point: String,
        responder: oneshot::Sender<Result<BundleEmit, anyhow::Error>>,
    },
}

#[derive(Clone)]
pub struct BundleEngine {
    sender: Sender<EngineCommand>,
    shims: Arc<ShimRegistry>,
    _handle: Arc<JoinHandle<()>>,
}

impl BundleEngine {
    fn start(shims: ShimRegistry) -> Result<Self, anyhow::Error> {
        let (sender, mut receiver) = mpsc::channel::<EngineCommand>(32);
        let shims = Arc::new(shims);
        let worker_shims = shims.clone();

        let handle = thread::Builder::new()
            .name("sandbundle-engine".to_string())
            .spawn(move || {
                while let Some(cmd) = futures::executor::block_on(receiver.next()) {
                    match cmd {
                        EngineCommand::Bundle {
                            vfs,
                            entry_point,
                            responder,
                        } => {
                            let result = catch_unwind(AssertUnwindSafe(|| {
                                bundler::bundle(&vfs, &worker_shims, &entry_point)
                            }))
                            .unwrap_or_else(|panic| {
                                Err(anyhow!("Bundler panicked: {}", panic_message(&*panic)))
                            });
                            responder.send(result).ok();
                        }
                    }
                }
            })
            .map_err(|err| anyhow!("Failed to start bundling engine: {}", err))?;

        Ok(Self {
            sender,
            shims,
            _handle: Arc::new(handle),
        })
    }

    pub fn shims(&self) -> &ShimRegistry {
        &self.shims
    }

    /// True when both handles talk to the same worker thread.
    pub fn ptr_eq(&self, other: &BundleEngine) -> bool {
        Arc::ptr_eq(&self._handle, &other._handle)
    }

    /// Bundles `vfs` starting at `entry_point`. Builds are processed one at a time.
    pub async fn bundle(
        &self,
        vfs: VirtualFileSystem,
        entry_point: String,
    ) -> Result<BundleEmit, anyhow::Error> {
        let (resp_tx, resp_rx) = oneshot::channel::<Result<BundleEmit, anyhow::Error>>();
        let cmd = EngineCommand::Bundle {
            vfs,
            entry_point,
            responder: resp_tx,
        };

        // Send request
        let mut sender = self.sender.clone();
        if let Err(err) = sender.send(cmd).await {
            bail!("Failed to send bundle request: {}", err);
        }

        // Wait for result
        match resp_rx.await {
            Ok(result) => result,
            Err(err) => bail!("Failed to retrieve bundle result: {}", err),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
