//! Build orchestration: request validation, engine dispatch and output assembly.

use crate::config::BundlerConfig;
use crate::css::aggregate_css;
use crate::engine::shared_engine;
use crate::error::BuildError;
use crate::output::assemble;
use crate::request::{BuildOutput, BuildRequest, BuildResult};
use crate::vfs::{normalize_path, VirtualFileSystem};

/// Builds `request` with the default configuration.
pub async fn build(request: BuildRequest) -> BuildResult {
    build_with_config(request, &BundlerConfig::default())
        .await
        .into()
}

pub async fn build_with_config(
    request: BuildRequest,
    config: &BundlerConfig,
) -> Result<BuildOutput, BuildError> {
    if request.files.is_empty() {
        return Err(BuildError::RequestInvalid("No files provided".to_string()));
    }

    let entry_point = normalize_path(
        request
            .entry_point
            .as_deref()
            .filter(|entry| !entry.trim().is_empty())
            .unwrap_or(config.default_entry_point.as_str()),
    );
    let vfs = VirtualFileSystem::from_files(request.files);

    let engine = shared_engine()?;
    let css = aggregate_css(&vfs);
    let file_count = vfs.len();

    let emit = engine
        .bundle(vfs, entry_point.clone())
        .await
        .map_err(|err| {
            log::info!("Build of {} failed: {:#}", entry_point, err);
            BuildError::engine(err)
        })?;

    log::info!(
        "Built {} from {} files ({} bytes of js, {} bytes of css, {} warnings)",
        entry_point,
        file_count,
        emit.code.len(),
        css.len(),
        emit.warnings.len()
    );

    Ok(BuildOutput {
        bundle: assemble(&emit, css, &config.global_name),
        warnings: emit.warnings,
        required_globals: emit.required_globals.into_iter().collect(),
    })
}
