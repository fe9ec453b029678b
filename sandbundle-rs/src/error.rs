use thiserror::Error;

/// Failure of a build.
///
/// Unresolvable imports are never errors; they degrade to empty modules and
/// are reported as warnings on a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The request cannot be built at all. Reported before the engine runs.
    #[error("{0}")]
    RequestInvalid(String),
    /// Parse error, missing entry point or internal bundler failure.
    #[error("{0}")]
    Engine(String),
}

impl BuildError {
    /// Errors caused by the caller rather than the bundler.
    pub fn is_client_error(&self) -> bool {
        matches!(self, BuildError::RequestInvalid(_))
    }

    /// Keeps the whole context chain of an engine error.
    pub(crate) fn engine(err: anyhow::Error) -> Self {
        BuildError::Engine(format!("{:#}", err))
    }
}
