use std::path::PathBuf;

use thiserror::Error;

use crate::artifact::error::CacheError;
use crate::version::error::NormalizationError;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to spawn {shell}: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Environment {0:?} has no bootstrap script")]
    MissingBootstrap(PathBuf),

    #[error("Cannot prepare test script {path:?}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("Cannot write result log {path:?}: {source}")]
    ResultLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
