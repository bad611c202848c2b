use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum TrunkError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {code:?}")]
    Failed { command: String, code: Option<i32> },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cannot create cache directory {path:?}: {source}. You must manually create the path")]
    CacheRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    #[error("Failed to download {url} to {path:?}: {source}")]
    Download {
        url: String,
        path: PathBuf,
        #[source]
        source: FetchError,
    },

    #[error("Failed to extract {archive:?}: {source}")]
    Extract {
        archive: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("Archive {0:?} extracted to nothing")]
    EmptyArchive(PathBuf),

    #[error("Failed to update trunk checkout {path:?}: {source}")]
    Trunk {
        path: PathBuf,
        #[source]
        source: TrunkError,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CacheError::Io { path, source }
    }
}
