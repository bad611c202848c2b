use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("Version '{0}' has no numeric release segment")]
    NoRelease(String),

    #[error("Version '{version}' has an unrecognized prefix '{prefix}'")]
    UnrecognizedPrefix { version: String, prefix: String },

    #[error(
        "Version '{version}': token '{token}' is neither a number nor a known pre-release qualifier"
    )]
    InvalidToken { version: String, token: String },

    #[error("Version '{version}': pre-release token '{token}' must be the last segment")]
    MisplacedQualifier { version: String, token: String },
}

#[derive(Debug, Error)]
pub enum ListerError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to read version list {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid version list {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
