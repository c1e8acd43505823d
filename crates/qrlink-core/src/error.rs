use thiserror::Error;

/// Errors raised while loading or validating resolver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read grammar file {path}: {source}")]
    GrammarFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse grammar file: {0}")]
    GrammarFileParse(#[from] serde_yaml::Error),

    #[error("grammar validation failed: {0}")]
    Validation(String),
}
