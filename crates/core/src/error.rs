use std::io;
use std::path::PathBuf;

/// Errors that can occur while loading the inputs of an engine check
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Manifest not found: {}", path.display())]
    ManifestMissing { path: PathBuf },

    #[error("Manifest {} could not be parsed: {reason}", path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("No engines declared in {}", path.display())]
    NoEnginesDeclared { path: PathBuf },

    #[error("Override rules in {} could not be parsed: {reason}", path.display())]
    OverrideInvalid { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for engine-check operations
pub type Result<T> = std::result::Result<T, Error>;
