use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by enrollment, matching, and the streaming loop.
#[derive(Debug, Error)]
pub enum FaceMatchError {
    /// The enrollment photo directory does not exist.
    #[error("enrollment directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// No persisted store at the given path.
    #[error("embedding store not found at {0}, run enrollment first")]
    StoreMissing(PathBuf),

    /// The store blob exists but cannot be deserialized.
    #[error("failed to deserialize embedding store: {0}")]
    CorruptStore(String),

    /// Filesystem failure while reading or writing the store.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Probe and stored embeddings disagree on length.
    #[error("embedding dimension mismatch: probe has {probe}, stored has {stored}")]
    DimensionMismatch {
        /// Length of the probe embedding.
        probe: usize,
        /// Length of the stored embedding it was compared against.
        stored: usize,
    },

    /// Strict extraction found no face in the image.
    #[error("no face detected")]
    NoFaceDetected,

    /// The extraction backend itself failed.
    #[error("extractor failed: {0}")]
    Extractor(String),

    /// Frame acquisition failed mid-stream.
    #[error("frame capture failed: {0}")]
    Capture(String),

    /// An enrollment photo could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(String),
}
