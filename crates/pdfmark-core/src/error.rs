use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfMarkError {
    #[error("Identifier payload must be {expected} bytes, got {actual}")]
    InvalidPayloadLength { expected: usize, actual: usize },

    #[error("No stream object found that could carry the pattern")]
    NoCarrierFound,

    #[error("Carrier stream is {length} bytes, need at least {required}")]
    StreamTooSmall { length: usize, required: usize },

    #[error("Failed to load PDF {}: {reason}", path.display())]
    LoadError { path: PathBuf, reason: String },

    #[error("Failed to save PDF {}: {reason}", path.display())]
    SaveError { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, PdfMarkError>;
