use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report identifier '{0}' does not name a known entity category")]
    UnknownSubject(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure of a single data-source attempt. Absorbed by the source chain,
/// never propagated past it.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Source reported an unsuccessful response")]
    Unsuccessful,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
