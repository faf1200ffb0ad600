use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Exporter error: {0}")]
    ExporterError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
