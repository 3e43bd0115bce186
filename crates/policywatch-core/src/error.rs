use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid {option}: {value}")]
    InvalidOption { option: &'static str, value: String },

    #[error("unknown data file: {0}")]
    UnknownDataFile(String),

    #[error("data file {file} returned null")]
    NullPayload { file: &'static str },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
