use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster must contain a '{column}' column")]
    MissingColumn { column: String },

    #[error("Invalid start month '{value}': expected YYYY-MM")]
    InvalidStartMonth { value: String },

    #[error("Invalid config '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SynthResult<T> = Result<T, SynthError>;
