use thiserror::Error;

#[derive(Error, Debug)]
pub enum RevenueError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Division by zero: {0}")]
    Division(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RevenueResult<T> = Result<T, RevenueError>;
