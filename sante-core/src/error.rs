use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Storage quota exceeded: requested {requested} bytes, {available} available")]
    QuotaExceeded { requested: u64, available: u64 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
