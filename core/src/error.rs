use thiserror::Error;

/// Why a raw record (or a draft) cannot become a canonical meal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("record has no id")]
    MissingId,
    #[error("food name must not be empty")]
    EmptyFoodName,
    #[error("record has no timestamp")]
    MissingTimestamp,
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("severity {0} reported without a symptom")]
    SeverityWithoutSymptom(String),
    #[error("symptom '{0}' reported without a severity")]
    SymptomWithoutSeverity(String),
    #[error("severity must be an integer between 1 and 10 (got {0})")]
    InvalidSeverity(String),
    #[error("at least one category is required")]
    NoCategories,
}

/// Every failure the engine can surface to its caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid meal record: {0}")]
    Validation(#[from] ValidationError),
    /// No response reached us (connect failure, timeout, broken body).
    #[error("could not reach the meal store: {0}")]
    Transport(String),
    #[error("meal store responded with status {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("meal '{0}' not found")]
    NotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
