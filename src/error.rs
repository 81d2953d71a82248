//! Error types for population generation and threshold analysis.

/// Errors raised by the generation and threshold core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PromotionError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("insufficient data: {reason}")]
    InsufficientData { reason: String },
}

impl PromotionError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        PromotionError::Configuration { reason: reason.into() }
    }

    pub(crate) fn invalid_parameter(reason: impl Into<String>) -> Self {
        PromotionError::InvalidParameter { reason: reason.into() }
    }

    pub(crate) fn insufficient_data(reason: impl Into<String>) -> Self {
        PromotionError::InsufficientData { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, PromotionError>;

/// Errors raised while reading or writing datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error on line {line}: {reason}")]
    Csv { line: usize, reason: String },

    #[error("task {task_id} of {member} has score {score}, expected {mark} x {rating}")]
    InconsistentTask {
        member: String,
        task_id: String,
        mark: u8,
        rating: i8,
        score: i32,
    },

    #[error("{member} has recorded total score {recorded}, tasks sum to {computed}")]
    InconsistentTotal {
        member: String,
        recorded: i32,
        computed: i32,
    },

    #[error("dataset contains no records")]
    Empty,
}
