use thiserror::Error;

pub type IncidenceResult<T> = Result<T, IncidenceError>;

#[derive(Debug, Error)]
pub enum IncidenceError {
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("no observations left to aggregate")]
    EmptyInput,

    #[error("group labels have length {groups} but dates have length {dates}")]
    InconsistentGroupLength { dates: usize, groups: usize },

    #[error("invalid fit input{}: {reason}", .position.map(|p| format!(" at position {p}")).unwrap_or_default())]
    InvalidFitInput {
        position: Option<usize>,
        reason: String,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
