use cas_math::SolveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CasError {
    #[error("Division by zero polynomial")]
    DivisionByZero,
    #[error("Degree {degree} exceeds the configured limit of {limit}")]
    DegreeLimitExceeded { degree: usize, limit: usize },
    #[error("Computation aborted")]
    Aborted,
    #[error("Not algebraically solvable: {0}")]
    NotSolvable(String),
    #[error("Polynomial error: {0}")]
    PolynomialError(String),
}

impl From<SolveError> for CasError {
    fn from(err: SolveError) -> Self {
        CasError::NotSolvable(err.to_string())
    }
}
