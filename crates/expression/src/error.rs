use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Evaluation error: cannot compare {left} with {right} using '{op}'")]
    TypeMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, EvalError>;
