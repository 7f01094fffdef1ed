use thiserror::Error;

use tally_model::TaskId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("malformed number '{0}'")]
    BadNumber(String),
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NotFinite,
    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("at capacity ({limit} tasks)")]
    AtCapacity { limit: usize },
    #[error("task {0} is still in progress")]
    NotReady(TaskId),
    #[error("task {0} not found")]
    NotFound(TaskId),
}
