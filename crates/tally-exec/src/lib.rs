//! Agent-side execution: the expression evaluator and the capacity-gated solver.

mod error;
pub use error::{EvalError, SolveError};

pub mod eval;
pub use eval::{ArithmeticEvaluator, Evaluator, MAX_DEPTH};

pub mod solver;
pub use solver::LocalSolver;

mod config;
pub use config::AgentConfig;

pub mod prelude {
    pub use crate::error::{EvalError, SolveError};
    pub use crate::{AgentConfig, ArithmeticEvaluator, Evaluator, LocalSolver};
}
