use serde::{Deserialize, Serialize};

/// Client submission body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitExpression {
    pub expression: String,
}

/// Agent registration body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAgent {
    pub address: String,
}
