use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Cannot evaluate non-numeric operand '{0}'")]
    NonNumeric(String),
    #[error("{value} has no exact root of index {index}")]
    InexactRoot { value: String, index: i64 },
    #[error("'{0}' requires integer operands")]
    NonInteger(String),
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("'{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: &'static str,
        found: usize,
    },
    #[error("Cannot evaluate '{0}'")]
    Unsupported(String),
}
