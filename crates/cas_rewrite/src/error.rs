use cas_ast::AstError;
use cas_math::EvalError;
use cas_parser::ParseError;
use thiserror::Error;

/// Errors raised while defining or applying a rule.
///
/// Failing to match is not an error: searches return `None` and
/// [`apply_rule`](crate::apply_rule) returns its input unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Malformed pattern: {0}")]
    MalformedPattern(String),
    #[error("Placeholder {0} is not bound by the match pattern")]
    UnboundPlaceholder(String),
    #[error("Range {start}..{end} is out of bounds for {len} operands")]
    InvalidRange { start: usize, end: usize, len: usize },
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("AST error: {0}")]
    Ast(#[from] AstError),
}
