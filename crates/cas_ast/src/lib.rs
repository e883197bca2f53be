//! Expression arena, printer and traversal primitives shared by the parser,
//! the evaluator and the rewrite engine.

pub mod display;
pub mod eq;
pub mod error;
pub mod expr_path;
pub mod expression;
pub mod traversal;

pub use display::DisplayExpr;
pub use eq::{nodes_equal, same_tree};
pub use error::AstError;
pub use expr_path::ExprPath;
pub use expression::{Context, Expr, ExprId, Notation, Op, Placeholder};
