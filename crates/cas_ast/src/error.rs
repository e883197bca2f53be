//! Error types for cas_ast crate.

use thiserror::Error;

/// Errors that can occur in AST operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    /// A path step pointed past the children of a node.
    #[error("invalid path: step {step} has no child {index}")]
    InvalidPath { step: usize, index: usize },
}
