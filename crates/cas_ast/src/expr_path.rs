//! Expression path types for occurrence-based addressing.
//!
//! An `ExprPath` identifies a specific location in an expression tree,
//! so a single occurrence can be rewritten even when the same id is
//! shared by several parents.

/// A path from the root to a specific node in an expression tree.
///
/// Each element is a child index (0-based):
/// - `Apply`: 0..n = arguments
/// - `Paren`: 0 = body
///
/// Example: In `(a + b) * c`, the path to `b` is `[0, 0, 1]`
/// (Paren, then its body, then the second argument of the Add).
pub type ExprPath = Vec<usize>;

/// Convert a path to a human-readable string (for debugging)
pub fn path_to_string(path: &[usize]) -> String {
    if path.is_empty() {
        return "root".to_string();
    }
    path.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
