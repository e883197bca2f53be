//! Pattern matching and term rewriting over `cas_ast` expression trees.
//!
//! A rule pairs a match pattern with a rewrite pattern (or callbacks):
//!
//! ```ignore
//! let rule = parse_rule("#a + 0", "#a", Constraints::new())?;
//! let mut ctx = Context::new();
//! let root = cas_parser::parse("1 + x + 0 + 2", &mut ctx)?;
//! let out = apply_rule(&rule, &mut ctx, root)?; // 1 + x + 2
//! ```
//!
//! Application finds the first matching node in post-order and rewrites only
//! that one. Partial matches inside sums and products replace just the
//! matched run of operands.

pub mod bindings;
pub mod error;
pub mod fixups;
pub mod flatten;
pub mod matcher;
pub mod options;
pub mod pattern;
pub mod populate;
pub mod query;
pub mod rule;
pub mod search;

pub use bindings::{Bindings, Match};
pub use error::RuleError;
pub use fixups::{fix_minuses, remove_unnecessary_parens};
pub use flatten::flatten_operands;
pub use matcher::match_node;
pub use options::{ApplyOptions, ParenCleanup};
pub use pattern::{Constraints, Pattern};
pub use populate::populate;
pub use query::get_ranges;
pub use rule::{
    apply_rule, apply_rule_with, can_apply_rule, compile_matcher, compile_rewriter,
    define_pattern_rule, define_rule, parse_rule, MatchFn, RewriteFn, Rule,
};
pub use search::search;
