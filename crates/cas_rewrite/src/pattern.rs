//! Pattern trees, constraints and pattern validation.

use crate::bindings::Bindings;
use crate::error::RuleError;
use cas_ast::traversal::{children, collect_placeholders};
use cas_ast::{Context, DisplayExpr, Expr, ExprId, Op};
use cas_parser::ParseError;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// A pattern tree that owns its nodes.
///
/// Patterns are compared against (and instantiated into) other arenas, so a
/// compiled rule never borrows the caller's [`Context`].
#[derive(Debug, Clone)]
pub struct Pattern {
    ctx: Context,
    root: ExprId,
}

impl Pattern {
    /// Parse a pattern from its textual notation (`#a + 0`, `#a_0 * ...`).
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut ctx = Context::new();
        let root = cas_parser::parse(text, &mut ctx)?;
        Ok(Pattern { ctx, root })
    }

    /// Copy the subtree at `id` out of `source`.
    pub fn from_expr(source: &Context, id: ExprId) -> Self {
        let mut ctx = Context::new();
        let root = ctx.import(source, id);
        Pattern { ctx, root }
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    #[inline]
    pub fn root(&self) -> ExprId {
        self.root
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            DisplayExpr {
                context: &self.ctx,
                id: self.root
            }
        )
    }
}

pub type Predicate = dyn Fn(&Context, ExprId) -> bool + Send + Sync;

/// Per-placeholder predicates, keyed by placeholder name.
///
/// A constraint on `b` applies to `#b` and to every member of the `#b_k`
/// family. It is checked when a value is first bound to the name.
#[derive(Clone, Default)]
pub struct Constraints {
    predicates: FxHashMap<String, Arc<Predicate>>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, name: &str, predicate: F) -> Self
    where
        F: Fn(&Context, ExprId) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.to_string(), Arc::new(predicate));
        self
    }

    /// True when `name` is unconstrained or its predicate accepts `id`.
    pub fn allows(&self, name: &str, ctx: &Context, id: ExprId) -> bool {
        self.predicates
            .get(name)
            .map_or(true, |predicate| predicate(ctx, id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Constraints").field("names", &names).finish()
    }
}

/// Family of the first `#name_0` placeholder of `template` (pre-order).
pub(crate) fn anchor_family(ctx: &Context, template: ExprId) -> Option<&str> {
    collect_placeholders(ctx, template)
        .into_iter()
        .find(|p| p.subscript == Some(0))
        .map(|p| p.name.as_str())
}

/// Recognize the variable-length form `op(template, ...)` where `template`
/// contains a `#name_0` placeholder. Returns the template and the family
/// whose bound length drives the expansion.
pub(crate) fn variable_length_template(ctx: &Context, id: ExprId) -> Option<(ExprId, &str)> {
    match ctx.get(id) {
        Expr::Apply { args, .. } if args.len() == 2 && matches!(ctx.get(args[1]), Expr::Ellipsis) => {
            anchor_family(ctx, args[0]).map(|family| (args[0], family))
        }
        _ => None,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Match,
    Rewrite,
}

fn ellipsis_position_ok(ctx: &Context, op: &Op, args: &[ExprId], k: usize, side: Side) -> bool {
    match side {
        Side::Match => {
            op.is_commutative()
                && k > 0
                && !matches!(ctx.get(args[k - 1]), Expr::Ellipsis)
                && anchor_family(ctx, args[k - 1]).is_some()
        }
        Side::Rewrite => {
            args.len() == 2 && k == 1 && anchor_family(ctx, args[0]).is_some()
        }
    }
}

fn check_ellipses(pattern: &Pattern, side: Side) -> Result<(), RuleError> {
    let ctx = pattern.context();
    // (node, node is an operand at a legal `...` position)
    let mut stack: SmallVec<[(ExprId, bool); 16]> = SmallVec::new();
    stack.push((pattern.root(), false));

    while let Some((id, allowed)) = stack.pop() {
        match ctx.get(id) {
            Expr::Ellipsis if !allowed => {
                let expected = match side {
                    Side::Match => "after a `#name_0` template inside a sum or product",
                    Side::Rewrite => "as the second operand of `template op ...` with a `#name_0` template",
                };
                return Err(RuleError::MalformedPattern(format!(
                    "`...` must appear {} in `{}`",
                    expected, pattern
                )));
            }
            Expr::Apply { op, args, .. } => {
                for (k, &arg) in args.iter().enumerate() {
                    let ok = matches!(ctx.get(arg), Expr::Ellipsis)
                        && ellipsis_position_ok(ctx, op, args, k, side);
                    stack.push((arg, ok));
                }
            }
            other => stack.extend(children(other).iter().map(|&child| (child, false))),
        }
    }

    Ok(())
}

/// Reject match patterns whose `...` does not follow a template anchored by
/// a `#name_0` placeholder.
pub fn validate_match_pattern(pattern: &Pattern) -> Result<(), RuleError> {
    check_ellipses(pattern, Side::Match)
}

/// Reject rewrite patterns with misplaced `...` or with placeholders the
/// match pattern never binds.
pub fn validate_rewrite_pattern(rewrite: &Pattern, matcher: &Pattern) -> Result<(), RuleError> {
    check_ellipses(rewrite, Side::Rewrite)?;

    let mut scalars = FxHashSet::default();
    let mut families = FxHashSet::default();
    for p in collect_placeholders(matcher.context(), matcher.root()) {
        match p.subscript {
            Some(_) => families.insert(p.name.as_str()),
            None => scalars.insert(p.name.as_str()),
        };
    }

    for p in collect_placeholders(rewrite.context(), rewrite.root()) {
        let known = match p.subscript {
            Some(_) => families.contains(p.name.as_str()),
            None => scalars.contains(p.name.as_str()),
        };
        if !known {
            return Err(RuleError::UnboundPlaceholder(p.to_string()));
        }
    }

    Ok(())
}

/// Placeholders of `pattern` that `bindings` cannot supply, in pre-order,
/// each listed once. A subscripted placeholder counts as supplied when its
/// family has any bound member.
pub fn missing_bindings(pattern: &Pattern, bindings: &Bindings) -> Vec<String> {
    let mut seen = FxHashSet::default();
    collect_placeholders(pattern.context(), pattern.root())
        .into_iter()
        .filter(|p| match p.subscript {
            Some(_) => !bindings.has_family(&p.name),
            None => !bindings.has_scalar(&p.name),
        })
        .map(|p| p.to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
