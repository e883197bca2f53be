use crate::bindings::Match;
use crate::error::RuleError;
use crate::fixups::{fix_minuses, remove_unnecessary_parens};
use crate::matcher::match_node;
use crate::options::{ApplyOptions, ParenCleanup};
use crate::pattern::{validate_match_pattern, validate_rewrite_pattern, Constraints, Pattern};
use crate::populate::populate;
use crate::search::search;
use cas_ast::expr_path::path_to_string;
use cas_ast::traversal::replace_at_path;
use cas_ast::{Context, ExprId, ExprPath};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, trace};

/// Finds a match at one node.
pub type MatchFn = Arc<dyn Fn(&Context, ExprId) -> Option<Match> + Send + Sync>;

/// Builds the replacement for a match, in the matched tree's arena.
pub type RewriteFn = Arc<dyn Fn(&mut Context, &Match) -> Result<ExprId, RuleError> + Send + Sync>;

/// A rewrite rule: where it applies and what it produces.
///
/// Rules are immutable and cheap to clone; one rule can be applied to any
/// number of trees, from any thread.
#[derive(Clone)]
pub struct Rule {
    name: Option<String>,
    matcher: MatchFn,
    rewriter: RewriteFn,
    constraints: Constraints,
}

impl Rule {
    /// Attach a name, used in log output.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    fn label(&self) -> &str {
        self.name().unwrap_or("<unnamed>")
    }

    /// Every bound value satisfies the constraint of the name it is bound to.
    fn admits(&self, ctx: &Context, found: &Match) -> bool {
        self.constraints.is_empty()
            || found
                .bindings
                .iter()
                .all(|(name, id)| self.constraints.allows(name, ctx, id))
    }

    /// First match in post-order below `root`.
    pub fn find(&self, ctx: &Context, root: ExprId) -> Option<(ExprPath, Match)> {
        search(ctx, root, |ctx, id| {
            (self.matcher)(ctx, id).filter(|found| self.admits(ctx, found))
        })
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}

/// Wrap a pattern into a match function.
pub fn compile_matcher(pattern: Pattern, constraints: Constraints) -> MatchFn {
    Arc::new(move |ctx: &Context, id: ExprId| match_node(&pattern, ctx, id, &constraints))
}

/// Wrap a pattern into a rewrite function. Redundant parentheses are
/// dropped from the instantiated pattern.
pub fn compile_rewriter(pattern: Pattern) -> RewriteFn {
    Arc::new(move |ctx: &mut Context, found: &Match| -> Result<ExprId, RuleError> {
        let replacement = populate(ctx, &pattern, &found.bindings)?;
        Ok(remove_unnecessary_parens(ctx, replacement))
    })
}

/// Build a rule from callbacks.
///
/// A match returned by `matcher` is only used when its bindings satisfy
/// `constraints`.
pub fn define_rule<M, R>(matcher: M, rewriter: R, constraints: Constraints) -> Rule
where
    M: Fn(&Context, ExprId) -> Option<Match> + Send + Sync + 'static,
    R: Fn(&mut Context, &Match) -> Result<ExprId, RuleError> + Send + Sync + 'static,
{
    Rule {
        name: None,
        matcher: Arc::new(matcher),
        rewriter: Arc::new(rewriter),
        constraints,
    }
}

/// Build a rule from a match pattern and a rewrite pattern.
///
/// Both patterns are checked up front: every `...` must follow a
/// subscripted template, and every placeholder of `rewrite` must be bound
/// by `matcher`.
pub fn define_pattern_rule(
    matcher: Pattern,
    rewrite: Pattern,
    constraints: Constraints,
) -> Result<Rule, RuleError> {
    validate_match_pattern(&matcher)?;
    validate_rewrite_pattern(&rewrite, &matcher)?;

    Ok(Rule {
        name: None,
        matcher: compile_matcher(matcher, constraints.clone()),
        rewriter: compile_rewriter(rewrite),
        constraints,
    })
}

/// Shorthand for [`define_pattern_rule`] on textual patterns.
pub fn parse_rule(matcher: &str, rewrite: &str, constraints: Constraints) -> Result<Rule, RuleError> {
    define_pattern_rule(Pattern::parse(matcher)?, Pattern::parse(rewrite)?, constraints)
}

pub fn can_apply_rule(rule: &Rule, ctx: &Context, root: ExprId) -> bool {
    rule.find(ctx, root).is_some()
}

/// Rewrite the first match of `rule` below `root` with default options.
///
/// Returns `root` itself when nothing matches.
pub fn apply_rule(rule: &Rule, ctx: &mut Context, root: ExprId) -> Result<ExprId, RuleError> {
    apply_rule_with(rule, ctx, root, &ApplyOptions::default())
}

pub fn apply_rule_with(
    rule: &Rule,
    ctx: &mut Context,
    root: ExprId,
    options: &ApplyOptions,
) -> Result<ExprId, RuleError> {
    let Some((path, found)) = rule.find(ctx, root) else {
        trace!(target: "rewrite", rule = rule.label(), "no_match");
        return Ok(root);
    };

    debug!(
        target: "rewrite",
        rule = rule.label(),
        path = %path_to_string(&path),
        range = ?found.range,
        "rule_matched"
    );

    let mut replacement = (rule.rewriter)(ctx, &found)?;
    if options.fix_minuses {
        replacement = fix_minuses(ctx, replacement);
    }

    let new_node = match found.range.clone() {
        Some(range) => splice(ctx, found.node, range, replacement)?,
        None => replacement,
    };
    let rebuilt = replace_at_path(ctx, root, &path, new_node)?;

    Ok(match options.paren_cleanup {
        ParenCleanup::Redundant => remove_unnecessary_parens(ctx, rebuilt),
        ParenCleanup::Off => rebuilt,
    })
}

/// Replace the operands `range` of `node` with `replacement`.
fn splice(
    ctx: &mut Context,
    node: ExprId,
    range: Range<usize>,
    replacement: ExprId,
) -> Result<ExprId, RuleError> {
    let args = ctx.get(node).args();
    let len = args.len();
    if range.start > range.end || range.end > len {
        return Err(RuleError::InvalidRange {
            start: range.start,
            end: range.end,
            len,
        });
    }
    if range.start == 0 && range.end == len {
        return Ok(replacement);
    }

    let mut new_args = Vec::with_capacity(len - range.len() + 1);
    new_args.extend_from_slice(&args[..range.start]);
    new_args.push(replacement);
    new_args.extend_from_slice(&args[range.end..]);
    Ok(ctx.with_args(node, new_args))
}
