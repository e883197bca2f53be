//! Structural matching of a [`Pattern`] against one node.
//!
//! Placeholders bind to whole subtrees. A placeholder that is already bound
//! only accepts a structurally equal subtree. Sums and products match as
//! contiguous sub-ranges: at the top level the pattern's operands may cover
//! any run of the input's operands (leftmost run wins); below the top level
//! they must cover all of them. A partial run inside a nested operand would
//! leave a range that the rule application cannot splice, so nested sums and
//! products are anchored on purpose.
//!
//! A `...` operand repeats the operand before it. Every subscripted
//! placeholder in that template takes the repetition index (1, 2, ...),
//! repetitions stop at the first operand that fails, and at least one is
//! required. Inside a sum, a negated operand is unwrapped before it is
//! compared with the template and its sign is recorded in the bindings.

use crate::bindings::{Bindings, Match};
use crate::pattern::{anchor_family, Constraints, Pattern};
use cas_ast::{nodes_equal, Context, Expr, ExprId, Op, Placeholder};
use std::ops::Range;
use tracing::trace;

struct Matcher<'a> {
    pattern: &'a Context,
    input: &'a Context,
    constraints: &'a Constraints,
}

impl<'a> Matcher<'a> {
    /// `sub` overrides the subscript of every subscripted placeholder while a
    /// `...` template is being repeated.
    fn match_node(
        &self,
        pat: ExprId,
        input: ExprId,
        sub: Option<usize>,
        bindings: &mut Bindings,
    ) -> bool {
        match (self.pattern.get(pat), self.input.get(input)) {
            (Expr::Placeholder(p), _) => self.match_placeholder(p, input, sub, bindings),
            (
                Expr::Apply {
                    op: pat_op,
                    args: pat_args,
                    notation: pat_notation,
                },
                Expr::Apply {
                    op,
                    args,
                    notation,
                },
            ) => {
                if pat_op != op || pat_notation.minus != notation.minus {
                    return false;
                }
                if op.is_commutative() {
                    return self
                        .match_sub_array(op, pat_args, args, sub, bindings, true)
                        .is_some();
                }
                pat_args.len() == args.len()
                    && pat_args
                        .iter()
                        .zip(args)
                        .all(|(&p, &i)| self.match_node(p, i, sub, bindings))
            }
            (Expr::Paren(pat_body), Expr::Paren(body)) => {
                self.match_node(*pat_body, *body, sub, bindings)
            }
            (Expr::Number(a), Expr::Number(b)) => a == b,
            (Expr::Variable(a), Expr::Variable(b)) => a == b,
            (Expr::Ellipsis, Expr::Ellipsis) => true,
            _ => false,
        }
    }

    fn match_placeholder(
        &self,
        p: &Placeholder,
        input: ExprId,
        sub: Option<usize>,
        bindings: &mut Bindings,
    ) -> bool {
        let index = p.subscript.map(|own| sub.unwrap_or(own));
        let bound = match index {
            Some(i) => bindings.get_indexed(&p.name, i),
            None => bindings.get(&p.name),
        };

        if let Some(previous) = bound {
            return nodes_equal(self.input, previous, self.input, input);
        }
        if !self.constraints.allows(&p.name, self.input, input) {
            return false;
        }

        match index {
            Some(i) => bindings.insert_indexed(&p.name, i, input),
            None => bindings.insert(&p.name, input),
        }
        true
    }

    /// Match the operands `pat_args` against a contiguous run of `args`.
    ///
    /// Each offset is tried on a copy of `bindings`, committed only when the
    /// whole run matches. With `anchored` the run must cover every operand.
    fn match_sub_array(
        &self,
        op: &Op,
        pat_args: &[ExprId],
        args: &[ExprId],
        sub: Option<usize>,
        bindings: &mut Bindings,
        anchored: bool,
    ) -> Option<Range<usize>> {
        if pat_args.len() > args.len() {
            return None;
        }
        let last_offset = if anchored {
            0
        } else {
            args.len() - pat_args.len()
        };

        for start in 0..=last_offset {
            let mut attempt = bindings.clone();
            match self.match_run(op, pat_args, args, start, sub, &mut attempt) {
                Some(end) if !anchored || end == args.len() => {
                    *bindings = attempt;
                    return Some(start..end);
                }
                _ => trace!(target: "rewrite", op = op.name(), offset = start, "offset_rejected"),
            }
        }
        None
    }

    /// End of the run on success.
    fn match_run(
        &self,
        op: &Op,
        pat_args: &[ExprId],
        args: &[ExprId],
        start: usize,
        sub: Option<usize>,
        bindings: &mut Bindings,
    ) -> Option<usize> {
        let mut j = start;
        for (k, &pat_arg) in pat_args.iter().enumerate() {
            if j >= args.len() {
                return None;
            }
            if matches!(self.pattern.get(pat_arg), Expr::Ellipsis) {
                let template = *pat_args.get(k.checked_sub(1)?)?;
                let consumed = self.match_ellipsis(op, template, &args[j..], bindings);
                if consumed == 0 {
                    return None;
                }
                j += consumed;
            } else {
                if !self.match_node(pat_arg, args[j], sub, bindings) {
                    return None;
                }
                j += 1;
            }
        }
        Some(j)
    }

    /// Number of leading `args` matched by repetitions of `template`.
    fn match_ellipsis(
        &self,
        op: &Op,
        template: ExprId,
        args: &[ExprId],
        bindings: &mut Bindings,
    ) -> usize {
        let family = anchor_family(self.pattern, template);
        let mut count = 0;

        for (i, &arg) in args.iter().enumerate() {
            let repetition = i + 1;
            let (target, sign) = match self.input.get(arg) {
                Expr::Apply {
                    op: Op::Neg,
                    args: inner,
                    notation,
                } if *op == Op::Add && inner.len() == 1 => (inner[0], Some(notation.minus)),
                _ => (arg, None),
            };

            let mut attempt = bindings.clone();
            if !self.match_node(template, target, Some(repetition), &mut attempt) {
                break;
            }
            if let (Some(minus), Some(family)) = (sign, family) {
                attempt.record_negation(family, repetition, minus);
            }
            *bindings = attempt;
            count += 1;
        }

        count
    }
}

/// Match `pattern` against the node `input` of `ctx`.
///
/// When both are sums (or both products) the pattern may match a contiguous
/// run of the input's operands; `range` is set when that run is not the
/// whole operand list.
pub fn match_node(
    pattern: &Pattern,
    ctx: &Context,
    input: ExprId,
    constraints: &Constraints,
) -> Option<Match> {
    let matcher = Matcher {
        pattern: pattern.context(),
        input: ctx,
        constraints,
    };
    let mut bindings = Bindings::new();

    match (pattern.context().get(pattern.root()), ctx.get(input)) {
        (
            Expr::Apply {
                op: pat_op,
                args: pat_args,
                notation: pat_notation,
            },
            Expr::Apply { op, args, notation },
        ) if op.is_commutative() && pat_op == op && pat_notation.minus == notation.minus => {
            let range = matcher.match_sub_array(op, pat_args, args, None, &mut bindings, false)?;
            let partial = range.start > 0 || range.end < args.len();
            Some(Match {
                node: input,
                bindings,
                range: partial.then_some(range),
            })
        }
        _ => matcher
            .match_node(pattern.root(), input, None, &mut bindings)
            .then(|| Match::whole(input, bindings)),
    }
}
