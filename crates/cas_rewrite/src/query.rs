//! Node predicates for constraints and callback rules.
//!
//! All predicates look at the node itself; wrap the id with
//! [`unwrap_parens`] first to see through grouping.

use cas_ast::{Context, Expr, ExprId, Op};
use num_rational::BigRational;

#[inline]
fn is_op(ctx: &Context, id: ExprId, op: &Op) -> bool {
    ctx.get(id).is_op(op)
}

pub fn is_add(ctx: &Context, id: ExprId) -> bool {
    is_op(ctx, id, &Op::Add)
}

pub fn is_mul(ctx: &Context, id: ExprId) -> bool {
    is_op(ctx, id, &Op::Mul)
}

pub fn is_neg(ctx: &Context, id: ExprId) -> bool {
    is_op(ctx, id, &Op::Neg)
}

pub fn is_div(ctx: &Context, id: ExprId) -> bool {
    is_op(ctx, id, &Op::Div)
}

pub fn is_pow(ctx: &Context, id: ExprId) -> bool {
    is_op(ctx, id, &Op::Pow)
}

pub fn is_variable(ctx: &Context, id: ExprId) -> bool {
    matches!(ctx.get(id), Expr::Variable(_))
}

/// A number literal, possibly negated (`3`, `-3`, `--3`).
pub fn is_number(ctx: &Context, id: ExprId) -> bool {
    number_value(ctx, id).is_some()
}

/// Value of a (possibly negated) number literal.
pub fn number_value(ctx: &Context, id: ExprId) -> Option<BigRational> {
    match ctx.get(id) {
        Expr::Number(n) => Some(n.clone()),
        Expr::Apply {
            op: Op::Neg, args, ..
        } if args.len() == 1 => number_value(ctx, args[0]).map(|n| -n),
        _ => None,
    }
}

/// `x` or `x^n` with a numeric exponent.
pub fn is_variable_factor(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Variable(_) => true,
        Expr::Apply {
            op: Op::Pow, args, ..
        } if args.len() == 2 => is_variable(ctx, args[0]) && is_number(ctx, args[1]),
        _ => false,
    }
}

/// A monomial: `x^2`, `3 x y`, `-2 x^3`.
pub fn is_polynomial_term(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Apply {
            op: Op::Neg, args, ..
        } if args.len() == 1 => is_polynomial_term(ctx, args[0]),
        Expr::Apply {
            op: Op::Mul, args, ..
        } => {
            let factors = match args.split_first() {
                Some((&first, rest)) if is_number(ctx, first) => rest,
                _ => args.as_slice(),
            };
            !factors.is_empty() && factors.iter().all(|&f| is_variable_factor(ctx, f))
        }
        _ => is_variable_factor(ctx, id),
    }
}

/// Strip any number of grouping parentheses.
pub fn unwrap_parens(ctx: &Context, mut id: ExprId) -> ExprId {
    while let Expr::Paren(body) = ctx.get(id) {
        id = *body;
    }
    id
}

/// Maximal runs of at least two consecutive `args` accepted by `pred`.
///
/// ```ignore
/// // 1 + 2 + x + 3 + 4 + 5 -> [0..2, 3..6]
/// let runs = get_ranges(ctx.get(sum).args(), |id| is_number(&ctx, id));
/// ```
pub fn get_ranges<F>(args: &[ExprId], mut pred: F) -> Vec<std::ops::Range<usize>>
where
    F: FnMut(ExprId) -> bool,
{
    let mut ranges = Vec::new();
    let mut start = None;

    for (i, &arg) in args.iter().enumerate() {
        match (pred(arg), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s > 1 {
                    ranges.push(s..i);
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if args.len() - s > 1 {
            ranges.push(s..args.len());
        }
    }

    ranges
}
