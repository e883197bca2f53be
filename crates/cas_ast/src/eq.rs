//! Structural equality between expression subtrees.
//!
//! Two subtrees are equal when they have the same shape, operators, leaf
//! values and `minus` annotations. Implicit-vs-explicit multiplication is a
//! presentation detail and is ignored. The subtrees may live in different
//! arenas.
//!
//! Stack-safe (iterative implementation using explicit stack).

use crate::{Context, Expr, ExprId};

/// Compare `a` (in `ctx_a`) against `b` (in `ctx_b`).
pub fn nodes_equal(ctx_a: &Context, a: ExprId, ctx_b: &Context, b: ExprId) -> bool {
    let mut stack = vec![(a, b)];

    while let Some((a, b)) = stack.pop() {
        match (ctx_a.get(a), ctx_b.get(b)) {
            (Expr::Number(x), Expr::Number(y)) if x == y => {}
            (Expr::Variable(x), Expr::Variable(y)) if x == y => {}
            (Expr::Placeholder(x), Expr::Placeholder(y)) if x == y => {}
            (Expr::Ellipsis, Expr::Ellipsis) => {}
            (Expr::Paren(x), Expr::Paren(y)) => stack.push((*x, *y)),
            (
                Expr::Apply {
                    op: op_a,
                    args: args_a,
                    notation: n_a,
                },
                Expr::Apply {
                    op: op_b,
                    args: args_b,
                    notation: n_b,
                },
            ) => {
                if op_a != op_b || n_a.minus != n_b.minus || args_a.len() != args_b.len() {
                    return false;
                }
                stack.extend(args_a.iter().copied().zip(args_b.iter().copied()));
            }
            _ => return false,
        }
    }

    true
}

/// Structural equality of two subtrees of the same arena.
#[inline]
pub fn same_tree(ctx: &Context, a: ExprId, b: ExprId) -> bool {
    a == b || nodes_equal(ctx, a, ctx, b)
}
