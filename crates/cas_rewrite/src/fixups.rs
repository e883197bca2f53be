//! Clean-up passes run on rewritten trees.

use crate::query::unwrap_parens;
use cas_ast::traversal::transform_postorder;
use cas_ast::{Context, Expr, ExprId, Notation, Op};

/// Turn a subtraction hidden inside a quotient or product back into a
/// subtraction of the whole term, for terms whose parent is a sum:
/// `1 + -a / b` becomes `1 - a / b` and `1 + a * -b` becomes `1 - a * b`.
///
/// Only negations carrying the `minus` flag are moved.
pub fn fix_minuses(ctx: &mut Context, root: ExprId) -> ExprId {
    fix_node(ctx, root, false)
}

fn fix_node(ctx: &mut Context, id: ExprId, in_sum: bool) -> ExprId {
    let rebuilt = match ctx.get(id).clone() {
        Expr::Apply { op, args, .. } => {
            let child_in_sum = op == Op::Add;
            let new_args: Vec<ExprId> = args
                .iter()
                .map(|&arg| fix_node(ctx, arg, child_in_sum))
                .collect();
            if new_args != args {
                ctx.with_args(id, new_args)
            } else {
                id
            }
        }
        Expr::Paren(body) => {
            let new_body = fix_node(ctx, body, false);
            if new_body != body {
                ctx.paren(new_body)
            } else {
                id
            }
        }
        _ => id,
    };

    if !in_sum {
        return rebuilt;
    }

    let (op, args) = match ctx.get(rebuilt) {
        Expr::Apply {
            op: op @ (Op::Div | Op::Mul),
            args,
            ..
        } => (op.clone(), args.clone()),
        _ => return rebuilt,
    };
    let candidates = if op == Op::Div { &args[..1] } else { &args[..] };
    let Some((position, inner)) = candidates
        .iter()
        .enumerate()
        .find_map(|(i, &arg)| minus_operand(ctx, arg).map(|inner| (i, inner)))
    else {
        return rebuilt;
    };

    let mut new_args = args;
    new_args[position] = inner;
    let term = ctx.with_args(rebuilt, new_args);
    ctx.apply_with(Op::Neg, vec![term], Notation::MINUS)
}

fn minus_operand(ctx: &Context, id: ExprId) -> Option<ExprId> {
    match ctx.get(id) {
        Expr::Apply {
            op: Op::Neg,
            args,
            notation,
        } if notation.minus && args.len() == 1 => Some(args[0]),
        _ => None,
    }
}

fn is_self_delimiting(expr: &Expr) -> bool {
    match expr {
        Expr::Number(_)
        | Expr::Variable(_)
        | Expr::Placeholder(_)
        | Expr::Ellipsis
        | Expr::Paren(_) => true,
        Expr::Apply { op, .. } => *op == Op::Neg || op.is_call(),
    }
}

/// Drop grouping that carries no structure: parentheses around atoms,
/// negations, calls and other parentheses, around function arguments, and
/// around the whole tree.
pub fn remove_unnecessary_parens(ctx: &mut Context, root: ExprId) -> ExprId {
    let rebuilt = transform_postorder(ctx, root, &mut |ctx: &mut Context, id: ExprId| {
        let new_args: Vec<ExprId> = match ctx.get(id) {
            Expr::Paren(body) if is_self_delimiting(ctx.get(*body)) => return *body,
            Expr::Apply { op, args, .. }
                if op.is_call() && args.iter().any(|&arg| matches!(ctx.get(arg), Expr::Paren(_))) =>
            {
                args.iter().map(|&arg| unwrap_parens(ctx, arg)).collect()
            }
            _ => return id,
        };
        ctx.with_args(id, new_args)
    });
    unwrap_parens(ctx, rebuilt)
}
