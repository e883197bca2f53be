//! Merging of nested sums and products.

use crate::query::unwrap_parens;
use cas_ast::traversal::transform_postorder;
use cas_ast::{Context, Expr, ExprId, Op};

/// Splice every sum operand of a sum (and product operand of a product)
/// into its parent, looking through grouping parentheses. The outer node
/// keeps its notation. Parentheses around the whole tree are dropped.
pub fn flatten_operands(ctx: &mut Context, root: ExprId) -> ExprId {
    let rebuilt = transform_postorder(ctx, root, &mut |ctx: &mut Context, id: ExprId| {
        let (op, args) = match ctx.get(id) {
            Expr::Apply {
                op: op @ (Op::Add | Op::Mul),
                args,
                ..
            } => (op.clone(), args.clone()),
            _ => return id,
        };

        let mut merged = Vec::with_capacity(args.len());
        let mut changed = false;
        for arg in args {
            let inner = unwrap_parens(ctx, arg);
            if ctx.get(inner).is_op(&op) {
                merged.extend_from_slice(ctx.get(inner).args());
                changed = true;
            } else {
                merged.push(arg);
            }
        }

        if changed {
            ctx.with_args(id, merged)
        } else {
            id
        }
    });
    unwrap_parens(ctx, rebuilt)
}
