//! Canonical AST traversal utilities.
//!
//! # Functions
//!
//! - [`children`]: Child ids of a node in argument order
//! - [`find_postorder`]: First post-order hit of a search function, with its path
//! - [`replace_at_path`]: Rebuild a tree with one occurrence replaced
//! - [`transform_postorder`]: Bottom-up rebuild through a node mapping
//! - [`collect_placeholders`]: Placeholders of a subtree in pre-order
//!
//! Searching is iterative so deep trees cannot overflow the
//! stack. Rebuilding recurses only along the rebuilt structure.

use crate::error::AstError;
use crate::expr_path::ExprPath;
use crate::expression::{Context, Expr, ExprId, Placeholder};

/// Child ids of a node, in argument order.
#[inline]
pub fn children(expr: &Expr) -> &[ExprId] {
    match expr {
        Expr::Apply { args, .. } => args,
        Expr::Paren(body) => std::slice::from_ref(body),
        Expr::Number(_) | Expr::Variable(_) | Expr::Placeholder(_) | Expr::Ellipsis => &[],
    }
}

/// Visit every node of `root` in post-order (children left to right, then
/// the parent) and return the first value produced by `visit`, together with
/// the path of the node that produced it.
///
/// Traversal stops at the first hit, so the innermost-leftmost node wins.
pub fn find_postorder<T, F>(ctx: &Context, root: ExprId, mut visit: F) -> Option<(ExprPath, T)>
where
    F: FnMut(ExprId) -> Option<T>,
{
    // (node, path, children already pushed)
    let mut stack: Vec<(ExprId, ExprPath, bool)> = vec![(root, Vec::new(), false)];

    while let Some((id, path, expanded)) = stack.pop() {
        if expanded {
            if let Some(hit) = visit(id) {
                return Some((path, hit));
            }
            continue;
        }

        let kids = children(ctx.get(id));
        stack.push((id, path.clone(), true));
        for (index, &child) in kids.iter().enumerate().rev() {
            let mut child_path = path.clone();
            child_path.push(index);
            stack.push((child, child_path, false));
        }
    }

    None
}

/// Node at `path` below `root`.
pub fn node_at_path(ctx: &Context, root: ExprId, path: &[usize]) -> Result<ExprId, AstError> {
    let mut current = root;
    for (step, &index) in path.iter().enumerate() {
        current = *children(ctx.get(current))
            .get(index)
            .ok_or(AstError::InvalidPath { step, index })?;
    }
    Ok(current)
}

/// Rebuild `root` with the node at `path` replaced by `replacement`.
///
/// Only the nodes along the path are rebuilt; every other subtree is shared.
pub fn replace_at_path(
    ctx: &mut Context,
    root: ExprId,
    path: &[usize],
    replacement: ExprId,
) -> Result<ExprId, AstError> {
    rebuild_along(ctx, root, path, 0, replacement)
}

fn rebuild_along(
    ctx: &mut Context,
    id: ExprId,
    path: &[usize],
    step: usize,
    replacement: ExprId,
) -> Result<ExprId, AstError> {
    let Some(&index) = path.get(step) else {
        return Ok(replacement);
    };

    match ctx.get(id).clone() {
        Expr::Apply { mut args, .. } => {
            let child = *args.get(index).ok_or(AstError::InvalidPath { step, index })?;
            args[index] = rebuild_along(ctx, child, path, step + 1, replacement)?;
            Ok(ctx.with_args(id, args))
        }
        Expr::Paren(body) if index == 0 => {
            let body = rebuild_along(ctx, body, path, step + 1, replacement)?;
            Ok(ctx.paren(body))
        }
        _ => Err(AstError::InvalidPath { step, index }),
    }
}

/// Rebuild `root` bottom-up, passing every node (after its children were
/// rebuilt) through `f`. Nodes whose children are unchanged keep their id
/// before being handed to `f`.
pub fn transform_postorder<F>(ctx: &mut Context, root: ExprId, f: &mut F) -> ExprId
where
    F: FnMut(&mut Context, ExprId) -> ExprId,
{
    let rebuilt = match ctx.get(root).clone() {
        Expr::Apply { args, .. } => {
            let new_args: Vec<ExprId> = args
                .iter()
                .map(|&arg| transform_postorder(ctx, arg, f))
                .collect();
            if new_args != args {
                ctx.with_args(root, new_args)
            } else {
                root
            }
        }
        Expr::Paren(body) => {
            let new_body = transform_postorder(ctx, body, f);
            if new_body != body {
                ctx.paren(new_body)
            } else {
                root
            }
        }
        _ => root,
    };
    f(ctx, rebuilt)
}

/// All placeholders of a subtree, in pre-order (left to right).
pub fn collect_placeholders(ctx: &Context, root: ExprId) -> Vec<&Placeholder> {
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        let node = ctx.get(id);
        if let Expr::Placeholder(p) = node {
            found.push(p);
        }
        stack.extend(children(node).iter().rev());
    }

    found
}
