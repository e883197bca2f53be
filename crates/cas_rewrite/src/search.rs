use crate::bindings::Match;
use cas_ast::traversal::find_postorder;
use cas_ast::{Context, ExprId, ExprPath};

/// Run `matcher` on every node below `root`, children before parents, and
/// return the first match with the path of the matched node.
///
/// Inner nodes are tried first, so nested occurrences are rewritten from the
/// inside out.
pub fn search<F>(ctx: &Context, root: ExprId, matcher: F) -> Option<(ExprPath, Match)>
where
    F: Fn(&Context, ExprId) -> Option<Match>,
{
    find_postorder(ctx, root, |id| matcher(ctx, id))
}
