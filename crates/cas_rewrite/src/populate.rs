//! Instantiation of rewrite patterns.

use crate::bindings::Bindings;
use crate::error::RuleError;
use crate::pattern::{missing_bindings, variable_length_template, Pattern};
use cas_ast::{Context, Expr, ExprId, Notation, Op, Placeholder};
use cas_math::evaluate;

struct Populator<'a> {
    pattern: &'a Context,
    bindings: &'a Bindings,
}

impl<'a> Populator<'a> {
    fn build(&self, ctx: &mut Context, id: ExprId, sub: Option<usize>) -> Result<ExprId, RuleError> {
        match self.pattern.get(id) {
            Expr::Placeholder(p) => {
                let resolved = Placeholder {
                    name: p.name.clone(),
                    subscript: p.subscript.map(|own| sub.unwrap_or(own)),
                };
                self.bindings
                    .lookup(&resolved)
                    .ok_or_else(|| RuleError::UnboundPlaceholder(resolved.to_string()))
            }
            Expr::Ellipsis => Err(RuleError::MalformedPattern(
                "`...` outside a variable-length group".to_string(),
            )),
            Expr::Paren(body) => {
                let body = self.build(ctx, *body, sub)?;
                Ok(ctx.paren(body))
            }
            Expr::Apply { op, args, notation } => {
                if let Some((template, family)) = variable_length_template(self.pattern, id) {
                    return self.expand(ctx, op, *notation, template, family);
                }

                let args = args
                    .iter()
                    .map(|&arg| self.build(ctx, arg, sub))
                    .collect::<Result<Vec<_>, _>>()?;

                if *op == Op::Eval {
                    let [inner] = args[..] else {
                        return Err(RuleError::MalformedPattern(format!(
                            "#eval takes one argument, found {}",
                            args.len()
                        )));
                    };
                    let value = evaluate(ctx, inner)?;
                    return Ok(ctx.rational(value));
                }
                Ok(ctx.apply_with(op.clone(), args, *notation))
            }
            leaf => Ok(ctx.add(leaf.clone())),
        }
    }

    /// Repeat `template` once per bound member of `family`. Inside a sum,
    /// members that were matched through a negation get it back.
    fn expand(
        &self,
        ctx: &mut Context,
        op: &Op,
        notation: Notation,
        template: ExprId,
        family: &str,
    ) -> Result<ExprId, RuleError> {
        let length = self
            .bindings
            .family_len(family)
            .ok_or_else(|| RuleError::UnboundPlaceholder(Placeholder::indexed(family, 0).to_string()))?;

        let mut items = Vec::with_capacity(length);
        for index in 0..length {
            let mut item = self.build(ctx, template, Some(index))?;
            if *op == Op::Add {
                if let Some(minus) = self.bindings.negation(family, index) {
                    item = ctx.apply_with(
                        Op::Neg,
                        vec![item],
                        Notation {
                            implicit: false,
                            minus,
                        },
                    );
                }
            }
            items.push(item);
        }

        Ok(ctx.apply_with(op.clone(), items, notation))
    }
}

/// Build `pattern` into `ctx`, substituting bound values for placeholders,
/// expanding variable-length groups and evaluating `#eval(...)` markers.
///
/// Bound values are shared by id, so `bindings` must refer to nodes of `ctx`.
/// When names are missing from `bindings` the error lists all of them.
pub fn populate(ctx: &mut Context, pattern: &Pattern, bindings: &Bindings) -> Result<ExprId, RuleError> {
    let missing = missing_bindings(pattern, bindings);
    if !missing.is_empty() {
        return Err(RuleError::UnboundPlaceholder(missing.join(", ")));
    }

    let populator = Populator {
        pattern: pattern.context(),
        bindings,
    };
    populator.build(ctx, pattern.root(), None)
}
