//! Exact evaluation of numeric subtrees.
//!
//! Used to resolve `#eval(...)` markers while instantiating rewrite patterns.
//! Every operand must reduce to a number; identifiers and placeholders are
//! reported as [`EvalError::NonNumeric`].

use crate::error::EvalError;
use crate::numeric;
use cas_ast::{Context, DisplayExpr, Expr, ExprId, Op};
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

/// Evaluate `id` to an exact rational.
pub fn evaluate(ctx: &Context, id: ExprId) -> Result<BigRational, EvalError> {
    match ctx.get(id) {
        Expr::Number(n) => Ok(n.clone()),
        Expr::Paren(body) => evaluate(ctx, *body),
        Expr::Variable(_) | Expr::Placeholder(_) => Err(EvalError::NonNumeric(
            DisplayExpr { context: ctx, id }.to_string(),
        )),
        Expr::Ellipsis => Err(EvalError::Unsupported("...".to_string())),
        Expr::Apply { op, args, .. } => evaluate_apply(ctx, op, args),
    }
}

fn arity(name: &str, args: &[ExprId], expected: &'static str, ok: bool) -> Result<(), EvalError> {
    if ok {
        Ok(())
    } else {
        Err(EvalError::Arity {
            name: name.to_string(),
            expected,
            found: args.len(),
        })
    }
}

fn evaluate_apply(ctx: &Context, op: &Op, args: &[ExprId]) -> Result<BigRational, EvalError> {
    match op {
        Op::Add => args.iter().try_fold(BigRational::zero(), |acc, &arg| {
            Ok(acc + evaluate(ctx, arg)?)
        }),
        Op::Mul => args
            .iter()
            .try_fold(BigRational::from_integer(1.into()), |acc, &arg| {
                Ok(acc * evaluate(ctx, arg)?)
            }),
        Op::Div => {
            arity("div", args, "2", args.len() == 2)?;
            let numerator = evaluate(ctx, args[0])?;
            let denominator = evaluate(ctx, args[1])?;
            if denominator.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            Ok(numerator / denominator)
        }
        Op::Neg => {
            arity("neg", args, "1", args.len() == 1)?;
            Ok(-evaluate(ctx, args[0])?)
        }
        Op::Pow => {
            arity("pow", args, "2", args.len() == 2)?;
            numeric::pow(&evaluate(ctx, args[0])?, &evaluate(ctx, args[1])?)
        }
        Op::Abs => {
            arity("abs", args, "1", args.len() == 1)?;
            Ok(numeric::abs(&evaluate(ctx, args[0])?))
        }
        Op::Eval => {
            arity("#eval", args, "1", args.len() == 1)?;
            evaluate(ctx, args[0])
        }
        Op::Eq | Op::Lt | Op::Le | Op::Gt | Op::Ge => Err(EvalError::Unsupported(op.name().to_string())),
        Op::Func(name) => {
            let values = args
                .iter()
                .map(|&arg| evaluate(ctx, arg))
                .collect::<Result<Vec<_>, _>>()?;
            call_function(name, args, &values)
        }
    }
}

fn call_function(
    name: &str,
    args: &[ExprId],
    values: &[BigRational],
) -> Result<BigRational, EvalError> {
    match name {
        "gcd" | "lcm" => {
            arity(name, args, "at least 2", values.len() >= 2)?;
            let combine = if name == "gcd" { numeric::gcd } else { numeric::lcm };
            let (first, rest) = (&values[0], &values[1..]);
            rest.iter()
                .try_fold(first.clone(), |acc, value| combine(&acc, value))
        }
        "nthRoot" => {
            arity(name, args, "1 or 2", matches!(values.len(), 1 | 2))?;
            let index = match values.get(1) {
                Some(index) if index.is_integer() => index
                    .to_integer()
                    .to_i64()
                    .ok_or_else(|| EvalError::NonInteger(name.to_string()))?,
                Some(_) => return Err(EvalError::NonInteger(name.to_string())),
                None => 2,
            };
            numeric::nth_root(&values[0], index)
        }
        "abs" => {
            arity(name, args, "1", values.len() == 1)?;
            Ok(numeric::abs(&values[0]))
        }
        "sign" => {
            arity(name, args, "1", values.len() == 1)?;
            Ok(numeric::sign(&values[0]))
        }
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}
