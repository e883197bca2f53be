use cas_ast::{Context, ExprId, Notation, Op};
use proptest::prelude::*;

/// Owned expression shape, lowered into a `Context` by [`to_context`].
#[derive(Debug, Clone)]
pub enum RecExpr {
    Num(i64),
    Var(String),
    Add(Vec<RecExpr>),
    Sub(Box<RecExpr>, Box<RecExpr>),
    Mul(Vec<RecExpr>),
    Div(Box<RecExpr>, Box<RecExpr>),
    Pow(Box<RecExpr>, Box<RecExpr>),
    Neg(Box<RecExpr>),
    Call(String, Vec<RecExpr>),
}

pub fn arb_recursive_expr() -> impl Strategy<Value = RecExpr> {
    let leaf = prop_oneof![
        // Small non-negative integers; negatives come from Neg
        (0i64..10).prop_map(RecExpr::Num),
        "[a-z]".prop_map(RecExpr::Var),
    ];

    leaf.prop_recursive(
        4,  // levels deep
        48, // max size
        4,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 2..4).prop_map(RecExpr::Add),
                (inner.clone(), inner.clone())
                    .prop_map(|(l, r)| RecExpr::Sub(Box::new(l), Box::new(r))),
                prop::collection::vec(inner.clone(), 2..4).prop_map(RecExpr::Mul),
                (inner.clone(), inner.clone())
                    .prop_map(|(l, r)| RecExpr::Div(Box::new(l), Box::new(r))),
                (inner.clone(), inner.clone())
                    .prop_map(|(l, r)| RecExpr::Pow(Box::new(l), Box::new(r))),
                inner.clone().prop_map(|e| RecExpr::Neg(Box::new(e))),
                (prop_oneof![Just("f"), Just("gcd")], prop::collection::vec(inner, 1..3))
                    .prop_map(|(name, args)| RecExpr::Call(name.to_string(), args)),
            ]
        },
    )
}

fn lower(ctx: &mut Context, re: &RecExpr) -> ExprId {
    match re {
        RecExpr::Num(n) => ctx.num(*n),
        RecExpr::Var(name) => ctx.var(name),
        RecExpr::Add(items) => {
            let args = items.iter().map(|item| lower(ctx, item)).collect();
            ctx.apply(Op::Add, args)
        }
        RecExpr::Sub(l, r) => {
            let l = lower(ctx, l);
            let r = lower(ctx, r);
            let minus = ctx.apply_with(Op::Neg, vec![r], Notation::MINUS);
            ctx.apply(Op::Add, vec![l, minus])
        }
        RecExpr::Mul(items) => {
            let args = items.iter().map(|item| lower(ctx, item)).collect();
            ctx.apply(Op::Mul, args)
        }
        RecExpr::Div(l, r) => {
            let l = lower(ctx, l);
            let r = lower(ctx, r);
            ctx.apply(Op::Div, vec![l, r])
        }
        RecExpr::Pow(l, r) => {
            let l = lower(ctx, l);
            let r = lower(ctx, r);
            ctx.apply(Op::Pow, vec![l, r])
        }
        RecExpr::Neg(e) => {
            let e = lower(ctx, e);
            ctx.neg(e)
        }
        RecExpr::Call(name, items) => {
            let args = items.iter().map(|item| lower(ctx, item)).collect();
            ctx.call(name, args)
        }
    }
}

pub fn to_context(re: RecExpr) -> (Context, ExprId) {
    let mut ctx = Context::new();
    let id = lower(&mut ctx, &re);
    (ctx, id)
}
