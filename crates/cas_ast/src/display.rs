//! Textual rendering of expressions.
//!
//! The output re-parses to the same tree (modulo negative number literals,
//! which re-parse as negations): nested sums inside sums and products inside
//! products are grouped even when the tree has no `Paren` node there.

use crate::expression::{Context, Expr, ExprId, Op};
use num_traits::Signed;
use std::fmt;

pub struct DisplayExpr<'a> {
    pub context: &'a Context,
    pub id: ExprId,
}

impl<'a> DisplayExpr<'a> {
    pub fn new(context: &'a Context, id: ExprId) -> Self {
        DisplayExpr { context, id }
    }

    fn child(&self, id: ExprId) -> DisplayExpr<'a> {
        DisplayExpr {
            context: self.context,
            id,
        }
    }

    fn write_grouped(&self, f: &mut fmt::Formatter<'_>, id: ExprId, group: bool) -> fmt::Result {
        if group {
            write!(f, "({})", self.child(id))
        } else {
            write!(f, "{}", self.child(id))
        }
    }

    fn write_args(&self, f: &mut fmt::Formatter<'_>, args: &[ExprId]) -> fmt::Result {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.child(*arg))?;
        }
        Ok(())
    }
}

/// Where a child is printed, for deciding whether it needs grouping.
#[derive(Clone, Copy)]
enum Slot {
    Term,
    Factor { implicit: bool, first: bool },
    Numerator,
    Denominator,
    Base,
    Exponent,
    Negated,
    Relation,
}

fn is_negative_number(expr: &Expr) -> bool {
    matches!(expr, Expr::Number(n) if n.is_negative())
}

fn needs_group(slot: Slot, child: &Expr) -> bool {
    let op = match child {
        Expr::Apply { op, .. } => Some(op),
        _ => None,
    };
    let loose = matches!(op, Some(op) if op.is_relation());
    match slot {
        Slot::Term => loose || matches!(op, Some(Op::Add)),
        Slot::Factor { implicit, first } => {
            if loose || matches!(op, Some(Op::Add)) {
                return true;
            }
            match child {
                Expr::Apply {
                    op: Op::Mul,
                    notation,
                    ..
                } => implicit || !notation.implicit,
                Expr::Apply { op: Op::Div, .. } => implicit || !first,
                Expr::Apply { op: Op::Neg, .. } => implicit && !first,
                other => implicit && !first && is_negative_number(other),
            }
        }
        Slot::Numerator => loose || matches!(op, Some(Op::Add)),
        Slot::Denominator => loose || matches!(op, Some(Op::Add | Op::Mul | Op::Div)),
        Slot::Base => !child.is_atom(),
        Slot::Exponent => loose || matches!(op, Some(Op::Add | Op::Mul | Op::Div)),
        Slot::Negated => {
            loose || matches!(op, Some(Op::Add | Op::Mul | Op::Div)) || is_negative_number(child)
        }
        Slot::Relation => loose,
    }
}

impl<'a> fmt::Display for DisplayExpr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.context;
        match ctx.get(self.id) {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Placeholder(p) => write!(f, "{}", p),
            Expr::Ellipsis => write!(f, "..."),
            Expr::Paren(body) => write!(f, "({})", self.child(*body)),
            Expr::Apply { op, args, notation } => match op {
                Op::Add => {
                    for (i, term) in args.iter().enumerate() {
                        let node = ctx.get(*term);
                        match node {
                            Expr::Apply {
                                op: Op::Neg,
                                args: inner,
                                notation,
                            } if i > 0 && notation.minus && inner.len() == 1 => {
                                write!(f, " - ")?;
                                let inner_node = ctx.get(inner[0]);
                                self.write_grouped(f, inner[0], needs_group(Slot::Term, inner_node))?;
                            }
                            _ => {
                                if i > 0 {
                                    write!(f, " + ")?;
                                }
                                self.write_grouped(f, *term, needs_group(Slot::Term, node))?;
                            }
                        }
                    }
                    Ok(())
                }
                Op::Mul => {
                    let sep = if notation.implicit { " " } else { " * " };
                    for (i, factor) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, "{}", sep)?;
                        }
                        let slot = Slot::Factor {
                            implicit: notation.implicit,
                            first: i == 0,
                        };
                        self.write_grouped(f, *factor, needs_group(slot, ctx.get(*factor)))?;
                    }
                    Ok(())
                }
                Op::Div if args.len() == 2 => {
                    self.write_grouped(f, args[0], needs_group(Slot::Numerator, ctx.get(args[0])))?;
                    write!(f, " / ")?;
                    self.write_grouped(f, args[1], needs_group(Slot::Denominator, ctx.get(args[1])))
                }
                Op::Pow if args.len() == 2 => {
                    self.write_grouped(f, args[0], needs_group(Slot::Base, ctx.get(args[0])))?;
                    write!(f, "^")?;
                    self.write_grouped(f, args[1], needs_group(Slot::Exponent, ctx.get(args[1])))
                }
                Op::Neg if args.len() == 1 => {
                    write!(f, "-")?;
                    self.write_grouped(f, args[0], needs_group(Slot::Negated, ctx.get(args[0])))
                }
                Op::Abs if args.len() == 1 => write!(f, "|{}|", self.child(args[0])),
                Op::Eq | Op::Lt | Op::Le | Op::Gt | Op::Ge if args.len() == 2 => {
                    let symbol = match op {
                        Op::Eq => "=",
                        Op::Lt => "<",
                        Op::Le => "<=",
                        Op::Gt => ">",
                        _ => ">=",
                    };
                    self.write_grouped(f, args[0], needs_group(Slot::Relation, ctx.get(args[0])))?;
                    write!(f, " {} ", symbol)?;
                    self.write_grouped(f, args[1], needs_group(Slot::Relation, ctx.get(args[1])))
                }
                Op::Eval => {
                    write!(f, "#eval(")?;
                    self.write_args(f, args)?;
                    write!(f, ")")
                }
                // Malformed arities fall back to call syntax.
                other => {
                    write!(f, "{}(", other.name())?;
                    self.write_args(f, args)?;
                    write!(f, ")")
                }
            },
        }
    }
}
