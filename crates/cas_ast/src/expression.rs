use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;
use std::fmt;

/// Index of a node inside a [`Context`].
///
/// Ids are only meaningful for the arena that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operator of an [`Expr::Apply`] node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Mul,
    Div,
    Pow,
    Neg,
    Abs,
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    /// Deferred evaluation marker, written `#eval(expr)`.
    Eval,
    /// Named function call such as `gcd(a, b)` or `nthRoot(x, 3)`.
    Func(String),
}

impl Op {
    /// Operators whose argument lists may be matched as contiguous sub-ranges.
    #[inline]
    pub fn is_commutative(&self) -> bool {
        matches!(self, Op::Add | Op::Mul)
    }

    #[inline]
    pub fn is_relation(&self) -> bool {
        matches!(self, Op::Eq | Op::Lt | Op::Le | Op::Gt | Op::Ge)
    }

    /// Operators printed in call syntax (`name(args)`, `|x|`, `#eval(x)`).
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, Op::Abs | Op::Eval | Op::Func(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Op::Add => "add",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Pow => "pow",
            Op::Neg => "neg",
            Op::Abs => "abs",
            Op::Eq => "eq",
            Op::Lt => "lt",
            Op::Le => "le",
            Op::Gt => "gt",
            Op::Ge => "ge",
            Op::Eval => "eval",
            Op::Func(name) => name,
        }
    }
}

/// Annotation flags carried by an [`Expr::Apply`] node.
///
/// `implicit` is presentation-only (juxtaposed multiplication) and never
/// affects matching. `minus` marks a negation that came from binary
/// subtraction; it is part of the node for matching purposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Notation {
    pub implicit: bool,
    pub minus: bool,
}

impl Notation {
    pub const IMPLICIT: Notation = Notation {
        implicit: true,
        minus: false,
    };
    pub const MINUS: Notation = Notation {
        implicit: false,
        minus: true,
    };
}

/// A named wildcard. `#a` has no subscript, `#a_2` is element 2 of family `a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub name: String,
    pub subscript: Option<usize>,
}

impl Placeholder {
    pub fn new(name: impl Into<String>) -> Self {
        Placeholder {
            name: name.into(),
            subscript: None,
        }
    }

    pub fn indexed(name: impl Into<String>, subscript: usize) -> Self {
        Placeholder {
            name: name.into(),
            subscript: Some(subscript),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subscript {
            Some(sub) => write!(f, "#{}_{}", self.name, sub),
            None => write!(f, "#{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(BigRational),
    Variable(String),
    Apply {
        op: Op,
        args: Vec<ExprId>,
        notation: Notation,
    },
    Paren(ExprId),
    Placeholder(Placeholder),
    Ellipsis,
}

impl Expr {
    pub fn apply(op: Op, args: Vec<ExprId>) -> Expr {
        Expr::Apply {
            op,
            args,
            notation: Notation::default(),
        }
    }

    /// Operator of an `Apply` node.
    #[inline]
    pub fn op(&self) -> Option<&Op> {
        match self {
            Expr::Apply { op, .. } => Some(op),
            _ => None,
        }
    }

    /// Arguments of an `Apply` node; empty for everything else.
    #[inline]
    pub fn args(&self) -> &[ExprId] {
        match self {
            Expr::Apply { args, .. } => args,
            _ => &[],
        }
    }

    #[inline]
    pub fn is_op(&self, wanted: &Op) -> bool {
        self.op() == Some(wanted)
    }

    /// Leaves that never need grouping when printed.
    pub fn is_atom(&self) -> bool {
        match self {
            Expr::Number(n) => !n.is_negative(),
            Expr::Variable(_) | Expr::Placeholder(_) | Expr::Ellipsis | Expr::Paren(_) => true,
            Expr::Apply { op, .. } => op.is_call(),
        }
    }
}

/// Append-only arena of expression nodes.
///
/// Nodes are immutable once added; rewriting builds new nodes and shares
/// untouched subtrees by id.
#[derive(Debug, Clone, Default)]
pub struct Context {
    nodes: Vec<Expr>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr);
        id
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn num(&mut self, n: i64) -> ExprId {
        self.add(Expr::Number(BigRational::from_integer(BigInt::from(n))))
    }

    pub fn rational(&mut self, n: BigRational) -> ExprId {
        self.add(Expr::Number(n))
    }

    pub fn var(&mut self, name: &str) -> ExprId {
        self.add(Expr::Variable(name.to_string()))
    }

    pub fn placeholder(&mut self, placeholder: Placeholder) -> ExprId {
        self.add(Expr::Placeholder(placeholder))
    }

    pub fn apply(&mut self, op: Op, args: Vec<ExprId>) -> ExprId {
        self.add(Expr::apply(op, args))
    }

    pub fn apply_with(&mut self, op: Op, args: Vec<ExprId>, notation: Notation) -> ExprId {
        self.add(Expr::Apply { op, args, notation })
    }

    pub fn neg(&mut self, inner: ExprId) -> ExprId {
        self.apply(Op::Neg, vec![inner])
    }

    pub fn paren(&mut self, body: ExprId) -> ExprId {
        self.add(Expr::Paren(body))
    }

    pub fn call(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        self.apply(Op::Func(name.to_string()), args)
    }

    /// Deep-copy a subtree from another arena into this one.
    pub fn import(&mut self, source: &Context, id: ExprId) -> ExprId {
        match source.get(id) {
            Expr::Apply { op, args, notation } => {
                let args = args.iter().map(|&arg| self.import(source, arg)).collect();
                self.add(Expr::Apply {
                    op: op.clone(),
                    args,
                    notation: *notation,
                })
            }
            Expr::Paren(body) => {
                let body = self.import(source, *body);
                self.add(Expr::Paren(body))
            }
            leaf => self.add(leaf.clone()),
        }
    }

    /// Rebuild `id` with new arguments, keeping operator and notation.
    ///
    /// Returns `id` itself when the node is not an `Apply`.
    pub fn with_args(&mut self, id: ExprId, new_args: Vec<ExprId>) -> ExprId {
        match self.get(id) {
            Expr::Apply { op, notation, .. } => {
                let op = op.clone();
                let notation = *notation;
                self.add(Expr::Apply {
                    op,
                    args: new_args,
                    notation,
                })
            }
            _ => id,
        }
    }
}
