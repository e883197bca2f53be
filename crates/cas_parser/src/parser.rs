use crate::error::ParseError;
use cas_ast::{Context, Expr, ExprId, Notation, Op, Placeholder};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alphanumeric0, digit0, digit1, multispace0, satisfy},
    combinator::{map, opt, recognize, value},
    error::ErrorKind,
    multi::{fold_many0, many0, separated_list0},
    sequence::{delimited, pair, preceded},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;

// Intermediate AST for parsing
#[derive(Debug, Clone)]
enum ParseNode {
    Number(BigRational),
    Variable(String),
    Placeholder(Placeholder),
    Ellipsis,
    Paren(Box<ParseNode>),
    Apply {
        op: Op,
        args: Vec<ParseNode>,
        notation: Notation,
    },
}

impl ParseNode {
    fn apply(op: Op, args: Vec<ParseNode>) -> ParseNode {
        ParseNode::Apply {
            op,
            args,
            notation: Notation::default(),
        }
    }

    fn neg(inner: ParseNode) -> ParseNode {
        ParseNode::apply(Op::Neg, vec![inner])
    }

    fn lower(self, ctx: &mut Context) -> ExprId {
        match self {
            ParseNode::Number(n) => ctx.add(Expr::Number(n)),
            ParseNode::Variable(name) => ctx.add(Expr::Variable(name)),
            ParseNode::Placeholder(p) => ctx.add(Expr::Placeholder(p)),
            ParseNode::Ellipsis => ctx.add(Expr::Ellipsis),
            ParseNode::Paren(body) => {
                let body = body.lower(ctx);
                ctx.add(Expr::Paren(body))
            }
            ParseNode::Apply { op, args, notation } => {
                let args = args.into_iter().map(|a| a.lower(ctx)).collect();
                ctx.add(Expr::Apply { op, args, notation })
            }
        }
    }
}

/// Convert a decimal string to BigRational.
/// Supports: "8.2" → 41/5, ".5" → 1/2, "123" → 123
fn decimal_to_rational(integer_part: &str, fractional_part: &str) -> BigRational {
    let int_val: BigInt = if integer_part.is_empty() {
        BigInt::from(0)
    } else {
        integer_part.parse().unwrap_or_else(|_| BigInt::from(0))
    };

    if fractional_part.is_empty() {
        return BigRational::from_integer(int_val);
    }

    let denominator = num_traits::pow(BigInt::from(10), fractional_part.len());
    let frac_val: BigInt = fractional_part.parse().unwrap_or_else(|_| BigInt::from(0));

    // BigRational::new reduces the fraction
    BigRational::new(int_val * &denominator + frac_val, denominator)
}

fn malformed(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(input, ErrorKind::Verify))
}

// Numeric literals: 123, 8.2, .5
fn parse_number(input: &str) -> IResult<&str, ParseNode> {
    let (rest, int_part) = digit0(input)?;
    let (rest, frac_part) = opt(preceded(tag("."), digit1))(rest)?;
    let frac_part = frac_part.unwrap_or("");

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Digit,
        )));
    }

    Ok((rest, ParseNode::Number(decimal_to_rational(int_part, frac_part))))
}

// Identifiers: a letter followed by letters or digits (x, yz, x2)
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(|c| c.is_ascii_alphabetic()), alphanumeric0))(input)
}

fn parse_variable(input: &str) -> IResult<&str, ParseNode> {
    map(parse_identifier, |s: &str| ParseNode::Variable(s.to_string()))(input)
}

fn parse_ellipsis(input: &str) -> IResult<&str, ParseNode> {
    value(ParseNode::Ellipsis, tag("..."))(input)
}

fn parse_call_args(input: &str) -> IResult<&str, Vec<ParseNode>> {
    delimited(
        tag("("),
        separated_list0(preceded(multispace0, tag(",")), parse_expr),
        preceded(multispace0, tag(")")),
    )(input)
}

// Function calls: the argument list must follow the name directly
fn parse_function(input: &str) -> IResult<&str, ParseNode> {
    let (input, name) = parse_identifier(input)?;
    let (input, args) = parse_call_args(input)?;

    let op = match name {
        "abs" if args.len() == 1 => Op::Abs,
        _ => Op::Func(name.to_string()),
    };
    Ok((input, ParseNode::apply(op, args)))
}

// Placeholders (#a, #b_2) and the evaluation marker #eval(expr)
fn parse_hash(input: &str) -> IResult<&str, ParseNode> {
    let (rest, _) = tag("#")(input)?;
    let (rest, name) = parse_identifier(rest).map_err(|_| malformed(input))?;

    if name == "eval" && rest.starts_with('(') {
        let (rest, args) = parse_call_args(rest)?;
        return Ok((rest, ParseNode::apply(Op::Eval, args)));
    }

    if let Some(after) = rest.strip_prefix('_') {
        let (after, digits) = digit1::<_, nom::error::Error<&str>>(after)
            .map_err(|_| malformed(input))?;
        let subscript: usize = digits.parse().map_err(|_| malformed(input))?;
        return Ok((
            after,
            ParseNode::Placeholder(Placeholder::indexed(name, subscript)),
        ));
    }

    Ok((rest, ParseNode::Placeholder(Placeholder::new(name))))
}

fn parse_parens(input: &str) -> IResult<&str, ParseNode> {
    map(
        delimited(tag("("), parse_expr, preceded(multispace0, tag(")"))),
        |body| ParseNode::Paren(Box::new(body)),
    )(input)
}

fn parse_abs(input: &str) -> IResult<&str, ParseNode> {
    map(
        delimited(tag("|"), parse_expr, preceded(multispace0, tag("|"))),
        |body| ParseNode::apply(Op::Abs, vec![body]),
    )(input)
}

fn parse_atom(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            parse_ellipsis,
            parse_hash,
            parse_number,
            parse_function,
            parse_variable,
            parse_parens,
            parse_abs,
        )),
    )(input)
}

// Power - right associative: 2^3^4 = 2^(3^4)
// The exponent may carry a sign: x^-2, x^-(a+b)
fn parse_power(input: &str) -> IResult<&str, ParseNode> {
    let (input, base) = parse_atom(input)?;
    let (input, exponent) = opt(preceded(preceded(multispace0, tag("^")), parse_exponent))(input)?;

    match exponent {
        Some(exp) => Ok((input, ParseNode::apply(Op::Pow, vec![base, exp]))),
        None => Ok((input, base)),
    }
}

fn parse_exponent(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            map(preceded(tag("-"), parse_exponent), ParseNode::neg),
            preceded(tag("+"), parse_exponent),
            parse_power,
        )),
    )(input)
}

fn parse_unary(input: &str) -> IResult<&str, ParseNode> {
    alt((
        map(preceded(preceded(multispace0, tag("-")), parse_unary), ParseNode::neg),
        preceded(preceded(multispace0, tag("+")), parse_unary),
        parse_power,
    ))(input)
}

// A factor that may follow another one without an operator: 2x, 2 x,
// 3 (x + 1), #a #b. Signs never start a juxtaposed factor.
fn parse_juxtaposed(input: &str) -> IResult<&str, ParseNode> {
    let (input, _) = multispace0(input)?;
    match input.chars().next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '(' || c == '#' => parse_power(input),
        _ => Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Alt))),
    }
}

fn parse_implicit(input: &str) -> IResult<&str, ParseNode> {
    let (input, first) = parse_unary(input)?;
    let (input, rest) = many0(parse_juxtaposed)(input)?;

    if rest.is_empty() {
        return Ok((input, first));
    }

    let mut factors = Vec::with_capacity(rest.len() + 1);
    factors.push(first);
    factors.extend(rest);
    Ok((
        input,
        ParseNode::Apply {
            op: Op::Mul,
            args: factors,
            notation: Notation::IMPLICIT,
        },
    ))
}

// Term - explicit * and /, left associative.
// A run of `*` builds one n-ary product: a * b * c → mul(a, b, c)
fn parse_term(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_implicit(input)?;

    fold_many0(
        pair(
            preceded(multispace0, alt((tag("*"), tag("/")))),
            parse_implicit,
        ),
        move || init.clone(),
        |acc, (op, rhs)| match (op, acc) {
            (
                "*",
                ParseNode::Apply {
                    op: Op::Mul,
                    mut args,
                    notation,
                },
            ) if !notation.implicit => {
                args.push(rhs);
                ParseNode::Apply {
                    op: Op::Mul,
                    args,
                    notation,
                }
            }
            ("*", acc) => ParseNode::apply(Op::Mul, vec![acc, rhs]),
            (_, acc) => ParseNode::apply(Op::Div, vec![acc, rhs]),
        },
    )(input)
}

// Sum - one n-ary add; `a - b` is add(a, neg(b)) with the neg marked as a minus
fn parse_sum(input: &str) -> IResult<&str, ParseNode> {
    let (input, first) = parse_term(input)?;
    let (input, rest) = many0(pair(
        preceded(multispace0, alt((tag("+"), tag("-")))),
        parse_term,
    ))(input)?;

    if rest.is_empty() {
        return Ok((input, first));
    }

    let mut terms = Vec::with_capacity(rest.len() + 1);
    terms.push(first);
    for (op, term) in rest {
        terms.push(if op == "-" {
            ParseNode::Apply {
                op: Op::Neg,
                args: vec![term],
                notation: Notation::MINUS,
            }
        } else {
            term
        });
    }
    Ok((input, ParseNode::apply(Op::Add, terms)))
}

fn parse_relop(input: &str) -> IResult<&str, Op> {
    preceded(
        multispace0,
        alt((
            value(Op::Le, tag("<=")),
            value(Op::Ge, tag(">=")),
            value(Op::Eq, tag("=")),
            value(Op::Lt, tag("<")),
            value(Op::Gt, tag(">")),
        )),
    )(input)
}

// Expr - an optional single relation between two sums
fn parse_expr(input: &str) -> IResult<&str, ParseNode> {
    let (input, lhs) = parse_sum(input)?;
    let (input, relation) = opt(pair(parse_relop, parse_sum))(input)?;

    match relation {
        Some((op, rhs)) => Ok((input, ParseNode::apply(op, vec![lhs, rhs]))),
        None => Ok((input, lhs)),
    }
}

/// Parse an expression or pattern into `ctx`.
pub fn parse(input: &str, ctx: &mut Context) -> Result<ExprId, ParseError> {
    let (remaining, expr_node) = parse_expr(input).map_err(|e| match e {
        nom::Err::Failure(err) if err.code == ErrorKind::Verify => {
            let token = err.input.split_whitespace().next().unwrap_or(err.input);
            ParseError::MalformedPlaceholder(token.to_string())
        }
        other => ParseError::NomError(format!("{}", other)),
    })?;

    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(ParseError::UnconsumedInput(remaining.to_string()));
    }

    Ok(expr_node.lower(ctx))
}
