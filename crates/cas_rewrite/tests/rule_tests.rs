//! End-to-end rule behavior on parsed expressions.

use cas_ast::{Context, DisplayExpr, Expr, ExprId, Notation, Op};
use cas_math::{evaluate, EvalError};
use cas_rewrite::query::{is_add, is_number, is_variable_factor, unwrap_parens};
use cas_rewrite::{
    apply_rule, can_apply_rule, compile_matcher, define_rule, match_node, parse_rule,
    Constraints, Match, Pattern, Rule, RuleError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn display(ctx: &Context, id: ExprId) -> String {
    format!("{}", DisplayExpr { context: ctx, id })
}

fn rewrite(rule: &Rule, input: &str) -> String {
    init_tracing();
    let mut ctx = Context::new();
    let root = cas_parser::parse(input, &mut ctx).expect("parse failed");
    let out = apply_rule(rule, &mut ctx, root).expect("rewrite failed");
    display(&ctx, out)
}

fn can_apply(rule: &Rule, input: &str) -> bool {
    let mut ctx = Context::new();
    let root = cas_parser::parse(input, &mut ctx).expect("parse failed");
    can_apply_rule(rule, &ctx, root)
}

fn numbers(names: &[&str]) -> Constraints {
    names
        .iter()
        .fold(Constraints::new(), |c, name| c.with(name, is_number))
}

// ========== pattern rules ==========

#[test]
fn add_zero() {
    let rule = parse_rule("#a + 0", "#a", Constraints::new()).unwrap();

    for (input, expected) in [
        ("2 * (x + 0)", "2 * x"),
        ("(x + 0) + 0", "x + 0"),
        ("1 + x + 0 + 2", "1 + x + 2"),
        ("((x + 0) + 0) + 0", "(x + 0) + 0"),
        ("(x + 0) + (x + 0)", "x + (x + 0)"),
        ("x + 0 + x + 0", "x + x + 0"),
        ("x^(x + 0)", "x^x"),
    ] {
        assert_eq!(rewrite(&rule, input), expected, "input: {}", input);
    }
}

#[test]
fn double_to_sum() {
    let rule = parse_rule("2 #a", "#a + #a", Constraints::new()).unwrap();
    assert_eq!(rewrite(&rule, "1 + 2 x + 2"), "1 + (x + x) + 2");
    assert_eq!(rewrite(&rule, "1 * 2 x * 3"), "1 * (x + x) * 3");
}

#[test]
fn sum_to_double() {
    let rule = parse_rule("#a + #a", "2 #a", Constraints::new()).unwrap();
    assert_eq!(rewrite(&rule, "x + x"), "2 x");
    assert!(!can_apply(&rule, "x + y"));
}

#[test]
fn constraint_rejects_binding() {
    let rule = parse_rule("#a + #a", "2 #a", numbers(&["a"])).unwrap();
    assert!(can_apply(&rule, "3 + 3"));
    assert!(!can_apply(&rule, "x + x"));
}

#[test]
fn collect_like_terms() {
    let rule = parse_rule("#a #x + #b #x", "(#a + #b) #x", numbers(&["a", "b"])).unwrap();
    assert_eq!(rewrite(&rule, "2 x + 3 x"), "(2 + 3) x");
    assert!(!can_apply(&rule, "(a + b) x"));
}

#[test]
fn subtracting_a_negation() {
    let rule = parse_rule("#a - -#b", "#a + #b", Constraints::new()).unwrap();
    assert_eq!(rewrite(&rule, "2 - -1"), "2 + 1");
}

#[test]
fn multiplying_by_minus_one() {
    let rule = parse_rule("#a * -1", "-#a", Constraints::new()).unwrap();
    assert_eq!(rewrite(&rule, "2x * 2 * -1"), "2 x * -2");
}

#[test]
fn no_match_is_identity() {
    let rule = parse_rule("#a + 0", "#a", Constraints::new()).unwrap();
    let mut ctx = Context::new();
    let root = cas_parser::parse("x * 2 + y", &mut ctx).unwrap();

    assert!(!can_apply_rule(&rule, &ctx, root));
    assert_eq!(apply_rule(&rule, &mut ctx, root), Ok(root));
}

// ========== variable-length patterns ==========

#[test]
fn evaluate_numeric_run() {
    let rule = parse_rule("#a_0 + ...", "#eval(#a_0 + ...)", numbers(&["a"])).unwrap();
    assert_eq!(rewrite(&rule, "1 + 2 + 3 + 4"), "10");
    assert_eq!(rewrite(&rule, "x + 1 + 2 + y"), "x + 3 + y");
    assert_eq!(rewrite(&rule, "1 - 2 + 3"), "2");
}

#[test]
fn evaluate_numeric_product() {
    let rule = parse_rule("#a_0 * ...", "#eval(#a_0 * ...)", numbers(&["a"])).unwrap();
    assert_eq!(rewrite(&rule, "2 * 3 * x"), "6 * x");
}

#[test]
fn add_fractions_with_common_denominator() {
    let rule = parse_rule("#a_0 / #b + ...", "(#a_0 + ...) / #b", Constraints::new()).unwrap();
    assert_eq!(rewrite(&rule, "2/3 - 1/3"), "(2 - 1) / 3");
    assert_eq!(rewrite(&rule, "1/3 + 2/3"), "(1 + 2) / 3");
    assert!(!can_apply(&rule, "1/3 + 2/5"));
}

fn bound(ctx: &Context, found: &Match, name: &str, index: Option<usize>) -> Option<String> {
    let id = match index {
        Some(i) => found.bindings.get_indexed(name, i),
        None => found.bindings.get(name),
    };
    id.map(|id| display(ctx, id))
}

fn match_text(pattern: &str, input: &str) -> (Context, Match) {
    let pattern = Pattern::parse(pattern).unwrap();
    let constraints = Constraints::new()
        .with("a", is_number)
        .with("b", is_variable_factor)
        .with("c", is_variable_factor);
    let mut ctx = Context::new();
    let root = cas_parser::parse(input, &mut ctx).unwrap();
    let found = match_node(&pattern, &ctx, root, &constraints).expect("no match");
    (ctx, found)
}

#[test]
fn trailing_run_leaves_unmatched_operand() {
    let (ctx, found) = match_text("#a * #b_0 * ...", "5 * x^2 * y * z * 10");
    assert_eq!(bound(&ctx, &found, "a", None).as_deref(), Some("5"));
    assert_eq!(bound(&ctx, &found, "b", Some(0)).as_deref(), Some("x^2"));
    assert_eq!(bound(&ctx, &found, "b", Some(1)).as_deref(), Some("y"));
    assert_eq!(bound(&ctx, &found, "b", Some(2)).as_deref(), Some("z"));
    assert_eq!(bound(&ctx, &found, "b", Some(3)), None);
    assert_eq!(found.range, Some(0..4));
}

#[test]
fn leading_operand_skipped() {
    let (ctx, found) = match_text("#a * #b_0 * ...", "2 * 5 * x^2 * y * z");
    assert_eq!(bound(&ctx, &found, "a", None).as_deref(), Some("5"));
    assert_eq!(bound(&ctx, &found, "b", Some(0)).as_deref(), Some("x^2"));
    assert_eq!(bound(&ctx, &found, "b", Some(1)).as_deref(), Some("y"));
    assert_eq!(bound(&ctx, &found, "b", Some(2)).as_deref(), Some("z"));
    assert_eq!(found.range, Some(1..5));
}

#[test]
fn run_followed_by_fixed_operand() {
    let (ctx, found) = match_text("#b_0 * ... * #a", "2 * x^2 * y * z * 5");
    assert_eq!(bound(&ctx, &found, "b", Some(0)).as_deref(), Some("x^2"));
    assert_eq!(bound(&ctx, &found, "b", Some(1)).as_deref(), Some("y"));
    assert_eq!(bound(&ctx, &found, "b", Some(2)).as_deref(), Some("z"));
    assert_eq!(bound(&ctx, &found, "a", None).as_deref(), Some("5"));
}

#[test]
fn two_independent_runs() {
    let (ctx, found) = match_text("#b_0 * ... * #a * #c_0 * ...", "2 * x^2 * y * z * 5 * a^2 * b * c");
    assert_eq!(bound(&ctx, &found, "b", Some(0)).as_deref(), Some("x^2"));
    assert_eq!(bound(&ctx, &found, "b", Some(1)).as_deref(), Some("y"));
    assert_eq!(bound(&ctx, &found, "b", Some(2)).as_deref(), Some("z"));
    assert_eq!(bound(&ctx, &found, "a", None).as_deref(), Some("5"));
    assert_eq!(bound(&ctx, &found, "c", Some(0)).as_deref(), Some("a^2"));
    assert_eq!(bound(&ctx, &found, "c", Some(1)).as_deref(), Some("b"));
    assert_eq!(bound(&ctx, &found, "c", Some(2)).as_deref(), Some("c"));
    assert_eq!(found.range, Some(1..8));
}

// ========== callback rules ==========

fn distribute(ctx: &mut Context, found: &Match) -> Result<ExprId, RuleError> {
    let (Some(a), Some(b)) = (found.bindings.get("a"), found.bindings.get("b")) else {
        return Err(RuleError::UnboundPlaceholder("#a".to_string()));
    };
    let sum = unwrap_parens(ctx, b);
    let terms = ctx.get(sum).args().to_vec();
    let products = terms
        .into_iter()
        .map(|term| ctx.apply_with(Op::Mul, vec![a, term], Notation::IMPLICIT))
        .collect();
    Ok(ctx.apply(Op::Add, products))
}

#[test]
fn distribute_over_sum() {
    let constraints = Constraints::new().with("b", |ctx, id| is_add(ctx, unwrap_parens(ctx, id)));
    let matcher = compile_matcher(Pattern::parse("#a #b").unwrap(), constraints.clone());
    let rule = define_rule(move |ctx: &Context, id: ExprId| matcher(ctx, id), distribute, constraints);

    assert_eq!(rewrite(&rule, "3 (x + 1)"), "3 x + 3 1");
    assert_eq!(
        rewrite(&rule, "(a - b) (x^2 + 2x + 1)"),
        "(a - b) x^2 + (a - b) (2 x) + (a - b) 1"
    );
}

fn is_numeric_sum(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Apply { op: Op::Add, args, .. } => args.iter().all(|&arg| is_number(ctx, arg)),
        _ => false,
    }
}

#[test]
fn evaluate_numeric_sum_in_place() {
    let constraints = Constraints::new().with("a", is_numeric_sum);
    let matcher = compile_matcher(Pattern::parse("#a").unwrap(), constraints.clone());
    let rule = define_rule(
        move |ctx: &Context, id: ExprId| matcher(ctx, id),
        |ctx: &mut Context, found: &Match| {
            let value = evaluate(ctx, found.node)?;
            Ok(ctx.rational(value))
        },
        constraints,
    )
    .named("evaluate sum");

    assert_eq!(rewrite(&rule, "(1 - 2 + 3) x"), "2 x");
    assert_eq!(rewrite(&rule, "(1 + 2 + 3) x"), "6 x");
}

// ========== definition errors ==========

#[test]
fn ellipsis_without_template_is_rejected() {
    assert!(matches!(
        parse_rule("#a + ...", "#a", Constraints::new()),
        Err(RuleError::MalformedPattern(_))
    ));
    assert!(matches!(
        parse_rule("...", "1", Constraints::new()),
        Err(RuleError::MalformedPattern(_))
    ));
}

#[test]
fn run_template_must_start_at_index_zero() {
    assert!(matches!(
        parse_rule("#a_1 + ...", "#a_0 + ...", Constraints::new()),
        Err(RuleError::MalformedPattern(_))
    ));
}

#[test]
fn unbound_rewrite_placeholder_is_rejected() {
    assert_eq!(
        parse_rule("#a + 0", "#a + #b", Constraints::new()).unwrap_err(),
        RuleError::UnboundPlaceholder("#b".to_string())
    );
}

#[test]
fn malformed_pattern_text_is_a_parse_error() {
    assert!(matches!(
        parse_rule("#a_ + 1", "#a", Constraints::new()),
        Err(RuleError::Parse(_))
    ));
}

#[test]
fn evaluation_errors_propagate() {
    let rule = parse_rule("#a / #b", "#eval(#a / #b)", numbers(&["a", "b"])).unwrap();
    let mut ctx = Context::new();
    let root = cas_parser::parse("1 + 2 / 0", &mut ctx).unwrap();
    assert!(matches!(apply_rule(&rule, &mut ctx, root), Err(RuleError::Eval(_))));
}

#[test]
fn oversized_power_is_not_evaluated() {
    let rule = parse_rule("#a ^ #b", "#eval(#a ^ #b)", numbers(&["a", "b"])).unwrap();
    let mut ctx = Context::new();
    let root = cas_parser::parse("2^2000000000", &mut ctx).unwrap();
    assert_eq!(
        apply_rule(&rule, &mut ctx, root),
        Err(RuleError::Eval(EvalError::Unsupported("2^2000000000".to_string())))
    );
}
