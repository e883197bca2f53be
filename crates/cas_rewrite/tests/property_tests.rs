use cas_ast::{nodes_equal, Context, DisplayExpr, ExprId};
use cas_rewrite::query::is_number;
use cas_rewrite::{apply_rule, can_apply_rule, parse_rule, Constraints, Rule};
use proptest::prelude::*;

mod strategies;

fn display(ctx: &Context, id: ExprId) -> String {
    DisplayExpr { context: ctx, id }.to_string()
}

fn sample_rules() -> Vec<Rule> {
    let numbers = || Constraints::new().with("a", is_number);
    vec![
        parse_rule("#a + 0", "#a", Constraints::new()).unwrap(),
        parse_rule("#a * 1", "#a", Constraints::new()).unwrap(),
        parse_rule("#a + #a", "2 #a", Constraints::new()).unwrap(),
        parse_rule("#a_0 + ...", "#eval(#a_0 + ...)", numbers()).unwrap(),
        parse_rule("#a_0 * ...", "#eval(#a_0 * ...)", numbers()).unwrap(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_round_trip_print_parse(re in strategies::arb_recursive_expr()) {
        let (ctx, expr) = strategies::to_context(re);
        let printed = display(&ctx, expr);

        let mut parse_ctx = Context::new();
        let parsed = cas_parser::parse(&printed, &mut parse_ctx);
        prop_assert!(parsed.is_ok(), "Failed to parse: {}", printed);
        let reprinted = display(&parse_ctx, parsed.unwrap());
        prop_assert_eq!(reprinted, printed);
    }

    #[test]
    fn test_identity_on_no_match(re in strategies::arb_recursive_expr()) {
        let (mut ctx, expr) = strategies::to_context(re);
        for rule in sample_rules() {
            if can_apply_rule(&rule, &ctx, expr) {
                continue;
            }
            let out = apply_rule(&rule, &mut ctx, expr).unwrap();
            prop_assert_eq!(out, expr);
            prop_assert!(nodes_equal(&ctx, out, &ctx, expr));
        }
    }

    #[test]
    fn test_rewrite_is_deterministic(re in strategies::arb_recursive_expr()) {
        let (ctx, expr) = strategies::to_context(re);
        let text = display(&ctx, expr);

        for rule in sample_rules() {
            let run = || {
                let mut ctx = Context::new();
                let root = cas_parser::parse(&text, &mut ctx).unwrap();
                apply_rule(&rule, &mut ctx, root).map(|out| display(&ctx, out))
            };
            prop_assert_eq!(run(), run());
        }
    }

    #[test]
    fn test_rewrite_changes_tree_iff_applicable(re in strategies::arb_recursive_expr()) {
        let (mut ctx, expr) = strategies::to_context(re);
        let rule = parse_rule("#a + 0", "#a", Constraints::new()).unwrap();

        let applicable = can_apply_rule(&rule, &ctx, expr);
        let out = apply_rule(&rule, &mut ctx, expr).unwrap();
        prop_assert_eq!(applicable, out != expr);
    }
}
