//! End-to-end tests for analysis and fixing
//!
//! This suite covers:
//! - The brace-placement scenario from analysis through fix-all
//! - Trivia preservation when a single-line element is expanded
//! - Inactive preprocessor branches and malformed code
//! - Rename collisions through the public fix API
//! - Fix-all budgets, cancellation and idempotence

use sable_core::{CancellationToken, Diagnostic, StyleSettings};
use sable_rules::{
    AbortReason, DEFAULT_MAX_ITERATIONS, FixAllState, RuleRegistry, SYNTAX_RULE_ID, analyze,
    apply_fix, fix_all, fix_all_rules,
};

const METHOD1: &str = "public class Foo
{
    public void Method1() {
    }
}
";

const METHOD1_FIXED: &str = "public class Foo
{
    public void Method1()
    {
    }
}
";

fn only(ids: &[&str]) -> RuleRegistry {
    RuleRegistry::builtin().with_rules(ids).unwrap()
}

fn positions(diagnostics: &[Diagnostic]) -> Vec<(&str, usize, usize)> {
    diagnostics
        .iter()
        .map(|d| (d.rule_id.as_str(), d.location.line, d.location.column))
        .collect()
}

#[test]
fn test_brace_sharing_a_line_is_reported_once() {
    let diagnostics = analyze(METHOD1, &RuleRegistry::builtin(), &StyleSettings::default());
    assert_eq!(positions(&diagnostics), vec![("SA1500", 3, 27)]);
    assert!(diagnostics[0].fixable);
}

#[test]
fn test_brace_fix_end_to_end() {
    let settings = StyleSettings::default();
    let registry = RuleRegistry::builtin();
    let diagnostics = analyze(METHOD1, &registry, &settings);
    let fixed = apply_fix(METHOD1, &diagnostics[0], &registry, &settings).unwrap();
    assert_eq!(fixed, METHOD1_FIXED);

    let outcome = fix_all_rules(
        METHOD1,
        &registry,
        &settings,
        DEFAULT_MAX_ITERATIONS,
        &CancellationToken::new(),
    );
    assert_eq!(outcome.source, METHOD1_FIXED);
    assert!(outcome.remaining.is_empty());
    assert!(!outcome.cancelled);
    assert!(analyze(METHOD1_FIXED, &registry, &settings).is_empty());
}

#[test]
fn test_single_line_element_keeps_trailing_comments() {
    let source = "public class Foo
{
    public int Bar() /* TR1 */ { /* TR2 */ return 0; /* TR3 */ } /* TR4 */
}
";
    let outcome = fix_all(
        source,
        "SA1502",
        &RuleRegistry::builtin(),
        &StyleSettings::default(),
        DEFAULT_MAX_ITERATIONS,
        &CancellationToken::new(),
    );
    assert!(outcome.converged());
    insta::assert_snapshot!(outcome.source, @r"
public class Foo
{
    public int Bar() /* TR1 */
    { /* TR2 */
        return 0; /* TR3 */
    } /* TR4 */
}
");
}

#[test]
fn test_inactive_branch_is_silent() {
    let source = "class A
{
#if SOMETHING
    void M() {
        if (x) return;
    }
#else
    void M()
    {
    }
#endif
}
";
    let registry = RuleRegistry::builtin();
    let diagnostics = analyze(source, &registry, &StyleSettings::default());
    assert!(
        diagnostics.iter().all(|d| !(3..=7).contains(&d.location.line)),
        "{:?}",
        positions(&diagnostics)
    );

    let mut settings = StyleSettings::default();
    settings.preprocessor_symbols = vec!["SOMETHING".to_string()];
    let diagnostics = analyze(source, &registry, &settings);
    assert!(positions(&diagnostics).contains(&("SA1500", 4, 14)));
}

#[test]
fn test_fix_does_not_cross_directives() {
    let source = "class A
{
    void M()
#if DEBUG
    {
#else
    {
#endif
    }
}
";
    let registry = RuleRegistry::builtin();
    let settings = StyleSettings::default();
    for diagnostic in analyze(source, &registry, &settings) {
        if let Some(fixed) = apply_fix(source, &diagnostic, &registry, &settings) {
            assert!(fixed.contains("#if DEBUG\n    {\n#else\n    {\n#endif\n"));
        }
    }
}

#[test]
fn test_malformed_member_reports_only_syntax_errors() {
    let source = "class A
{
    int P { get { return X } }
}
";
    let diagnostics = analyze(source, &RuleRegistry::builtin(), &StyleSettings::default());
    assert!(diagnostics.iter().any(|d| d.rule_id == SYNTAX_RULE_ID));
    assert!(
        diagnostics
            .iter()
            .filter(|d| d.location.line == 3)
            .all(|d| d.rule_id == SYNTAX_RULE_ID),
        "{:?}",
        positions(&diagnostics)
    );
}

#[test]
fn test_once_per_line_rule() {
    let source = "class A
{
    void M()
    {
        a(); b(); c();
    }
}
";
    let diagnostics = analyze(source, &only(&["SA1107"]), &StyleSettings::default());
    assert_eq!(positions(&diagnostics), vec![("SA1107", 5, 14)]);

    let outcome = fix_all(
        source,
        "SA1107",
        &RuleRegistry::builtin(),
        &StyleSettings::default(),
        DEFAULT_MAX_ITERATIONS,
        &CancellationToken::new(),
    );
    assert!(outcome.converged());
    assert!(outcome.source.contains("        a();\n        b();\n        c();\n"));
}

#[test]
fn test_rename_collisions_through_apply_fix() {
    let registry = only(&["SA1300"]);
    let settings = StyleSettings::default();

    let source = "class C\n{\n    int Test;\n    int Test1;\n\n    void test() { test(); }\n}\n";
    let diagnostics = analyze(source, &registry, &settings);
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].fixable);
    let fixed = apply_fix(source, &diagnostics[0], &registry, &settings).unwrap();
    assert_eq!(
        fixed,
        "class C\n{\n    int Test;\n    int Test1;\n\n    void Test2() { Test2(); }\n}\n"
    );

    let source = "enum E\n{\n    Member,\n    Member1,\n    member,\n}\n";
    let diagnostics = analyze(source, &registry, &settings);
    let fixed = apply_fix(source, &diagnostics[0], &registry, &settings).unwrap();
    assert_eq!(fixed, "enum E\n{\n    Member,\n    Member1,\n    Member2,\n}\n");
}

#[test]
fn test_native_methods_suppress_naming_rules() {
    let source = "internal static class NativeMethods
{
    internal const int max_path = 260;
    private static int m_Handle;
    internal static extern int close_handle(int Handle);
}
";
    let registry = only(&[
        "SA1300", "SA1303", "SA1305", "SA1306", "SA1308", "SA1309", "SA1310", "SA1313",
    ]);
    assert!(analyze(source, &registry, &StyleSettings::default()).is_empty());

    let outside = source.replace("NativeMethods", "Interop");
    assert!(!analyze(&outside, &registry, &StyleSettings::default()).is_empty());
}

#[test]
fn test_declined_rename_stays_reported() {
    let source = "class C\n{\n    private int m_;\n}\n";
    let registry = only(&["SA1308"]);
    let settings = StyleSettings::default();
    let diagnostics = analyze(source, &registry, &settings);
    assert_eq!(diagnostics.len(), 1);
    assert!(!diagnostics[0].fixable);

    let outcome = fix_all(
        source,
        "SA1308",
        &registry,
        &settings,
        DEFAULT_MAX_ITERATIONS,
        &CancellationToken::new(),
    );
    assert_eq!(outcome.state, FixAllState::Aborted(AbortReason::NoApplicableFix));
    assert_eq!(outcome.source, source);
    assert_eq!(outcome.remaining.len(), 1);
}

#[test]
fn test_tuple_cast_is_not_a_spacing_error() {
    let source = "class A
{
    void M()
    {
        var p = ((int, int))(3, 3);
        var list = new List<(int, string)>();
    }
}
";
    let registry = only(&["SA1001", "SA1008", "SA1009"]);
    assert!(analyze(source, &registry, &StyleSettings::default()).is_empty());
}

#[test]
fn test_budget_and_cancellation() {
    let registry = RuleRegistry::builtin();
    let settings = StyleSettings::default();

    let outcome = fix_all(METHOD1, "SA1500", &registry, &settings, 0, &CancellationToken::new());
    assert_eq!(outcome.state, FixAllState::Aborted(AbortReason::BudgetExceeded));
    assert_eq!(outcome.source, METHOD1);
    assert_eq!(outcome.remaining.len(), 1);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = fix_all(METHOD1, "SA1500", &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
    assert_eq!(outcome.state, FixAllState::Aborted(AbortReason::Cancelled));
    assert_eq!(outcome.iterations, 0);

    let outcome = fix_all_rules(METHOD1, &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
    assert!(outcome.cancelled);
    assert_eq!(outcome.source, METHOD1);
}

#[test]
fn test_fixed_output_is_a_fixed_point() {
    let sources = [
        METHOD1,
        "class A\n{\n    void M()\n    {\n        if (x) return;\n\n\n        int  y = 1 ;\n    }\n}\n",
        "class A\n{\n    void M() { a(); b(); }\n    string S = \"\";\n    Int32 N;\n}\n",
        "class A\n{\n\n    int x;\n    int y;\n\n}\n",
    ];
    let registry = RuleRegistry::builtin();
    let settings = StyleSettings::default();
    let cancel = CancellationToken::new();

    for source in sources {
        for rule in registry.iter().filter(|rule| rule.is_fixable()) {
            let first = fix_all(source, rule.id, &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
            if !first.converged() {
                continue;
            }
            let single = only(&[rule.id]);
            assert!(
                analyze(&first.source, &single, &settings)
                    .iter()
                    .all(|d| d.rule_id != rule.id),
                "{} still fires after fixing",
                rule.id
            );
            let second = fix_all(&first.source, rule.id, &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
            assert_eq!(second.source, first.source, "{} is not idempotent", rule.id);
            assert_eq!(second.iterations, 0);
        }
    }
}

#[test]
fn test_batched_close_braces_keep_their_own_indent() {
    let registry = RuleRegistry::builtin();
    let settings = StyleSettings::default();
    let cancel = CancellationToken::new();

    let source = "class A\n{\n    void M()\n    {\n        a();\n    } }\n";
    let outcome = fix_all(source, "SA1500", &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
    assert!(outcome.converged());
    assert_eq!(outcome.source, "class A\n{\n    void M()\n    {\n        a();\n    }\n}\n");
}

#[test]
fn test_nested_single_line_bodies_expand_in_one_batch() {
    let registry = RuleRegistry::builtin();
    let settings = StyleSettings::default();
    let cancel = CancellationToken::new();

    let source = "class A { void M() { a(); } }\n";
    let outcome = fix_all(source, "SA1502", &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
    assert!(outcome.converged());
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.source, "class A\n{\n    void M()\n    {\n        a();\n    }\n}\n");
}

#[test]
fn test_nested_embedded_statements_are_indented_by_depth() {
    let registry = RuleRegistry::builtin();
    let settings = StyleSettings::default();
    let cancel = CancellationToken::new();

    let source = "class A\n{\n    void M()\n    {\n        if (x) if (y) a(); else b();\n    }\n}\n";
    let outcome = fix_all(source, "SA1503", &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
    assert!(outcome.converged());
    assert_eq!(
        outcome.source,
        "class A\n{\n    void M()\n    {\n        if (x)\n        {\n            if (y)\n            {\n                a();\n            } else\n            {\n                b();\n            }\n        }\n    }\n}\n"
    );
}

#[test]
fn test_fix_all_rules_reaches_a_fixed_point() {
    let registry = RuleRegistry::builtin().safe_fixes_only();
    let settings = StyleSettings::default();
    let cancel = CancellationToken::new();

    // Adding braces leaves `} while` for brace placement; expanding a tab leaves a run of spaces
    let sources = [
        "class A\n{\n    void M()\n    {\n        do a(); while (x);\n    }\n}\n",
        "class A\n{\n    int x\t= 1;\n}\n",
    ];
    for source in sources {
        let first = fix_all_rules(source, &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
        let second = fix_all_rules(&first.source, &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
        assert_eq!(second.source, first.source);
        assert!(second.rules.iter().all(|summary| summary.iterations == 0));
    }

    let do_while = fix_all_rules(sources[0], &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
    assert!(do_while.source.contains("        }\n        while (x);\n"));

    let tabs = fix_all_rules(sources[1], &registry, &settings, DEFAULT_MAX_ITERATIONS, &cancel);
    assert_eq!(tabs.source, "class A\n{\n    int x = 1;\n}\n");
}
