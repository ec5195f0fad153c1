//! Analysis and fix engine
//!
//! `analyze` parses a source once and fans the active rules out over the
//! shared tree with rayon. `apply_fix` resolves a single diagnostic, and
//! `fix_all` drives one rule to a fixed point:
//!
//! ```text
//! Analyzing --no violations--> Converged
//! Analyzing --violations--> Fixing --applied--> Analyzing
//! Analyzing --over budget / cancelled--> Aborted
//! Fixing --nothing applicable--> Aborted
//! ```

use std::collections::HashSet;

use rayon::prelude::*;
use rowan::{TextRange, TextSize};
use sable_core::cst::{CsSyntaxKind, CsSyntaxNode, SyntaxTree};
use sable_core::{
    CancellationToken, Diagnostic, Fix, Severity, StyleSettings, TextEdit, apply_edits,
    select_non_conflicting,
};

use crate::context::RuleContext;
use crate::registry::{RegisteredRule, RuleRegistry, Violation};

/// Rule id under which parser and lexer errors are reported
pub const SYNTAX_RULE_ID: &str = "SYNTAX";

/// Default budget of fix batches per rule
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Analyse `source` with every rule of `registry`
///
/// Diagnostics are ordered by line, column, then rule id. Syntax errors are
/// included under [`SYNTAX_RULE_ID`]; style rules stay silent inside the
/// declaration or statement that contains a syntax error.
pub fn analyze(source: &str, registry: &RuleRegistry, settings: &StyleSettings) -> Vec<Diagnostic> {
    let tree = SyntaxTree::parse(source, &settings.parse_options());
    let rules: Vec<RegisteredRule> = registry.iter().copied().collect();

    let mut diagnostics: Vec<Diagnostic> = rules
        .par_iter()
        .flat_map_iter(|rule| rule_diagnostics(&tree, rule, settings))
        .collect();
    diagnostics.extend(syntax_diagnostics(&tree));
    sort_diagnostics(&mut diagnostics);

    tracing::debug!(
        rules = rules.len(),
        diagnostics = diagnostics.len(),
        "analysis finished"
    );
    diagnostics
}

/// Parser and lexer errors as diagnostics
pub fn syntax_diagnostics(tree: &SyntaxTree) -> Vec<Diagnostic> {
    tree.errors()
        .iter()
        .map(|error| {
            Diagnostic::new(
                SYNTAX_RULE_ID,
                Severity::Error,
                error.message.clone(),
                tree.location(error.range),
            )
            .with_category("syntax")
        })
        .collect()
}

fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        (a.location.line, a.location.column, &a.rule_id).cmp(&(
            b.location.line,
            b.location.column,
            &b.rule_id,
        ))
    });
}

/// Diagnostics of one rule over an already parsed tree
fn rule_diagnostics(tree: &SyntaxTree, rule: &RegisteredRule, settings: &StyleSettings) -> Vec<Diagnostic> {
    let ctx = RuleContext::new(tree, settings);
    collect_violations(&ctx, rule)
        .into_iter()
        .map(|violation| {
            let fixable = rule
                .fix
                .and_then(|fix| fix(&ctx, &violation))
                .is_some_and(|edits| !edits.is_empty() && !touches_directive(&ctx, &edits));
            to_diagnostic(tree, rule, &violation).with_fixable(fixable)
        })
        .collect()
}

fn to_diagnostic(tree: &SyntaxTree, rule: &RegisteredRule, violation: &Violation) -> Diagnostic {
    let mut diagnostic = Diagnostic::new(
        rule.id,
        rule.severity,
        rule.format_message(&violation.args),
        tree.location(violation.range),
    )
    .with_args(violation.args.clone())
    .with_category(rule.category.as_str());
    for range in &violation.additional {
        diagnostic = diagnostic.with_additional_location(tree.location(*range));
    }
    diagnostic
}

/// Violations of one rule after dropping malformed regions and applying
/// the once-per-line policy, in source order
fn collect_violations(ctx: &RuleContext, rule: &RegisteredRule) -> Vec<Violation> {
    let malformed = malformed_regions(ctx);
    let mut violations: Vec<Violation> = (rule.check)(ctx)
        .into_iter()
        .filter(|violation| {
            let start = violation.range.start();
            !malformed
                .iter()
                .any(|region| region.start() <= start && start < region.end())
        })
        .collect();
    violations.sort_by_key(|violation| (violation.range.start(), violation.range.end()));
    violations.dedup();

    if rule.once_per_line {
        let mut seen = HashSet::new();
        violations.retain(|violation| seen.insert(ctx.line(violation.range.start())));
    }
    violations
}

/// Ranges in which style rules are not trusted because of syntax errors
///
/// The region is the innermost member declaration containing the error,
/// otherwise the innermost statement other than a block, otherwise the
/// erroneous token itself.
fn malformed_regions(ctx: &RuleContext) -> Vec<TextRange> {
    ctx.tree
        .errors()
        .iter()
        .map(|error| {
            let start = error.range.start();
            let at_offset = ctx.root.token_at_offset(start);
            let token = if error.range.is_empty() {
                at_offset.left_biased()
            } else {
                at_offset.right_biased()
            };
            let Some(token) = token else {
                return error.range;
            };
            let ancestors: Vec<CsSyntaxNode> = token.parent_ancestors().collect();
            let member = ancestors
                .iter()
                .find(|node| node.kind().is_member_decl() && !node.kind().is_type_decl());
            let statement = ancestors
                .iter()
                .find(|node| node.kind().is_statement() && node.kind() != CsSyntaxKind::Block);
            match member.or(statement) {
                Some(node) => node.text_range().cover(error.range),
                None => token.text_range().cover(error.range),
            }
        })
        .collect()
}

/// Whether any edit would touch a preprocessor directive or inactive code
fn touches_directive(ctx: &RuleContext, edits: &[TextEdit]) -> bool {
    edits.iter().any(|edit| ctx.touches_directive(edit))
}

/// Compute the fix for one violation, declining across directives
fn fix_for(ctx: &RuleContext, rule: &RegisteredRule, violation: &Violation) -> Option<Fix> {
    let fix = rule.fix?;
    let edits = fix(ctx, violation)?;
    if edits.is_empty() {
        return None;
    }
    if touches_directive(ctx, &edits) {
        tracing::debug!("{}: fix at {:?} crosses a directive", rule.id, violation.range);
        return None;
    }
    Some(Fix::new(
        rule.id,
        rule.format_message(&violation.args),
        edits,
        rule.fix_applicability,
    ))
}

/// Apply edits and accept the result only if it parses no worse than before
fn apply_checked(tree: &SyntaxTree, edits: &[TextEdit]) -> Option<(String, SyntaxTree)> {
    let fixed = match apply_edits(tree.source(), edits) {
        Ok(fixed) => fixed,
        Err(err) => {
            tracing::debug!("Discarding fix: {}", err);
            return None;
        }
    };
    if fixed == tree.source() {
        return None;
    }
    let reparsed = tree.reparse(&fixed);
    if reparsed.errors().len() > tree.errors().len() {
        tracing::debug!("Discarding fix: it introduces syntax errors");
        return None;
    }
    Some((fixed, reparsed))
}

/// Apply the fix for `diagnostic`
///
/// Returns `None` when the rule has no fix, the violation is no longer
/// present, the fixer declines, or the fix would cross a preprocessor
/// directive or introduce syntax errors.
pub fn apply_fix(
    source: &str,
    diagnostic: &Diagnostic,
    registry: &RuleRegistry,
    settings: &StyleSettings,
) -> Option<String> {
    let rule = registry.get(&diagnostic.rule_id)?;
    rule.fix?;
    let tree = SyntaxTree::parse(source, &settings.parse_options());
    let ctx = RuleContext::new(&tree, settings);
    let range = diagnostic.range();
    let violation = collect_violations(&ctx, rule)
        .into_iter()
        .find(|v| v.range == range && v.args == diagnostic.args)?;
    let fix = fix_for(&ctx, rule, &violation)?;
    apply_checked(&tree, &fix.edits).map(|(fixed, _)| fixed)
}

/// Where the fix-all driver currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixAllState {
    Analyzing,
    Fixing,
    Converged,
    Aborted(AbortReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The iteration budget ran out with violations left
    BudgetExceeded,
    /// The caller's cancellation token was set
    Cancelled,
    /// Violations remain but none of them can be fixed
    NoApplicableFix,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::BudgetExceeded => write!(f, "iteration budget exceeded"),
            AbortReason::Cancelled => write!(f, "cancelled"),
            AbortReason::NoApplicableFix => write!(f, "no applicable fix"),
        }
    }
}

/// Result of driving one rule to a fixed point
#[derive(Debug, Clone)]
pub struct FixAllOutcome {
    /// The last computed text
    pub source: String,
    /// Diagnostics of the rule still present in `source`
    pub remaining: Vec<Diagnostic>,
    /// Number of fix batches applied
    pub iterations: usize,
    /// `Converged` or `Aborted`
    pub state: FixAllState,
}

impl FixAllOutcome {
    pub fn converged(&self) -> bool {
        self.state == FixAllState::Converged
    }
}

/// Repeatedly analyse and fix `source` for one rule
///
/// Every iteration applies a batch of non-conflicting fixes and re-parses.
/// When a batch would add syntax errors the fixes are tried one at a time.
/// Unknown rule ids converge immediately.
pub fn fix_all(
    source: &str,
    rule_id: &str,
    registry: &RuleRegistry,
    settings: &StyleSettings,
    max_iterations: usize,
    cancel: &CancellationToken,
) -> FixAllOutcome {
    let mut tree = SyntaxTree::parse(source, &settings.parse_options());
    let Some(rule) = registry.get(rule_id).copied() else {
        tracing::warn!("fix_all: unknown rule '{}'", rule_id);
        return FixAllOutcome {
            source: source.to_string(),
            remaining: Vec::new(),
            iterations: 0,
            state: FixAllState::Converged,
        };
    };

    let mut state = FixAllState::Analyzing;
    let mut iterations = 0;
    let mut remaining = Vec::new();

    loop {
        match state {
            FixAllState::Analyzing => {
                remaining = rule_diagnostics(&tree, &rule, settings);
                state = if remaining.is_empty() {
                    FixAllState::Converged
                } else if cancel.is_cancelled() {
                    FixAllState::Aborted(AbortReason::Cancelled)
                } else if iterations >= max_iterations {
                    FixAllState::Aborted(AbortReason::BudgetExceeded)
                } else {
                    iterations += 1;
                    FixAllState::Fixing
                };
            }
            FixAllState::Fixing => match fix_batch(&tree, &rule, settings) {
                Some(next) => {
                    tree = next;
                    state = FixAllState::Analyzing;
                }
                None => state = FixAllState::Aborted(AbortReason::NoApplicableFix),
            },
            FixAllState::Converged | FixAllState::Aborted(_) => break,
        }
    }

    match state {
        FixAllState::Aborted(reason) => tracing::debug!(
            "{}: stopped after {} iterations ({}), {} diagnostics remain",
            rule.id,
            iterations,
            reason,
            remaining.len()
        ),
        _ => tracing::debug!("{}: converged after {} iterations", rule.id, iterations),
    }

    FixAllOutcome {
        source: tree.source().to_string(),
        remaining,
        iterations,
        state,
    }
}

/// One Fixing step: the new tree, or `None` when nothing could be applied
fn fix_batch(tree: &SyntaxTree, rule: &RegisteredRule, settings: &StyleSettings) -> Option<SyntaxTree> {
    let ctx = RuleContext::new(tree, settings);
    let fixes: Vec<Fix> = collect_violations(&ctx, rule)
        .iter()
        .filter_map(|violation| fix_for(&ctx, rule, violation))
        .collect();
    let selected = select_non_conflicting(fixes);
    if selected.is_empty() {
        return None;
    }

    let edits: Vec<TextEdit> = selected.iter().flat_map(|fix| fix.edits.clone()).collect();
    if let Some((_, next)) = apply_checked(tree, &edits) {
        tracing::trace!("{}: applied {} fixes", rule.id, selected.len());
        return Some(next);
    }

    // The batch as a whole breaks the parse; fall back to the first fix that does not
    selected
        .iter()
        .find_map(|fix| apply_checked(tree, &fix.edits))
        .map(|(_, next)| next)
}

/// Fix-all summary for one rule
#[derive(Debug, Clone)]
pub struct RuleFixSummary {
    pub rule_id: &'static str,
    pub iterations: usize,
    pub state: FixAllState,
    /// Diagnostics of this rule left when its loop ended
    pub remaining: usize,
}

/// Result of [`fix_all_rules`]
#[derive(Debug, Clone)]
pub struct FixAllRulesOutcome {
    pub source: String,
    pub rules: Vec<RuleFixSummary>,
    /// Every diagnostic, syntax errors included, in the final text
    pub remaining: Vec<Diagnostic>,
    pub cancelled: bool,
}

impl FixAllRulesOutcome {
    pub fn changed(&self, original: &str) -> bool {
        self.source != original
    }

    /// Rules whose loop stopped without converging
    pub fn unconverged(&self) -> impl Iterator<Item = &RuleFixSummary> {
        self.rules
            .iter()
            .filter(|summary| summary.state != FixAllState::Converged)
    }
}

/// Run [`fix_all`] for every fixable rule in registry order
///
/// Each rule runs to completion before the next one starts, on the output
/// of the previous rule. A later rule's fix can re-trigger an earlier rule
/// (tab expansion leaving runs of spaces), so the sweep repeats until a
/// whole pass leaves the text unchanged, at most `max_iterations` times.
pub fn fix_all_rules(
    source: &str,
    registry: &RuleRegistry,
    settings: &StyleSettings,
    max_iterations: usize,
    cancel: &CancellationToken,
) -> FixAllRulesOutcome {
    let mut current = source.to_string();
    let mut rules: Vec<RuleFixSummary> = Vec::new();
    let mut cancelled = false;
    let mut sweeps = 0;

    loop {
        let before = current.clone();
        sweeps += 1;
        for rule in registry.iter().filter(|rule| rule.is_fixable()) {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let outcome = fix_all(&current, rule.id, registry, settings, max_iterations, cancel);
            if outcome.state == FixAllState::Aborted(AbortReason::Cancelled) {
                cancelled = true;
            }
            match rules.iter_mut().find(|summary| summary.rule_id == rule.id) {
                Some(summary) => {
                    summary.iterations += outcome.iterations;
                    summary.state = outcome.state;
                    summary.remaining = outcome.remaining.len();
                }
                None if outcome.iterations > 0 || !outcome.remaining.is_empty() => {
                    rules.push(RuleFixSummary {
                        rule_id: rule.id,
                        iterations: outcome.iterations,
                        state: outcome.state,
                        remaining: outcome.remaining.len(),
                    });
                }
                None => {}
            }
            current = outcome.source;
            if cancelled {
                break;
            }
        }

        if cancelled || current == before {
            break;
        }
        if sweeps >= max_iterations {
            tracing::debug!("fix_all_rules: still changing after {} sweeps", sweeps);
            break;
        }
    }

    let remaining = analyze(&current, registry, settings);
    FixAllRulesOutcome {
        source: current,
        rules,
        remaining,
        cancelled,
    }
}

/// Byte offset helper for tests and callers that work with line/column pairs
pub fn offset_of(source: &str, line: usize, column: usize) -> Option<TextSize> {
    let map = sable_core::SourceMap::new(source);
    if line == 0 || line > map.line_count() {
        return None;
    }
    let start = map.line_start(line - 1);
    let mut units = 0;
    for (idx, c) in source[start..].char_indices() {
        if units + 1 == column {
            return Some(TextSize::from((start + idx) as u32));
        }
        units += c.len_utf16();
    }
    (units + 1 == column).then(|| TextSize::from(source.len() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(ids: &[&str]) -> RuleRegistry {
        RuleRegistry::builtin().with_rules(ids).unwrap()
    }

    #[test]
    fn test_diagnostics_are_ordered() {
        let source = "class A {\n    void M() {\n    }\n}\n";
        let diagnostics = analyze(source, &RuleRegistry::builtin(), &StyleSettings::default());
        let positions: Vec<_> = diagnostics.iter().map(|d| d.position()).collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(diagnostics.iter().any(|d| d.rule_id == "SA1500"));
    }

    #[test]
    fn test_syntax_errors_are_reported() {
        let source = "class A { void M( }";
        let diagnostics = analyze(source, &registry(&["SA1500"]), &StyleSettings::default());
        assert!(diagnostics.iter().any(|d| d.rule_id == SYNTAX_RULE_ID));
        assert!(
            diagnostics
                .iter()
                .filter(|d| d.rule_id == SYNTAX_RULE_ID)
                .all(|d| d.severity == Severity::Error)
        );
    }

    #[test]
    fn test_apply_fix_for_unknown_rule() {
        let source = "class A\n{\n}\n";
        let diagnostic = Diagnostic::new(
            "SA9999",
            Severity::Warning,
            "nothing",
            sable_core::Location::default(),
        );
        assert!(apply_fix(source, &diagnostic, &RuleRegistry::builtin(), &StyleSettings::default()).is_none());
    }

    #[test]
    fn test_offset_of() {
        let source = "ab\r\n\u{1F600}c";
        assert_eq!(offset_of(source, 1, 1), Some(0.into()));
        assert_eq!(offset_of(source, 2, 3), Some(8.into()));
        assert_eq!(offset_of(source, 3, 1), None);
    }

    #[test]
    fn test_fix_all_converges_and_reports_iterations() {
        let source = "class A {\n    void M() {\n    }\n}\n";
        let outcome = fix_all(
            source,
            "SA1500",
            &RuleRegistry::builtin(),
            &StyleSettings::default(),
            DEFAULT_MAX_ITERATIONS,
            &CancellationToken::new(),
        );
        assert!(outcome.converged());
        assert!(outcome.iterations >= 1);
        assert!(outcome.remaining.is_empty());
        assert_eq!(outcome.source, "class A\n{\n    void M()\n    {\n    }\n}\n");
    }
}
