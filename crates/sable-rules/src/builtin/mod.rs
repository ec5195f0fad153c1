//! Built-in rule catalog
//!
//! Rules are grouped by family. Each family module exports its rule id
//! constants and a `rules()` table; [`all_rules`] concatenates the tables in
//! catalog order.

use rowan::TextRange;
use sable_core::cst::trivia::{next_significant, prev_significant};
use sable_core::cst::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

use crate::context::RuleContext;
use crate::registry::RuleDescriptor;

pub mod layout;
pub mod naming;
pub mod readability;
pub mod spacing;

/// Every built-in rule in catalog order
pub fn all_rules() -> Vec<RuleDescriptor> {
    let mut rules = layout::rules();
    rules.extend(spacing::rules());
    rules.extend(readability::rules());
    rules.extend(naming::rules());
    rules
}

/// Matching `{` and `}` of one construct
#[derive(Debug, Clone)]
pub(crate) struct BracePair {
    pub open: CsSyntaxToken,
    pub close: CsSyntaxToken,
}

/// Every complete brace pair in the file, in order of the opening brace
///
/// Property pattern braces are patterns, not bodies, and are left out.
pub(crate) fn brace_pairs(ctx: &RuleContext) -> Vec<BracePair> {
    ctx.significant_tokens()
        .filter(|token| token.kind() == CsSyntaxKind::LBrace)
        .filter_map(|open| {
            let close = matching_close(&open)?;
            Some(BracePair { open, close })
        })
        .collect()
}

/// The `}` closing the construct opened by `open`
pub(crate) fn matching_close(open: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    let parent = open.parent()?;
    if parent.kind() == CsSyntaxKind::PropertyPatternClause {
        return None;
    }
    parent
        .children_with_tokens()
        .filter_map(|element| element.into_token())
        .skip_while(|token| token != open)
        .find(|token| token.kind() == CsSyntaxKind::RBrace)
}

/// The `{` opening the construct closed by `close`
pub(crate) fn matching_open(close: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    let parent = close.parent()?;
    if parent.kind() == CsSyntaxKind::PropertyPatternClause {
        return None;
    }
    parent
        .children_with_tokens()
        .filter_map(|element| element.into_token())
        .take_while(|token| token != close)
        .filter(|token| token.kind() == CsSyntaxKind::LBrace)
        .last()
}

/// Direct child tokens of `node`, trivia excluded
pub(crate) fn direct_tokens(node: &CsSyntaxNode) -> impl Iterator<Item = CsSyntaxToken> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
}

/// First significant token inside `node`
pub(crate) fn first_token(node: &CsSyntaxNode) -> Option<CsSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| !token.kind().is_trivia())
}

/// Last significant token inside `node`
pub(crate) fn last_token(node: &CsSyntaxNode) -> Option<CsSyntaxToken> {
    let last = node.last_token()?;
    if !last.kind().is_trivia() {
        return Some(last);
    }
    prev_significant(&last).filter(|token| node.text_range().contains_range(token.text_range()))
}

/// The token spanning exactly `range`
pub(crate) fn token_at(ctx: &RuleContext, range: TextRange) -> Option<CsSyntaxToken> {
    ctx.root
        .covering_element(range)
        .into_token()
        .filter(|token| token.text_range() == range)
}

/// Whether a preprocessor directive or disabled text lies between two tokens
pub(crate) fn directive_between(first: &CsSyntaxToken, last: &CsSyntaxToken) -> bool {
    let mut next = first.next_token();
    while let Some(token) = next {
        if &token == last {
            return false;
        }
        if matches!(
            token.kind(),
            CsSyntaxKind::PreprocessorDirective | CsSyntaxKind::DisabledText
        ) {
            return true;
        }
        next = token.next_token();
    }
    false
}

/// The line break ending the line of `token`, skipping same-line trivia
pub(crate) fn line_end_after(token: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    let mut next = token.next_token();
    while let Some(t) = next {
        match t.kind() {
            CsSyntaxKind::Newline => return Some(t),
            kind if kind.is_trivia() && kind != CsSyntaxKind::DisabledText => next = t.next_token(),
            _ => return None,
        }
    }
    None
}

/// Next significant token when it is on the same line as `token`
pub(crate) fn next_on_line(ctx: &RuleContext, token: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    next_significant(token).filter(|next| ctx.same_line(token, next))
}

/// Previous significant token when it is on the same line as `token`
pub(crate) fn prev_on_line(ctx: &RuleContext, token: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    prev_significant(token).filter(|prev| ctx.same_line(prev, token))
}

#[cfg(test)]
pub(crate) mod test_support {
    use sable_core::{ParseOptions, StyleSettings, SyntaxTree, apply_edits};

    use crate::context::RuleContext;
    use crate::registry::{RuleDescriptor, Violation};

    /// Run one rule over `source`
    pub fn check(rule: &RuleDescriptor, source: &str) -> Vec<Violation> {
        check_with(rule, source, &StyleSettings::default())
    }

    pub fn check_with(rule: &RuleDescriptor, source: &str, settings: &StyleSettings) -> Vec<Violation> {
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        let ctx = RuleContext::new(&tree, settings);
        let mut violations = (rule.check)(&ctx);
        violations.sort_by_key(|v| v.range.start());
        violations
    }

    /// 1-based (line, column) of every violation
    pub fn positions(rule: &RuleDescriptor, source: &str) -> Vec<(usize, usize)> {
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        check(rule, source)
            .iter()
            .map(|v| {
                let location = tree.location(v.range);
                (location.line, location.column)
            })
            .collect()
    }

    /// Apply the fix of the first violation
    pub fn fix_first(rule: &RuleDescriptor, source: &str) -> Option<String> {
        fix_first_with(rule, source, &StyleSettings::default())
    }

    pub fn fix_first_with(rule: &RuleDescriptor, source: &str, settings: &StyleSettings) -> Option<String> {
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        let ctx = RuleContext::new(&tree, settings);
        let mut violations = (rule.check)(&ctx);
        violations.sort_by_key(|v| v.range.start());
        let violation = violations.first()?;
        let edits = (rule.fix?)(&ctx, violation)?;
        apply_edits(source, &edits).ok()
    }

    /// Apply fixes one at a time until the rule is satisfied
    pub fn fix_until_clean(rule: &RuleDescriptor, source: &str) -> String {
        let mut current = source.to_string();
        for _ in 0..20 {
            match fix_first(rule, &current) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        current
    }

    pub fn rule(rules: Vec<RuleDescriptor>, id: &str) -> RuleDescriptor {
        rules
            .into_iter()
            .find(|r| r.id == id)
            .expect("rule registered")
    }
}
