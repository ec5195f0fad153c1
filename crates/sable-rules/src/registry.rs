//! Rule descriptors and the explicit rule registry
//!
//! A rule is a plain value: an id, a message template, a check function and
//! an optional fix function. The registry is built once and passed to the
//! engine; there is no global rule list.

use rowan::TextRange;
use sable_core::{Applicability, RuleSeverity, Result, SableError, Severity, StyleSettings, TextEdit};

use crate::builtin;
use crate::context::RuleContext;

/// Walks a tree and returns every violation of one rule
pub type CheckFn = fn(&RuleContext) -> Vec<Violation>;

/// Computes the edits resolving one violation, or declines with `None`
pub type FixFn = fn(&RuleContext, &Violation) -> Option<Vec<TextEdit>>;

/// Rule families, reported as the diagnostic category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Layout,
    Spacing,
    Readability,
    Naming,
}

impl RuleCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleCategory::Layout => "layout",
            RuleCategory::Spacing => "spacing",
            RuleCategory::Readability => "readability",
            RuleCategory::Naming => "naming",
        }
    }
}

/// Static description of a built-in rule
#[derive(Debug, Clone, Copy)]
pub struct RuleDescriptor {
    /// Stable short code, e.g. `SA1500`
    pub id: &'static str,
    pub name: &'static str,
    pub category: RuleCategory,
    pub default_severity: Severity,
    /// Message template with `{0}`, `{1}`, ... placeholders
    pub message: &'static str,
    pub description: &'static str,
    /// Keep only the first violation on each physical line
    pub once_per_line: bool,
    pub check: CheckFn,
    pub fix: Option<FixFn>,
    pub fix_applicability: Applicability,
}

impl RuleDescriptor {
    /// A warning-level rule without a fix
    pub fn new(
        id: &'static str,
        name: &'static str,
        category: RuleCategory,
        message: &'static str,
        check: CheckFn,
    ) -> Self {
        Self {
            id,
            name,
            category,
            default_severity: Severity::Warning,
            message,
            description: "",
            once_per_line: false,
            check,
            fix: None,
            fix_applicability: Applicability::Always,
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn with_fix(mut self, fix: FixFn, applicability: Applicability) -> Self {
        self.fix = Some(fix);
        self.fix_applicability = applicability;
        self
    }

    pub fn once_per_line(mut self) -> Self {
        self.once_per_line = true;
        self
    }

    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }

    pub fn format_message(&self, args: &[String]) -> String {
        format_message(self.message, args)
    }
}

/// One violation site found by a rule walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Primary span; its start is the reported location
    pub range: TextRange,
    /// Message arguments
    pub args: Vec<String>,
    /// Further spans reported alongside the primary one
    pub additional: Vec<TextRange>,
}

impl Violation {
    pub fn new(range: TextRange) -> Self {
        Self {
            range,
            args: Vec::new(),
            additional: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_additional(mut self, range: TextRange) -> Self {
        self.additional.push(range);
        self
    }
}

/// Substitute `{n}` placeholders with positional arguments
///
/// Placeholders without a matching argument are left as written.
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut message = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        message.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            message.push_str(&rest[open..]);
            return message;
        };
        match after[..close].parse::<usize>().ok().and_then(|i| args.get(i)) {
            Some(arg) => message.push_str(arg),
            None => message.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    message.push_str(rest);
    message
}

/// A rule together with the severity it reports at
#[derive(Debug, Clone, Copy)]
pub struct RegisteredRule {
    pub descriptor: RuleDescriptor,
    pub severity: Severity,
}

impl std::ops::Deref for RegisteredRule {
    type Target = RuleDescriptor;

    fn deref(&self) -> &RuleDescriptor {
        &self.descriptor
    }
}

/// Ordered set of active rules
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in rule at its default severity, in catalog order
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin::all_rules() {
            registry.register(descriptor);
        }
        registry
    }

    /// Register a rule, replacing any rule with the same id
    pub fn register(&mut self, descriptor: RuleDescriptor) {
        let registered = RegisteredRule {
            descriptor,
            severity: descriptor.default_severity,
        };
        match self.rules.iter_mut().find(|r| r.id == descriptor.id) {
            Some(existing) => {
                tracing::debug!("Replacing rule {}", descriptor.id);
                *existing = registered;
            }
            None => self.rules.push(registered),
        }
    }

    /// The subset of rules named by `ids`, in catalog order
    pub fn with_rules<S: AsRef<str>>(&self, ids: &[S]) -> Result<Self> {
        for id in ids {
            let id = id.as_ref();
            if self.get(id).is_none() {
                return Err(SableError::rule_error(id, "unknown rule id"));
            }
        }
        let rules = self
            .rules
            .iter()
            .filter(|rule| ids.iter().any(|id| id.as_ref() == rule.id))
            .copied()
            .collect();
        Ok(Self { rules })
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply the `rules` severity overrides of `settings`
    ///
    /// `off` removes the rule. Overrides for unknown ids are logged and ignored.
    pub fn configured(&self, settings: &StyleSettings) -> Self {
        for id in settings.rules.keys() {
            if self.get(id).is_none() {
                tracing::warn!("Ignoring severity override for unknown rule '{}'", id);
            }
        }

        let rules = self
            .rules
            .iter()
            .filter_map(|rule| {
                let severity = match settings.rule_severity(rule.id) {
                    None => rule.severity,
                    Some(RuleSeverity::Off) => return None,
                    Some(RuleSeverity::Info) => Severity::Info,
                    Some(RuleSeverity::Warn) => Severity::Warning,
                    Some(RuleSeverity::Error) => Severity::Error,
                };
                Some(RegisteredRule {
                    descriptor: rule.descriptor,
                    severity,
                })
            })
            .collect();
        Self { rules }
    }

    /// The same rules with only fixes that are safe to apply unattended
    pub fn safe_fixes_only(&self) -> Self {
        let rules = self
            .rules
            .iter()
            .map(|rule| {
                let mut rule = *rule;
                if rule.descriptor.fix_applicability != Applicability::Always {
                    rule.descriptor.fix = None;
                }
                rule
            })
            .collect();
        Self { rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let args = vec![" not".to_string(), "followed".to_string()];
        assert_eq!(
            format_message("Comma should{0} be {1} by a space", &args),
            "Comma should not be followed by a space"
        );
        assert_eq!(format_message("missing {3} stays", &args), "missing {3} stays");
        assert_eq!(format_message("brace { alone", &args), "brace { alone");
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let registry = RuleRegistry::builtin();
        let mut ids: Vec<_> = registry.iter().map(|r| r.id).collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert!(registry.get("SA1500").is_some());
    }

    #[test]
    fn test_with_rules() {
        let registry = RuleRegistry::builtin();
        let subset = registry.with_rules(&["SA1513", "SA1500"]).unwrap();
        let ids: Vec<_> = subset.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["SA1500", "SA1513"]);
        assert!(registry.with_rules(&["SA9999"]).is_err());
    }

    #[test]
    fn test_configured_overrides() {
        let mut settings = StyleSettings::default();
        settings.rules.insert("SA1500".into(), RuleSeverity::Error);
        settings.rules.insert("SA1501".into(), RuleSeverity::Off);
        settings.rules.insert("SA9999".into(), RuleSeverity::Warn);

        let registry = RuleRegistry::builtin().configured(&settings);
        assert_eq!(registry.get("SA1500").map(|r| r.severity), Some(Severity::Error));
        assert!(registry.get("SA1501").is_none());
        assert_eq!(registry.get("SA1502").map(|r| r.severity), Some(Severity::Warning));
    }

    #[test]
    fn test_safe_fixes_only_drops_renames() {
        let registry = RuleRegistry::builtin().safe_fixes_only();
        assert!(registry.get("SA1500").is_some_and(|r| r.is_fixable()));
        assert!(registry.get("SA1300").is_some_and(|r| !r.is_fixable()));
        assert!(registry.get("SA1121").is_some_and(|r| !r.is_fixable()));
        assert_eq!(registry.len(), RuleRegistry::builtin().len());
    }
}
