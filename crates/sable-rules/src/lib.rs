//! Sable Rules
//!
//! The built-in C# style rules, the explicit rule registry, and the engine
//! that runs rules over a syntax tree and drives their fixes.

pub mod builtin;
pub mod context;
pub mod engine;
pub mod fixes;
pub mod registry;

pub use context::{BlankLines, RuleContext};
pub use engine::{
    AbortReason, DEFAULT_MAX_ITERATIONS, FixAllOutcome, FixAllRulesOutcome, FixAllState,
    RuleFixSummary, SYNTAX_RULE_ID, analyze, apply_fix, fix_all, fix_all_rules, offset_of,
    syntax_diagnostics,
};
pub use registry::{
    CheckFn, FixFn, RegisteredRule, RuleCategory, RuleDescriptor, RuleRegistry, Violation,
};
