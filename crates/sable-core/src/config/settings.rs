//! Style settings and their lenient application
//!
//! Every option has a documented default. When a document contains an option
//! with the wrong type, an out-of-range value, or an unknown name, a
//! [`ConfigWarning`] is recorded and the default is kept.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::cst::{LanguageVersion, ParseOptions};

/// Two-letter words accepted as prefixes when `allowCommonHungarianPrefixes` is on
pub const COMMON_HUNGARIAN_PREFIXES: &[&str] = &[
    "as", "at", "by", "do", "go", "if", "in", "is", "it", "no", "of", "on", "or", "to",
];

/// Top-level style settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSettings {
    #[schemars(description = "Indentation used when fixes insert or move lines")]
    pub indentation: IndentationSettings,

    #[schemars(description = "Options for the layout rules (SA15xx)")]
    pub layout_rules: LayoutRules,

    #[schemars(description = "Options for the naming rules (SA13xx)")]
    pub naming_rules: NamingRules,

    #[schemars(description = "Conditional compilation symbols defined for every file")]
    pub preprocessor_symbols: Vec<String>,

    #[schemars(
        with = "String",
        description = "C# language version: latest, 7, 7.3, 8, 9, 10, 11, or 12"
    )]
    pub language_version: LanguageVersion,

    #[schemars(description = "Per-rule severity overrides keyed by rule id")]
    pub rules: BTreeMap<String, RuleSeverity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct IndentationSettings {
    pub indentation_size: usize,
    pub tab_size: usize,
    pub use_tabs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutRules {
    /// Accept `} while (...)` at the end of a do statement
    pub allow_do_while_on_closing_brace: bool,
    pub newline_at_end_of_file: NewlineAtEndOfFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NamingRules {
    pub allow_common_hungarian_prefixes: bool,
    pub allowed_hungarian_prefixes: Vec<String>,
}

/// Trailing newline policy for SA1518
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NewlineAtEndOfFile {
    /// At most one trailing newline
    #[default]
    Allow,
    /// Exactly one trailing newline
    Require,
    /// No trailing newline
    Omit,
}

/// Rule severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Disable the rule
    Off,
    Info,
    Warn,
    Error,
}

/// A problem found while applying a settings document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Dotted option path, e.g. `layoutRules.newlineAtEndOfFile`
    pub path: String,
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            indentation: IndentationSettings::default(),
            layout_rules: LayoutRules::default(),
            naming_rules: NamingRules::default(),
            preprocessor_symbols: Vec::new(),
            language_version: LanguageVersion::Latest,
            rules: BTreeMap::new(),
        }
    }
}

impl Default for IndentationSettings {
    fn default() -> Self {
        Self {
            indentation_size: 4,
            tab_size: 4,
            use_tabs: false,
        }
    }
}

impl Default for LayoutRules {
    fn default() -> Self {
        Self {
            allow_do_while_on_closing_brace: false,
            newline_at_end_of_file: NewlineAtEndOfFile::Allow,
        }
    }
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            allow_common_hungarian_prefixes: true,
            allowed_hungarian_prefixes: Vec::new(),
        }
    }
}

impl StyleSettings {
    /// Parser options derived from the language version and symbols
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new(self.language_version)
            .with_symbols(self.preprocessor_symbols.iter().cloned())
    }

    pub fn rule_severity(&self, rule_id: &str) -> Option<RuleSeverity> {
        self.rules.get(rule_id).copied()
    }

    pub fn is_rule_disabled(&self, rule_id: &str) -> bool {
        self.rule_severity(rule_id) == Some(RuleSeverity::Off)
    }

    /// One level of indentation
    pub fn indent_unit(&self) -> String {
        if self.indentation.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indentation.indentation_size)
        }
    }

    /// Whether a lower-case Hungarian-style prefix is accepted by SA1305
    pub fn is_hungarian_prefix_allowed(&self, prefix: &str) -> bool {
        (self.naming_rules.allow_common_hungarian_prefixes
            && COMMON_HUNGARIAN_PREFIXES.contains(&prefix))
            || self
                .naming_rules
                .allowed_hungarian_prefixes
                .iter()
                .any(|allowed| allowed == prefix)
    }

    /// Apply a settings object leniently, collecting a warning per bad option
    pub fn from_value(value: &Value) -> (Self, Vec<ConfigWarning>) {
        let mut settings = Self::default();
        let mut warnings = Vec::new();

        let Some(object) = as_object("settings", value, &mut warnings) else {
            return (settings, warnings);
        };

        for (key, value) in object {
            match key.as_str() {
                "$schema" => {}
                "indentation" => settings.indentation.apply(value, &mut warnings),
                "layoutRules" => settings.layout_rules.apply(value, &mut warnings),
                "namingRules" => settings.naming_rules.apply(value, &mut warnings),
                "preprocessorSymbols" => {
                    if let Some(symbols) = option(key, value, &mut warnings) {
                        settings.preprocessor_symbols = symbols;
                    }
                }
                "languageVersion" => {
                    if let Some(version) = option(key, value, &mut warnings) {
                        settings.language_version = version;
                    }
                }
                "rules" => apply_rules(value, &mut settings.rules, &mut warnings),
                other => warnings.push(unknown_option(other)),
            }
        }

        (settings, warnings)
    }
}

impl IndentationSettings {
    fn apply(&mut self, value: &Value, warnings: &mut Vec<ConfigWarning>) {
        let Some(object) = as_object("indentation", value, warnings) else {
            return;
        };
        for (key, value) in object {
            let path = format!("indentation.{key}");
            match key.as_str() {
                "indentationSize" | "tabSize" => {
                    let Some(size) = option::<usize>(&path, value, warnings) else {
                        continue;
                    };
                    if size == 0 {
                        warnings.push(ConfigWarning {
                            path,
                            message: "must be greater than zero".to_string(),
                        });
                    } else if key == "tabSize" {
                        self.tab_size = size;
                    } else {
                        self.indentation_size = size;
                    }
                }
                "useTabs" => {
                    if let Some(flag) = option(&path, value, warnings) {
                        self.use_tabs = flag;
                    }
                }
                _ => warnings.push(unknown_option(&path)),
            }
        }
    }
}

impl LayoutRules {
    fn apply(&mut self, value: &Value, warnings: &mut Vec<ConfigWarning>) {
        let Some(object) = as_object("layoutRules", value, warnings) else {
            return;
        };
        for (key, value) in object {
            let path = format!("layoutRules.{key}");
            match key.as_str() {
                "allowDoWhileOnClosingBrace" => {
                    if let Some(flag) = option(&path, value, warnings) {
                        self.allow_do_while_on_closing_brace = flag;
                    }
                }
                "newlineAtEndOfFile" => {
                    if let Some(policy) = option(&path, value, warnings) {
                        self.newline_at_end_of_file = policy;
                    }
                }
                _ => warnings.push(unknown_option(&path)),
            }
        }
    }
}

impl NamingRules {
    fn apply(&mut self, value: &Value, warnings: &mut Vec<ConfigWarning>) {
        let Some(object) = as_object("namingRules", value, warnings) else {
            return;
        };
        for (key, value) in object {
            let path = format!("namingRules.{key}");
            match key.as_str() {
                "allowCommonHungarianPrefixes" => {
                    if let Some(flag) = option(&path, value, warnings) {
                        self.allow_common_hungarian_prefixes = flag;
                    }
                }
                "allowedHungarianPrefixes" => {
                    if let Some(prefixes) = option(&path, value, warnings) {
                        self.allowed_hungarian_prefixes = prefixes;
                    }
                }
                _ => warnings.push(unknown_option(&path)),
            }
        }
    }
}

fn apply_rules(
    value: &Value,
    rules: &mut BTreeMap<String, RuleSeverity>,
    warnings: &mut Vec<ConfigWarning>,
) {
    let Some(object) = as_object("rules", value, warnings) else {
        return;
    };
    for (id, value) in object {
        if let Some(severity) = option(&format!("rules.{id}"), value, warnings) {
            rules.insert(id.clone(), severity);
        }
    }
}

fn as_object<'a>(
    path: &str,
    value: &'a Value,
    warnings: &mut Vec<ConfigWarning>,
) -> Option<&'a Map<String, Value>> {
    let object = value.as_object();
    if object.is_none() {
        warnings.push(ConfigWarning {
            path: path.to_string(),
            message: "expected an object".to_string(),
        });
    }
    object
}

fn option<T: DeserializeOwned>(
    path: &str,
    value: &Value,
    warnings: &mut Vec<ConfigWarning>,
) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warnings.push(ConfigWarning {
                path: path.to_string(),
                message: format!("invalid value ({err}); using the default"),
            });
            None
        }
    }
}

fn unknown_option(path: &str) -> ConfigWarning {
    ConfigWarning {
        path: path.to_string(),
        message: "unknown option".to_string(),
    }
}
