//! Configuration system for sable
//!
//! Settings live in a JSON document that may contain comments and trailing
//! commas. Files are discovered by walking up from the analysed path:
//!
//! 1. `.sablerc.json`
//! 2. `sable.json`
//! 3. `stylecop.json`
//!
//! The document is either the settings object itself or a wrapper with a
//! `settings` key, as StyleCop writes it:
//!
//! ```jsonc
//! {
//!   "settings": {
//!     "indentation": { "indentationSize": 4, "useTabs": false },
//!     "layoutRules": {
//!       "allowDoWhileOnClosingBrace": true,
//!       "newlineAtEndOfFile": "require"
//!     },
//!     "namingRules": { "allowedHungarianPrefixes": ["db"] },
//!     "preprocessorSymbols": ["DEBUG"],
//!     "languageVersion": "10",
//!     "rules": { "SA1101": "off", "SA1500": "error" }
//!   }
//! }
//! ```
//!
//! Invalid options never abort a run: each one produces a [`ConfigWarning`]
//! and its default stays in effect.

mod loader;
mod settings;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader, LoadedConfig};
pub use settings::{
    COMMON_HUNGARIAN_PREFIXES, ConfigWarning, IndentationSettings, LayoutRules, NamingRules,
    NewlineAtEndOfFile, RuleSeverity, StyleSettings,
};
