//! Parse options: language version and predefined symbols

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::PreprocessorSymbols;

/// C# language version accepted by the parser
///
/// Newer surface syntax is still parsed under an older version but is
/// reported as a syntax error, the way the compiler does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LanguageVersion {
    CSharp7,
    CSharp7_3,
    CSharp8,
    CSharp9,
    CSharp10,
    CSharp11,
    CSharp12,
    #[default]
    Latest,
}

impl LanguageVersion {
    /// Records, `init` accessors, target-typed `new()`, pattern combinators
    pub fn supports_csharp9(self) -> bool {
        self >= Self::CSharp9
    }

    /// File-scoped namespaces, global usings, record structs
    pub fn supports_csharp10(self) -> bool {
        self >= Self::CSharp10
    }

    /// Switch expressions, ranges, `??=`, property patterns
    pub fn supports_csharp8(self) -> bool {
        self >= Self::CSharp8
    }

    /// Raw string literals and list patterns
    pub fn supports_csharp11(self) -> bool {
        self >= Self::CSharp11
    }
}

impl FromStr for LanguageVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = match s.trim().to_ascii_lowercase().as_str() {
            "7" | "7.0" | "7.1" | "7.2" => Self::CSharp7,
            "7.3" => Self::CSharp7_3,
            "8" | "8.0" => Self::CSharp8,
            "9" | "9.0" => Self::CSharp9,
            "10" | "10.0" => Self::CSharp10,
            "11" | "11.0" => Self::CSharp11,
            "12" | "12.0" => Self::CSharp12,
            "latest" | "preview" | "default" => Self::Latest,
            other => return Err(format!("unknown language version '{other}'")),
        };
        Ok(version)
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::CSharp7 => "7",
            Self::CSharp7_3 => "7.3",
            Self::CSharp8 => "8",
            Self::CSharp9 => "9",
            Self::CSharp10 => "10",
            Self::CSharp11 => "11",
            Self::CSharp12 => "12",
            Self::Latest => "latest",
        };
        f.write_str(text)
    }
}

impl Serialize for LanguageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts `"latest"`, `"7.3"`, `"10"` or a bare number such as `7.3`
impl<'de> Deserialize<'de> for LanguageVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Options controlling how a compilation unit is lexed and parsed
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub language_version: LanguageVersion,
    pub preprocessor_symbols: PreprocessorSymbols,
}

impl ParseOptions {
    pub fn new(language_version: LanguageVersion) -> Self {
        Self {
            language_version,
            preprocessor_symbols: PreprocessorSymbols::new(),
        }
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for symbol in symbols {
            self.preprocessor_symbols.define(symbol);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!("7.3".parse::<LanguageVersion>(), Ok(LanguageVersion::CSharp7_3));
        assert_eq!("Latest".parse::<LanguageVersion>(), Ok(LanguageVersion::Latest));
        assert!("6".parse::<LanguageVersion>().is_err());
        assert!(LanguageVersion::CSharp10.supports_csharp9());
        assert!(!LanguageVersion::CSharp7_3.supports_csharp8());
    }

    #[test]
    fn test_version_serde() {
        let v: LanguageVersion = serde_json::from_str("7.3").unwrap();
        assert_eq!(v, LanguageVersion::CSharp7_3);
        let v: LanguageVersion = serde_json::from_str("\"10\"").unwrap();
        assert_eq!(v, LanguageVersion::CSharp10);
        assert_eq!(serde_json::to_string(&LanguageVersion::Latest).unwrap(), "\"latest\"");
        assert!(serde_json::from_str::<LanguageVersion>("\"5\"").is_err());
    }
}
