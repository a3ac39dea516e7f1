use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// Theme mode: light or dark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Physical encoding a theme was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThemeFormat {
    StyleSheet,
    StructuredData,
    SourceSnippet,
}

impl ThemeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeFormat::StyleSheet => "style-sheet",
            ThemeFormat::StructuredData => "structured-data",
            ThemeFormat::SourceSnippet => "source-snippet",
        }
    }
}

impl fmt::Display for ThemeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal issue noticed while extracting tokens from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Declaration with an empty or all-whitespace value.
    EmptyValue { token: String },
    /// Value the parser could not represent as a string (object, array, null).
    NonScalarValue { token: String, kind: &'static str },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::EmptyValue { token } => {
                write!(f, "Token '{token}' has an empty value")
            }
            ParseWarning::NonScalarValue { token, kind } => {
                write!(f, "Token '{token}' has a non-scalar value ({kind}) and was skipped")
            }
        }
    }
}

/// One theme block extracted from a file, before any contract checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTheme {
    pub theme_id: Option<String>,
    /// Sorted by token name so reports do not depend on declaration order.
    pub tokens: BTreeMap<String, String>,
    pub source_path: String,
    pub format: ThemeFormat,
    pub parse_warnings: Vec<ParseWarning>,
    /// Keys declared more than once in the same theme, in first-repeat order.
    pub duplicates: Vec<String>,
}

impl ParsedTheme {
    pub fn new(theme_id: Option<String>, source_path: &str, format: ThemeFormat) -> Self {
        Self {
            theme_id,
            tokens: BTreeMap::new(),
            source_path: source_path.to_string(),
            format,
            parse_warnings: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    /// Records a declaration. The later value wins; repeats are remembered once.
    pub fn insert_token(&mut self, key: &str, value: &str) {
        if value.trim().is_empty() {
            self.parse_warnings.push(ParseWarning::EmptyValue {
                token: key.to_string(),
            });
        }
        let previous = self.tokens.insert(key.to_string(), value.trim().to_string());
        if previous.is_some() && !self.duplicates.iter().any(|d| d == key) {
            self.duplicates.push(key.to_string());
        }
    }
}
