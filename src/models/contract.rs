// Contract Model
// Versioned rules every theme must satisfy, loaded from JSON

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_version_token() -> String {
    "--theme-contract-version".to_string()
}

fn default_reserved_prefix() -> String {
    "--".to_string()
}

fn default_palette_pattern() -> String {
    r"^[a-z0-9][a-z0-9-]{0,62}$".to_string()
}

/// Replacement hint for a token slated for removal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprecatedToken {
    #[serde(default)]
    pub replacement: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Theme contract definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeContract {
    pub contract_version: String,
    #[serde(default = "default_version_token")]
    pub version_token: String,
    #[serde(default = "default_reserved_prefix")]
    pub reserved_prefix: String,
    /// Regex the palette half of `<palette>-<mode>` must match
    #[serde(default = "default_palette_pattern")]
    pub palette_pattern: String,
    pub required_tokens: Vec<String>,
    /// Token families themes may customize or omit (e.g. colour scales)
    #[serde(default)]
    pub optional_token_prefixes: Vec<String>,
    #[serde(default)]
    pub deprecated_tokens: BTreeMap<String, DeprecatedToken>,
}
