// Contract Registry
// Source of truth the validator consults: required tokens, version marker and naming rules

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use regex::Regex;
use thiserror::Error;

use crate::models::{ThemeContract, ThemeMode};
use crate::services::text_scan::strip_jsonc_comments;

const BUILTIN_CONTRACT: &str = include_str!("../../contract/theme-contract.json");

/// Palette and mode halves of a valid theme id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeIdParts {
    pub palette: String,
    pub mode: ThemeMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    pub message: String,
    pub replacement: Option<String>,
}

/// Contract interface consumed by the validator.
///
/// Kept as a trait so the validator can be exercised against synthetic
/// contracts and so a contract upgrade is a data change.
pub trait SchemaRegistry {
    fn contract_version(&self) -> &str;
    fn version_token_name(&self) -> &str;
    fn reserved_prefix(&self) -> &str;
    fn required_tokens(&self) -> &[String];
    fn is_required_token(&self, name: &str) -> bool;

    fn is_reserved_token(&self, name: &str) -> bool {
        name.starts_with(self.reserved_prefix())
    }

    /// Required, version marker, optional families and deprecated names.
    fn is_known_token(&self, name: &str) -> bool;

    fn parse_theme_id(&self, id: &str) -> Option<ThemeIdParts>;

    fn is_valid_theme_id(&self, id: &str) -> bool {
        self.parse_theme_id(id).is_some()
    }

    fn deprecation(&self, name: &str) -> Option<DeprecationNotice>;
}

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Failed to read contract file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid contract JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid palette pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid contract: {0}")]
    Invalid(String),
}

/// [`SchemaRegistry`] backed by a [`ThemeContract`] definition
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    contract: ThemeContract,
    required: HashSet<String>,
    palette_regex: Regex,
}

impl ContractRegistry {
    /// Registry for the contract embedded in this build
    pub fn builtin() -> Result<Self, ContractError> {
        Self::from_json(BUILTIN_CONTRACT)
    }

    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let content = fs::read_to_string(path)?;
        let registry = Self::from_json(&content)?;
        log::info!(
            "Loaded theme contract {} from {:?} ({} required tokens)",
            registry.contract.contract_version,
            path,
            registry.contract.required_tokens.len()
        );
        Ok(registry)
    }

    pub fn from_json(content: &str) -> Result<Self, ContractError> {
        let sanitized = strip_jsonc_comments(content);
        let contract: ThemeContract = serde_json::from_str(&sanitized)?;
        Self::from_contract(contract)
    }

    pub fn from_contract(contract: ThemeContract) -> Result<Self, ContractError> {
        if contract.contract_version.trim().is_empty() {
            return Err(ContractError::Invalid("contractVersion cannot be empty".to_string()));
        }
        if contract.reserved_prefix.is_empty() {
            return Err(ContractError::Invalid("reservedPrefix cannot be empty".to_string()));
        }
        if !contract.version_token.starts_with(&contract.reserved_prefix) {
            return Err(ContractError::Invalid(format!(
                "versionToken '{}' must start with '{}'",
                contract.version_token, contract.reserved_prefix
            )));
        }
        if contract.required_tokens.is_empty() {
            return Err(ContractError::Invalid("requiredTokens cannot be empty".to_string()));
        }

        let mut required = HashSet::with_capacity(contract.required_tokens.len());
        for token in &contract.required_tokens {
            if !token.starts_with(&contract.reserved_prefix) {
                return Err(ContractError::Invalid(format!(
                    "required token '{token}' must start with '{}'",
                    contract.reserved_prefix
                )));
            }
            if !required.insert(token.clone()) {
                return Err(ContractError::Invalid(format!(
                    "required token '{token}' is listed twice"
                )));
            }
        }

        let palette_regex = Regex::new(&contract.palette_pattern)?;

        Ok(Self {
            contract,
            required,
            palette_regex,
        })
    }

    pub fn contract(&self) -> &ThemeContract {
        &self.contract
    }
}

impl SchemaRegistry for ContractRegistry {
    fn contract_version(&self) -> &str {
        &self.contract.contract_version
    }

    fn version_token_name(&self) -> &str {
        &self.contract.version_token
    }

    fn reserved_prefix(&self) -> &str {
        &self.contract.reserved_prefix
    }

    fn required_tokens(&self) -> &[String] {
        &self.contract.required_tokens
    }

    fn is_required_token(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    fn is_known_token(&self, name: &str) -> bool {
        self.required.contains(name)
            || name == self.contract.version_token
            || self.contract.deprecated_tokens.contains_key(name)
            || self
                .contract
                .optional_token_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    fn parse_theme_id(&self, id: &str) -> Option<ThemeIdParts> {
        let (palette, mode) = id.rsplit_once('-')?;
        let mode = ThemeMode::parse(mode)?;
        if palette.is_empty() || palette.ends_with('-') || !self.palette_regex.is_match(palette) {
            return None;
        }
        Some(ThemeIdParts {
            palette: palette.to_string(),
            mode,
        })
    }

    fn deprecation(&self, name: &str) -> Option<DeprecationNotice> {
        let entry = self.contract.deprecated_tokens.get(name)?;
        let message = match (&entry.message, &entry.replacement) {
            (Some(message), _) => message.clone(),
            (None, Some(replacement)) => {
                format!("Token '{name}' is deprecated; use '{replacement}' instead")
            }
            (None, None) => format!("Token '{name}' is deprecated"),
        };
        Some(DeprecationNotice {
            message,
            replacement: entry.replacement.clone(),
        })
    }
}
