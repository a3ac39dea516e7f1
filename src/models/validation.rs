// Validation Model
// Result records produced by the validator and the run coordinator

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::theme::{ThemeFormat, ThemeMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingContractVersion,
    InvalidContractVersion,
    MissingThemeId,
    InvalidThemeId,
    MissingTokens,
    UnknownTokens,
    DuplicateTokens,
    ParseError,
    FileNotFound,
    UnsupportedFormat,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingContractVersion => "MISSING_CONTRACT_VERSION",
            ErrorCode::InvalidContractVersion => "INVALID_CONTRACT_VERSION",
            ErrorCode::MissingThemeId => "MISSING_THEME_ID",
            ErrorCode::InvalidThemeId => "INVALID_THEME_ID",
            ErrorCode::MissingTokens => "MISSING_TOKENS",
            ErrorCode::UnknownTokens => "UNKNOWN_TOKENS",
            ErrorCode::DuplicateTokens => "DUPLICATE_TOKENS",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::UnsupportedFormat => "UNSUPPORTED_FORMAT",
        }
    }

    /// Input/operator problems, as opposed to contract violations.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::ParseError | ErrorCode::FileNotFound | ErrorCode::UnsupportedFormat
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    EmptyTokenValue,
    UnusualTokenValue,
    DeprecatedToken,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::EmptyTokenValue => "EMPTY_TOKEN_VALUE",
            WarningCode::UnusualTokenValue => "UNUSUAL_TOKEN_VALUE",
            WarningCode::DeprecatedToken => "DEPRECATED_TOKEN",
        }
    }
}

pub type IssueContext = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<IssueContext>,
}

impl ValidationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub code: WarningCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<IssueContext>,
}

impl ValidationWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeIdValidation {
    pub valid: bool,
    pub theme_id: Option<String>,
    pub palette: Option<String>,
    pub mode: Option<ThemeMode>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractVersionValidation {
    pub valid: bool,
    pub found_version: Option<String>,
    pub expected_version: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidation {
    pub complete: bool,
    pub required_count: usize,
    pub found_count: usize,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
    pub duplicates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeValidationResult {
    pub source_path: String,
    pub format: Option<ThemeFormat>,
    pub valid: bool,
    pub theme_id: ThemeIdValidation,
    pub contract_version: ContractVersionValidation,
    pub tokens: TokenValidation,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ThemeValidationResult {
    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|error| error.code == code)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRunResult {
    pub success: bool,
    pub summary: RunSummary,
    pub results: Vec<ThemeValidationResult>,
}

impl ValidationRunResult {
    /// Builds the run result, computing the summary over the flattened list.
    pub fn from_results(results: Vec<ThemeValidationResult>) -> Self {
        let passed = results.iter().filter(|result| result.valid).count();
        let summary = RunSummary {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        };
        Self {
            success: summary.failed == 0,
            summary,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(valid: bool) -> ThemeValidationResult {
        ThemeValidationResult {
            source_path: "theme.css".to_string(),
            format: Some(ThemeFormat::StyleSheet),
            valid,
            theme_id: ThemeIdValidation::default(),
            contract_version: ContractVersionValidation::default(),
            tokens: TokenValidation::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let run = ValidationRunResult::from_results(vec![
            result_with(true),
            result_with(false),
            result_with(true),
        ]);
        assert_eq!(run.summary, RunSummary { total: 3, passed: 2, failed: 1 });
        assert!(!run.success);
    }

    #[test]
    fn test_empty_run_is_success() {
        let run = ValidationRunResult::from_results(Vec::new());
        assert!(run.success);
        assert_eq!(run.summary.total, 0);
    }

    #[test]
    fn test_error_code_serializes_screaming_snake() {
        let error = ValidationError::new(ErrorCode::MissingTokens, "missing")
            .with_context("count", 2);
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["code"], "MISSING_TOKENS");
        assert_eq!(json["context"]["count"], 2);
        assert_eq!(ErrorCode::MissingTokens.as_str(), "MISSING_TOKENS");
    }

    #[test]
    fn test_input_error_codes() {
        assert!(ErrorCode::FileNotFound.is_input_error());
        assert!(ErrorCode::ParseError.is_input_error());
        assert!(ErrorCode::UnsupportedFormat.is_input_error());
        assert!(!ErrorCode::InvalidContractVersion.is_input_error());
    }
}
