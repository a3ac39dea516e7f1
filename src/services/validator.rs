// Theme Validator
// Cross-checks one parsed theme against the contract registry

use serde_json::json;

use crate::models::{
    ContractVersionValidation, ErrorCode, ParseWarning, ParsedTheme, ThemeFormat,
    ThemeIdValidation, ThemeValidationResult, TokenValidation, ValidationError, ValidationWarning, WarningCode,
};
use crate::services::contract_registry::SchemaRegistry;
use crate::services::text_scan::strip_quotes;

const PLACEHOLDER_MARKER: &str = "REPLACE_ME";
const DANGEROUS_MARKERS: [&str; 2] = ["</style>", "<script"];

/// Validates a parsed theme.
///
/// The identifier, version and token checks all run, so one theme can report
/// several failures at once. Warnings never affect `valid`.
pub fn validate(theme: &ParsedTheme, registry: &dyn SchemaRegistry) -> ThemeValidationResult {
    let mut errors = Vec::new();

    let theme_id = validate_theme_id(theme.theme_id.as_deref(), registry, &mut errors);
    let contract_version = validate_contract_version(theme, registry, &mut errors);
    let tokens = validate_tokens(theme, registry, &mut errors);
    let warnings = collect_warnings(theme, registry);

    ThemeValidationResult {
        source_path: theme.source_path.clone(),
        format: Some(theme.format),
        valid: errors.is_empty(),
        theme_id,
        contract_version,
        tokens,
        errors,
        warnings,
    }
}

pub fn validate_theme_id(
    theme_id: Option<&str>,
    registry: &dyn SchemaRegistry,
    errors: &mut Vec<ValidationError>,
) -> ThemeIdValidation {
    let Some(id) = theme_id else {
        let message = "Theme identifier is missing".to_string();
        errors.push(ValidationError::new(ErrorCode::MissingThemeId, message.clone()));
        return ThemeIdValidation {
            valid: false,
            error: Some(message),
            ..ThemeIdValidation::default()
        };
    };

    match registry.parse_theme_id(id) {
        Some(parts) => ThemeIdValidation {
            valid: true,
            theme_id: Some(id.to_string()),
            palette: Some(parts.palette),
            mode: Some(parts.mode),
            error: None,
        },
        None => {
            let message =
                format!("Invalid theme identifier '{id}': expected '<palette>-<light|dark>'");
            errors.push(
                ValidationError::new(ErrorCode::InvalidThemeId, message.clone())
                    .with_context("themeId", id),
            );
            ThemeIdValidation {
                valid: false,
                theme_id: Some(id.to_string()),
                palette: None,
                mode: None,
                error: Some(message),
            }
        }
    }
}

pub fn validate_contract_version(
    theme: &ParsedTheme,
    registry: &dyn SchemaRegistry,
    errors: &mut Vec<ValidationError>,
) -> ContractVersionValidation {
    let token_name = registry.version_token_name();
    let expected = registry.contract_version().to_string();

    let Some(raw) = theme.tokens.get(token_name) else {
        let message = format!("Missing contract version token '{token_name}'");
        errors.push(
            ValidationError::new(ErrorCode::MissingContractVersion, message.clone())
                .with_context("expected", expected.as_str()),
        );
        return ContractVersionValidation {
            valid: false,
            found_version: None,
            expected_version: expected,
            error: Some(message),
        };
    };

    let found = strip_quotes(raw).to_string();
    if found == expected {
        return ContractVersionValidation {
            valid: true,
            found_version: Some(found),
            expected_version: expected,
            error: None,
        };
    }

    let message = format!("Contract version mismatch: found '{found}', expected '{expected}'");
    errors.push(
        ValidationError::new(ErrorCode::InvalidContractVersion, message.clone())
            .with_context("found", found.as_str())
            .with_context("expected", expected.as_str()),
    );
    ContractVersionValidation {
        valid: false,
        found_version: Some(found),
        expected_version: expected,
        error: Some(message),
    }
}

pub fn validate_tokens(
    theme: &ParsedTheme,
    registry: &dyn SchemaRegistry,
    errors: &mut Vec<ValidationError>,
) -> TokenValidation {
    let required = registry.required_tokens();
    let version_token = registry.version_token_name();

    let missing: Vec<String> = required
        .iter()
        .filter(|token| !theme.tokens.contains_key(token.as_str()))
        .cloned()
        .collect();

    let extra: Vec<String> = theme
        .tokens
        .keys()
        .filter(|name| {
            registry.is_reserved_token(name)
                && name.as_str() != version_token
                && !registry.is_required_token(name)
                && !registry.is_known_token(name)
        })
        .cloned()
        .collect();

    let found_count = required.len() - missing.len();

    if !missing.is_empty() {
        errors.push(
            ValidationError::new(
                ErrorCode::MissingTokens,
                format!(
                    "Missing {} required token(s): {}",
                    missing.len(),
                    missing.join(", ")
                ),
            )
            .with_context("count", missing.len())
            .with_context("missing", json!(missing)),
        );
    }

    if !extra.is_empty() {
        errors.push(
            ValidationError::new(
                ErrorCode::UnknownTokens,
                format!("Found {} unknown token(s): {}", extra.len(), extra.join(", ")),
            )
            .with_context("count", extra.len())
            .with_context("tokens", json!(extra)),
        );
    }

    if !theme.duplicates.is_empty() {
        errors.push(
            ValidationError::new(
                ErrorCode::DuplicateTokens,
                format!(
                    "Token(s) declared more than once: {}",
                    theme.duplicates.join(", ")
                ),
            )
            .with_context("tokens", json!(theme.duplicates)),
        );
    }

    TokenValidation {
        complete: missing.is_empty(),
        required_count: required.len(),
        found_count,
        missing,
        extra,
        duplicates: theme.duplicates.clone(),
    }
}

/// Result for a file that produced no theme at all.
///
/// Nothing could be checked, so every required token is reported missing and
/// the only error is the file-level one.
pub fn failed_file_result(
    source_path: &str,
    format: Option<ThemeFormat>,
    code: ErrorCode,
    message: impl Into<String>,
    registry: &dyn SchemaRegistry,
) -> ThemeValidationResult {
    let required = registry.required_tokens();
    ThemeValidationResult {
        source_path: source_path.to_string(),
        format,
        valid: false,
        theme_id: ThemeIdValidation::default(),
        contract_version: ContractVersionValidation {
            valid: false,
            found_version: None,
            expected_version: registry.contract_version().to_string(),
            error: None,
        },
        tokens: TokenValidation {
            complete: false,
            required_count: required.len(),
            found_count: 0,
            missing: required.to_vec(),
            extra: Vec::new(),
            duplicates: Vec::new(),
        },
        errors: vec![ValidationError::new(code, message).with_context("path", source_path)],
        warnings: Vec::new(),
    }
}

fn collect_warnings(theme: &ParsedTheme, registry: &dyn SchemaRegistry) -> Vec<ValidationWarning> {
    let mut warnings: Vec<ValidationWarning> = theme
        .parse_warnings
        .iter()
        .map(|warning| match warning {
            ParseWarning::EmptyValue { token } => {
                ValidationWarning::new(WarningCode::EmptyTokenValue, warning.to_string())
                    .with_context("token", token.as_str())
            }
            ParseWarning::NonScalarValue { token, .. } => {
                ValidationWarning::new(WarningCode::UnusualTokenValue, warning.to_string())
                    .with_context("token", token.as_str())
            }
        })
        .collect();

    for (name, value) in &theme.tokens {
        if value.contains(PLACEHOLDER_MARKER) {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::UnusualTokenValue,
                    format!("Token '{name}' still contains a {PLACEHOLDER_MARKER} placeholder"),
                )
                .with_context("token", name.as_str()),
            );
        }
        if DANGEROUS_MARKERS.iter().any(|marker| value.contains(marker)) {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::UnusualTokenValue,
                    format!("Token '{name}' contains markup that can break out of a style block"),
                )
                .with_context("token", name.as_str()),
            );
        }
    }

    for name in theme.tokens.keys() {
        if let Some(notice) = registry.deprecation(name) {
            let mut warning = ValidationWarning::new(WarningCode::DeprecatedToken, notice.message)
                .with_context("token", name.as_str());
            if let Some(replacement) = notice.replacement {
                warning = warning.with_context("replacement", replacement);
            }
            warnings.push(warning);
        }
    }

    warnings
}
