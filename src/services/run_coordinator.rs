// Run Coordinator
// Drives detection, parsing and validation over a list of theme files

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::models::{ErrorCode, ParsedTheme, ThemeFormat, ThemeValidationResult, ValidationRunResult};
use crate::services::contract_registry::SchemaRegistry;
use crate::services::css_parser::parse_style_sheet;
use crate::services::format_detector::detect_format;
use crate::services::json_parser::parse_structured_data;
use crate::services::parse_error::ParseError;
use crate::services::source_parser::parse_source_snippet;
use crate::services::validator::{failed_file_result, validate};

const UTF8_BOM: char = '\u{feff}';

pub struct ValidationRunner<'a> {
    registry: &'a dyn SchemaRegistry,
}

impl<'a> ValidationRunner<'a> {
    pub fn new(registry: &'a dyn SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validates every file in order. Per-file failures become failing
    /// results; the run itself never aborts.
    pub fn run_validation<P: AsRef<Path>>(&self, paths: &[P]) -> ValidationRunResult {
        let mut results = Vec::new();
        for path in paths {
            results.extend(self.validate_file(path.as_ref()));
        }

        let run = ValidationRunResult::from_results(results);
        log::info!(
            "Validated {} theme(s) from {} file(s): {} passed, {} failed",
            run.summary.total,
            paths.len(),
            run.summary.passed,
            run.summary.failed
        );
        run
    }

    pub fn validate_file(&self, path: &Path) -> Vec<ThemeValidationResult> {
        let display = path.display().to_string();

        let content = match fs::read_to_string(path) {
            Ok(content) => content
                .strip_prefix(UTF8_BOM)
                .map(str::to_string)
                .unwrap_or(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("Theme file not found: {}", display);
                return vec![failed_file_result(
                    &display,
                    None,
                    ErrorCode::FileNotFound,
                    format!("File not found: {display}"),
                    self.registry,
                )];
            }
            Err(e) => {
                return vec![self.parse_failure(&display, None, ParseError::Unreadable(e.to_string()))];
            }
        };

        let Some(format) = detect_format(path, &content, self.registry.reserved_prefix()) else {
            return vec![self.parse_failure(&display, None, ParseError::UnknownFormat)];
        };
        log::debug!("Detected {} format for {}", format, display);

        let themes = match self.parse(format, &content, &display) {
            Ok(themes) if themes.is_empty() => {
                return vec![self.parse_failure(&display, Some(format), ParseError::Empty)];
            }
            Ok(themes) => themes,
            Err(e) => return vec![self.parse_failure(&display, Some(format), e)],
        };

        themes
            .iter()
            .map(|theme| {
                let result = validate(theme, self.registry);
                log::debug!(
                    "{} [{}]: {} ({} error(s), {} warning(s))",
                    display,
                    theme.theme_id.as_deref().unwrap_or("<anonymous>"),
                    if result.valid { "valid" } else { "invalid" },
                    result.errors.len(),
                    result.warnings.len()
                );
                result
            })
            .collect()
    }

    fn parse(
        &self,
        format: ThemeFormat,
        content: &str,
        source_path: &str,
    ) -> Result<Vec<ParsedTheme>, ParseError> {
        let prefix = self.registry.reserved_prefix();
        match format {
            ThemeFormat::StyleSheet => parse_style_sheet(content, source_path, prefix),
            ThemeFormat::StructuredData => parse_structured_data(content, source_path, prefix),
            ThemeFormat::SourceSnippet => parse_source_snippet(content, source_path, prefix),
        }
    }

    fn parse_failure(
        &self,
        source_path: &str,
        format: Option<ThemeFormat>,
        error: ParseError,
    ) -> ThemeValidationResult {
        log::warn!("Failed to parse {}: {}", source_path, error);
        failed_file_result(source_path, format, error.code(), error.to_string(), self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::models::{RunSummary, ThemeContract};
    use crate::services::contract_registry::ContractRegistry;

    fn registry() -> ContractRegistry {
        ContractRegistry::from_contract(ThemeContract {
            contract_version: "1.0".to_string(),
            version_token: "--theme-contract-version".to_string(),
            reserved_prefix: "--".to_string(),
            palette_pattern: r"^[a-z0-9][a-z0-9-]*$".to_string(),
            required_tokens: vec!["--bg".to_string(), "--fg".to_string()],
            optional_token_prefixes: Vec::new(),
            deprecated_tokens: Default::default(),
        })
        .unwrap()
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_multi_block_css_yields_one_result_per_theme() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "themes.css",
            r#"
:root[data-theme="ocean-light"] {
  --theme-contract-version: "1.0";
  --bg: #fff;
  --fg: #000;
}
:root[data-theme="ocean-dark"] {
  --theme-contract-version: "1.0";
  --bg: #000;
}
"#,
        );
        let registry = registry();
        let run = ValidationRunner::new(&registry).run_validation(&[path]);

        assert_eq!(run.summary, RunSummary { total: 2, passed: 1, failed: 1 });
        assert!(!run.success);
        assert!(run.results[1].has_error(ErrorCode::MissingTokens));
    }

    #[test]
    fn test_missing_file_gets_synthetic_result() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let run =
            ValidationRunner::new(&registry).run_validation(&[dir.path().join("absent.css")]);

        assert_eq!(run.summary.total, 1);
        let result = &run.results[0];
        assert_eq!(result.errors.len(), 1);
        assert!(result.has_error(ErrorCode::FileNotFound));
        assert_eq!(result.tokens.missing.len(), 2);
    }

    #[test]
    fn test_undetectable_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        let notes = write(&dir, "notes.txt", "plain prose");
        let broken = write(&dir, "broken.json", "{ \"id\": ");
        let registry = registry();
        let run = ValidationRunner::new(&registry).run_validation(&[notes, broken]);

        assert_eq!(run.summary.failed, 2);
        assert!(run.results[0].has_error(ErrorCode::UnsupportedFormat));
        assert!(run.results[1].has_error(ErrorCode::ParseError));
        assert_eq!(run.results[1].format, Some(ThemeFormat::StructuredData));
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "theme.json",
            "\u{feff}{ \"id\": \"bom-dark\", \"tokens\": { \"--theme-contract-version\": \"1.0\", \"--bg\": \"#000\", \"--fg\": \"#fff\" } }",
        );
        let registry = registry();
        let run = ValidationRunner::new(&registry).run_validation(&[path]);

        assert!(run.success, "{:?}", run.results);
        assert_eq!(run.results[0].format, Some(ThemeFormat::StructuredData));
    }

    #[test]
    fn test_empty_theme_list_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "themes.json", "[]");
        let registry = registry();
        let run = ValidationRunner::new(&registry).run_validation(&[path]);

        assert_eq!(run.summary.total, 1);
        assert!(run.results[0].has_error(ErrorCode::ParseError));
    }

    #[test]
    fn test_mixed_formats_in_one_run() {
        let dir = TempDir::new().unwrap();
        let json = write(
            &dir,
            "forest.json",
            r##"{ "id": "forest-dark", "tokens": { "--theme-contract-version": "1.0", "--bg": "#000", "--fg": "#fff" } }"##,
        );
        let source = write(
            &dir,
            "forest.ts",
            r##"export const forestLight = {
  id: "forest-light",
  tokens: { "--theme-contract-version": "1.0", "--bg": "#fff", "--fg": "#000" },
};
"##,
        );
        let registry = registry();
        let run = ValidationRunner::new(&registry).run_validation(&[json, source]);

        assert!(run.success, "{:?}", run.results);
        assert_eq!(run.summary, RunSummary { total: 2, passed: 2, failed: 0 });
        assert_eq!(run.results[1].format, Some(ThemeFormat::SourceSnippet));
    }
}
