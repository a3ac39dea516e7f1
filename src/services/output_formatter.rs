// Output Formatter
// Human and JSON renderings of a validation run, plus the exit-code policy

use std::fmt::Write as _;

use console::style;

use crate::models::{ThemeValidationResult, ValidationRunResult};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONTRACT_FAILURE: i32 = 1;
pub const EXIT_INPUT_ERROR: i32 = 2;

/// Missing tokens listed per theme before the list is cut short
pub const MISSING_TOKEN_DISPLAY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub verbose: bool,
    pub color: bool,
}

/// Derives the process exit code. Input errors outrank contract failures.
pub fn exit_code(run: &ValidationRunResult) -> i32 {
    if run.success {
        return EXIT_SUCCESS;
    }
    let input_error = run
        .results
        .iter()
        .flat_map(|result| result.errors.iter())
        .any(|error| error.code.is_input_error());
    if input_error {
        EXIT_INPUT_ERROR
    } else {
        EXIT_CONTRACT_FAILURE
    }
}

pub fn render_json(run: &ValidationRunResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(run)
}

pub fn render_human(run: &ValidationRunResult, options: RenderOptions) -> String {
    let mut out = String::new();

    for result in &run.results {
        render_result(&mut out, result, options);
        out.push('\n');
    }

    let summary = format!(
        "{} theme(s) checked: {} passed, {} failed",
        run.summary.total, run.summary.passed, run.summary.failed
    );
    let summary = if run.success {
        style(summary).green().bold()
    } else {
        style(summary).red().bold()
    };
    let _ = writeln!(out, "{}", summary.force_styling(options.color));

    out
}

fn render_result(out: &mut String, result: &ThemeValidationResult, options: RenderOptions) {
    let color = options.color;
    let status = if result.valid {
        style("PASS").green().bold()
    } else {
        style("FAIL").red().bold()
    };
    let label = result.theme_id.theme_id.as_deref().unwrap_or("<no id>");
    let _ = writeln!(
        out,
        "{} {} ({})",
        status.force_styling(color),
        style(label).bold().force_styling(color),
        result.source_path
    );

    if let Some(format) = result.format {
        let _ = writeln!(out, "  Format:    {}", format);
    }
    if let (Some(palette), Some(mode)) = (&result.theme_id.palette, result.theme_id.mode) {
        let _ = writeln!(out, "  Palette:   {palette} ({mode})");
    }

    let found = result
        .contract_version
        .found_version
        .as_deref()
        .unwrap_or("missing");
    let _ = writeln!(
        out,
        "  Contract:  {} (expected {})",
        found, result.contract_version.expected_version
    );
    let _ = writeln!(
        out,
        "  Tokens:    {}/{} required",
        result.tokens.found_count, result.tokens.required_count
    );

    if !result.tokens.missing.is_empty() {
        let missing = &result.tokens.missing;
        let shown = if options.verbose {
            missing.len()
        } else {
            missing.len().min(MISSING_TOKEN_DISPLAY_LIMIT)
        };
        let _ = writeln!(out, "  Missing tokens:");
        for token in &missing[..shown] {
            let _ = writeln!(out, "    - {token}");
        }
        if shown < missing.len() {
            let _ = writeln!(
                out,
                "    ... and {} more (use --verbose to list all)",
                missing.len() - shown
            );
        }
    }

    for error in &result.errors {
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            style("error").red().force_styling(color),
            error.code.as_str(),
            error.message
        );
    }
    for warning in &result.warnings {
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            style("warning").yellow().force_styling(color),
            warning.code.as_str(),
            warning.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ContractVersionValidation, ErrorCode, RunSummary, ThemeFormat, ThemeIdValidation,
        TokenValidation, ValidationError, ValidationWarning, WarningCode,
    };

    fn result(valid: bool, missing: usize, errors: Vec<ErrorCode>) -> ThemeValidationResult {
        let missing: Vec<String> = (0..missing).map(|i| format!("--token-{i:02}")).collect();
        ThemeValidationResult {
            source_path: "themes/ocean.css".to_string(),
            format: Some(ThemeFormat::StyleSheet),
            valid,
            theme_id: ThemeIdValidation {
                valid: true,
                theme_id: Some("ocean-dark".to_string()),
                palette: Some("ocean".to_string()),
                mode: Some(crate::models::ThemeMode::Dark),
                error: None,
            },
            contract_version: ContractVersionValidation {
                valid: true,
                found_version: Some("1.0".to_string()),
                expected_version: "1.0".to_string(),
                error: None,
            },
            tokens: TokenValidation {
                complete: missing.is_empty(),
                required_count: 30,
                found_count: 30 - missing.len(),
                missing,
                extra: Vec::new(),
                duplicates: Vec::new(),
            },
            errors: errors
                .into_iter()
                .map(|code| ValidationError::new(code, "problem"))
                .collect(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_exit_codes() {
        let passing = ValidationRunResult::from_results(vec![result(true, 0, vec![])]);
        assert_eq!(exit_code(&passing), EXIT_SUCCESS);

        let contract = ValidationRunResult::from_results(vec![
            result(true, 0, vec![]),
            result(false, 1, vec![ErrorCode::MissingTokens]),
        ]);
        assert_eq!(exit_code(&contract), EXIT_CONTRACT_FAILURE);

        let input = ValidationRunResult::from_results(vec![
            result(false, 1, vec![ErrorCode::InvalidThemeId]),
            result(false, 30, vec![ErrorCode::FileNotFound]),
        ]);
        assert_eq!(exit_code(&input), EXIT_INPUT_ERROR);

        let unsupported =
            ValidationRunResult::from_results(vec![result(false, 30, vec![ErrorCode::UnsupportedFormat])]);
        assert_eq!(exit_code(&unsupported), EXIT_INPUT_ERROR);
    }

    #[test]
    fn test_human_output_truncates_missing_tokens() {
        let run = ValidationRunResult::from_results(vec![result(
            false,
            14,
            vec![ErrorCode::MissingTokens],
        )]);
        let text = render_human(&run, RenderOptions::default());

        assert!(text.contains("--token-09"));
        assert!(!text.contains("--token-10"));
        assert!(text.contains("... and 4 more"));
        assert!(text.contains("FAIL ocean-dark (themes/ocean.css)"));
        assert!(text.contains("Tokens:    16/30 required"));
        assert!(text.contains("[MISSING_TOKENS] problem"));
    }

    #[test]
    fn test_verbose_lists_every_missing_token() {
        let run = ValidationRunResult::from_results(vec![result(
            false,
            14,
            vec![ErrorCode::MissingTokens],
        )]);
        let options = RenderOptions {
            verbose: true,
            color: false,
        };
        let text = render_human(&run, options);

        assert!(text.contains("--token-13"));
        assert!(!text.contains("more (use --verbose"));
    }

    #[test]
    fn test_human_output_shows_warnings_and_summary() {
        let mut passing = result(true, 0, vec![]);
        passing.warnings.push(ValidationWarning::new(
            WarningCode::DeprecatedToken,
            "Token '--danger' is deprecated",
        ));
        let run = ValidationRunResult::from_results(vec![passing]);
        let text = render_human(&run, RenderOptions::default());

        assert!(text.contains("PASS ocean-dark"));
        assert!(text.contains("Palette:   ocean (dark)"));
        assert!(text.contains("warning [DEPRECATED_TOKEN]"));
        assert!(text.contains("1 theme(s) checked: 1 passed, 0 failed"));
    }

    #[test]
    fn test_json_output_is_lossless() {
        let run = ValidationRunResult::from_results(vec![
            result(true, 0, vec![]),
            result(false, 12, vec![ErrorCode::MissingTokens]),
        ]);
        let json = render_json(&run).unwrap();
        let parsed: ValidationRunResult = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, run);
        assert_eq!(parsed.summary, RunSummary { total: 2, passed: 1, failed: 1 });
        assert_eq!(parsed.results[1].tokens.missing.len(), 12);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"][0]["themeId"]["palette"], "ocean");
        assert_eq!(value["results"][1]["errors"][0]["code"], "MISSING_TOKENS");
    }
}
