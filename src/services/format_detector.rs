// Format Detector
// Picks a parser by file extension, falling back to content sniffing

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::ThemeFormat;

const EXPORT_BINDING_PATTERN: &str = r"\bexport\s+(?:const|let|var)\b";
const VERSION_ANNOTATION_PATTERN: &str = r"(?i)@contract-version\b|\bcontractVersion\s*[:=]";
const ROOT_SELECTOR: &str = ":root";

static EXPORT_BINDING_REGEX: OnceLock<Regex> = OnceLock::new();
static VERSION_ANNOTATION_REGEX: OnceLock<Regex> = OnceLock::new();

fn export_binding_regex() -> &'static Regex {
    EXPORT_BINDING_REGEX
        .get_or_init(|| Regex::new(EXPORT_BINDING_PATTERN).expect("export pattern is valid"))
}

fn version_annotation_regex() -> &'static Regex {
    VERSION_ANNOTATION_REGEX.get_or_init(|| {
        Regex::new(VERSION_ANNOTATION_PATTERN).expect("version annotation pattern is valid")
    })
}

pub fn format_from_extension(path: &Path) -> Option<ThemeFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "css" | "pcss" => Some(ThemeFormat::StyleSheet),
        "json" | "jsonc" => Some(ThemeFormat::StructuredData),
        "ts" | "tsx" | "mts" | "js" | "jsx" | "mjs" => Some(ThemeFormat::SourceSnippet),
        _ => None,
    }
}

pub fn format_from_content(content: &str, reserved_prefix: &str) -> Option<ThemeFormat> {
    let trimmed = content.trim();
    let bracketed = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if bracketed {
        return Some(ThemeFormat::StructuredData);
    }

    if export_binding_regex().is_match(content) || version_annotation_regex().is_match(content) {
        return Some(ThemeFormat::SourceSnippet);
    }

    if content.contains(reserved_prefix) || content.contains(ROOT_SELECTOR) {
        return Some(ThemeFormat::StyleSheet);
    }

    None
}

/// Resolves the format of a theme file; `None` means no heuristic matched.
pub fn detect_format(path: &Path, content: &str, reserved_prefix: &str) -> Option<ThemeFormat> {
    format_from_extension(path).or_else(|| format_from_content(content, reserved_prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_wins_over_content() {
        let detected = detect_format(Path::new("themes/ocean.css"), "{}", "--");
        assert_eq!(detected, Some(ThemeFormat::StyleSheet));

        let detected = detect_format(Path::new("theme.ocean-light.JSON"), "", "--");
        assert_eq!(detected, Some(ThemeFormat::StructuredData));

        let detected = detect_format(Path::new("src/themes.tsx"), "", "--");
        assert_eq!(detected, Some(ThemeFormat::SourceSnippet));
    }

    #[test]
    fn test_sniffs_structured_data() {
        assert_eq!(
            detect_format(Path::new("theme.txt"), "  {\"id\": \"a-dark\"}\n", "--"),
            Some(ThemeFormat::StructuredData)
        );
        assert_eq!(
            detect_format(Path::new("themes"), "[ ]", "--"),
            Some(ThemeFormat::StructuredData)
        );
    }

    #[test]
    fn test_sniffs_source_snippet() {
        assert_eq!(
            format_from_content("export const oceanLight = { }", "--"),
            Some(ThemeFormat::SourceSnippet)
        );
        assert_eq!(
            format_from_content("/** @contract-version 1.0 */", "--"),
            Some(ThemeFormat::SourceSnippet)
        );
    }

    #[test]
    fn test_sniffs_style_sheet() {
        assert_eq!(
            format_from_content("--bg-base: #fff;", "--"),
            Some(ThemeFormat::StyleSheet)
        );
        assert_eq!(
            format_from_content(":root[data-theme='a-dark'] {}", "--"),
            Some(ThemeFormat::StyleSheet)
        );
    }

    #[test]
    fn test_unrecognized_content() {
        assert_eq!(detect_format(Path::new("notes.md"), "# Notes", "--"), None);
    }
}
