// Style-Sheet Theme Parser
// Extracts `:root[data-theme="..."] { --token: value; }` blocks

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{ParsedTheme, ThemeFormat};
use crate::services::parse_error::ParseError;
use crate::services::text_scan::{
    find_matching_brace, split_declaration, split_declarations, strip_css_comments,
};

const THEME_SELECTOR_PATTERN: &str =
    r#":root\s*\[\s*data-theme\s*=\s*(?:"([^"]*)"|'([^']*)')\s*\]"#;

static THEME_SELECTOR_REGEX: OnceLock<Regex> = OnceLock::new();

fn theme_selector_regex() -> &'static Regex {
    THEME_SELECTOR_REGEX
        .get_or_init(|| Regex::new(THEME_SELECTOR_PATTERN).expect("theme selector pattern is valid"))
}

/// Parses a style sheet into one theme per root-scope theme block.
///
/// A file without any theme block is read as a single anonymous theme, which
/// covers bare token fragments.
pub fn parse_style_sheet(
    content: &str,
    source_path: &str,
    reserved_prefix: &str,
) -> Result<Vec<ParsedTheme>, ParseError> {
    let text = strip_css_comments(content);
    let mut themes = Vec::new();
    let mut cursor = 0;

    for captures in theme_selector_regex().captures_iter(&text) {
        let Some(selector) = captures.get(0) else {
            continue;
        };
        if selector.start() < cursor {
            // Selector text inside an earlier block's value
            continue;
        }

        let theme_id = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str().trim().to_string());
        let label = theme_id.clone().unwrap_or_default();

        let open = find_block_open(&text, selector.end()).ok_or_else(|| {
            ParseError::Malformed(format!("Theme selector for '{label}' has no block"))
        })?;
        let close = find_matching_brace(&text, open).ok_or_else(|| {
            ParseError::Malformed(format!("Unclosed block for theme '{label}'"))
        })?;

        let mut theme = ParsedTheme::new(theme_id, source_path, ThemeFormat::StyleSheet);
        collect_declarations(&text[open + 1..close], reserved_prefix, &mut theme);
        log::debug!(
            "Parsed style-sheet block '{}' from {} ({} tokens)",
            label,
            source_path,
            theme.tokens.len()
        );
        themes.push(theme);
        cursor = close + 1;
    }

    if themes.is_empty() {
        let mut theme = ParsedTheme::new(None, source_path, ThemeFormat::StyleSheet);
        collect_declarations(&text, reserved_prefix, &mut theme);
        log::debug!(
            "No theme blocks in {}, parsed as anonymous theme ({} tokens)",
            source_path,
            theme.tokens.len()
        );
        themes.push(theme);
    }

    Ok(themes)
}

/// Finds the `{` opening the rule a selector belongs to, allowing a selector list in between.
fn find_block_open(text: &str, from: usize) -> Option<usize> {
    let rest = &text[from..];
    let offset = rest.find(['{', ';', '}'])?;
    if rest.as_bytes()[offset] == b'{' {
        Some(from + offset)
    } else {
        None
    }
}

fn collect_declarations(body: &str, reserved_prefix: &str, theme: &mut ParsedTheme) {
    for segment in split_declarations(body) {
        if let Some((name, value)) = split_declaration(segment, reserved_prefix) {
            theme.insert_token(name, value);
        }
    }
}
