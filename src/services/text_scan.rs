// Text Scanning Helpers
// Quote-aware primitives shared by the style-sheet, structured-data and contract loaders

/// Removes `//` and `/* */` comments outside double-quoted strings, keeping line breaks.
pub fn strip_jsonc_comments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                output.push(ch);
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' {
                if let Some('/') = chars.peek() {
                    chars.next();
                    in_block_comment = false;
                }
                continue;
            }
            if ch == '\n' {
                output.push(ch);
            }
            continue;
        }

        if in_string {
            output.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            output.push(ch);
            continue;
        }

        if ch == '/' {
            match chars.peek() {
                Some('/') => {
                    chars.next();
                    in_line_comment = true;
                    continue;
                }
                Some('*') => {
                    chars.next();
                    in_block_comment = true;
                    continue;
                }
                _ => {}
            }
        }

        output.push(ch);
    }

    output
}

/// Removes `/* */` comments outside single- or double-quoted strings.
pub fn strip_css_comments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;
    let mut escape = false;
    let mut in_comment = false;

    while let Some(ch) = chars.next() {
        if in_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_comment = false;
            } else if ch == '\n' {
                output.push(ch);
            }
            continue;
        }

        if let Some(q) = quote {
            output.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                output.push(ch);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_comment = true;
            }
            _ => output.push(ch),
        }
    }

    output
}

/// Blanks out comments and the contents of string and template literals.
///
/// Byte offsets and line breaks are preserved, so a match in the masked text
/// indexes the same position in the input. Unterminated `'`/`"` strings end
/// at the line break.
pub fn mask_comments_and_strings(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    let blank = |output: &mut String, ch: char| {
        if ch == '\n' {
            output.push('\n');
        } else {
            output.extend(std::iter::repeat(' ').take(ch.len_utf8()));
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'/') => {
                blank(&mut output, ch);
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    blank(&mut output, next);
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                blank(&mut output, ch);
                if let Some(star) = chars.next() {
                    blank(&mut output, star);
                }
                let mut previous = ' ';
                for next in chars.by_ref() {
                    blank(&mut output, next);
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            '"' | '\'' | '`' => {
                output.push(ch);
                let mut escape = false;
                while let Some(&next) = chars.peek() {
                    if next == '\n' && ch != '`' {
                        break;
                    }
                    chars.next();
                    if escape {
                        escape = false;
                    } else if next == '\\' {
                        escape = true;
                    } else if next == ch {
                        output.push(next);
                        break;
                    }
                    blank(&mut output, next);
                }
            }
            _ => output.push(ch),
        }
    }

    output
}

/// Finds the `}` closing the `{` at byte offset `open`.
///
/// Braces inside quoted literals do not count towards the depth.
pub fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    if text.as_bytes().get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escape = false;

    for (offset, ch) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// Splits text into declaration-sized segments on `;`, `{` and `}`.
///
/// Separators inside quotes or parentheses are kept, so `url("a;b")` stays whole.
pub fn split_declarations(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escape = false;
    let mut parens = 0usize;

    for (index, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            ';' | '{' | '}' if parens == 0 => {
                segments.push(&text[start..index]);
                start = index + ch.len_utf8();
            }
            _ => {}
        }
    }

    if start < text.len() {
        segments.push(&text[start..]);
    }

    segments
}

/// Splits `name: value` into its trimmed halves when `name` carries `prefix`.
pub fn split_declaration<'a>(segment: &'a str, prefix: &str) -> Option<(&'a str, &'a str)> {
    let trimmed = segment.trim();
    if !trimmed.starts_with(prefix) {
        return None;
    }
    let (name, value) = trimmed.split_once(':')?;
    let name = name.trim();
    if name.len() <= prefix.len() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, value.trim()))
}

/// Drops one pair of matching surrounding quotes.
pub fn strip_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['"', '\'', '`'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_jsonc_comments_keeps_strings() {
        let input = "{\n  // comment\n  \"url\": \"http://x\", /* block */ \"a\": 1\n}";
        let output = strip_jsonc_comments(input);
        assert!(output.contains("\"http://x\""));
        assert!(!output.contains("comment"));
        assert!(!output.contains("block"));
        assert!(serde_json::from_str::<serde_json::Value>(&output).is_ok());
    }

    #[test]
    fn test_strip_css_comments() {
        let output = strip_css_comments("--a: 1; /* --b: 2; */ --c: \"/* kept */\";");
        assert!(!output.contains("--b"));
        assert!(output.contains("\"/* kept */\""));
    }

    #[test]
    fn test_matching_brace_skips_quoted_braces() {
        let text = r#"x { --a: "}"; --b: '{'; --c: 1; } tail"#;
        let open = text.find('{').unwrap();
        let close = find_matching_brace(text, open).unwrap();
        assert_eq!(&text[close..], "} tail");
    }

    #[test]
    fn test_matching_brace_nested_and_unbalanced() {
        let text = "{ a { b } c }";
        assert_eq!(find_matching_brace(text, 0), Some(text.len() - 1));
        assert_eq!(find_matching_brace("{ a { b }", 0), None);
        assert_eq!(find_matching_brace("a", 0), None);
    }

    #[test]
    fn test_split_declarations_respects_quotes_and_parens() {
        let segments = split_declarations(r#"--a: url("x;y"); --b: "c;d"; --e: f"#);
        let trimmed: Vec<&str> = segments.iter().map(|s| s.trim()).collect();
        assert_eq!(trimmed, vec![r#"--a: url("x;y")"#, r#"--b: "c;d""#, "--e: f"]);
    }

    #[test]
    fn test_split_declaration_requires_prefix() {
        assert_eq!(split_declaration("  --bg-base: #fff ", "--"), Some(("--bg-base", "#fff")));
        assert_eq!(split_declaration("color: red", "--"), None);
        assert_eq!(split_declaration("--: red", "--"), None);
        assert_eq!(split_declaration(":root[data-theme=\"x\"]", "--"), None);
    }

    #[test]
    fn test_mask_comments_and_strings_keeps_offsets() {
        let input = "a // export x\nb /* é */ 'it\\'s' \"q\" `t\nu` c";
        let masked = mask_comments_and_strings(input);

        assert_eq!(masked.len(), input.len());
        assert_eq!(masked.matches('\n').count(), 2);
        assert!(!masked.contains("export"));
        assert!(!masked.contains('é'));
        assert!(!masked.contains("it"));
        assert!(masked.starts_with("a "));
        assert!(masked.ends_with(" c"));
        assert_eq!(masked.find('b'), input.find('b'));
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"1.0\""), "1.0");
        assert_eq!(strip_quotes("'1.0'"), "1.0");
        assert_eq!(strip_quotes("1.0"), "1.0");
        assert_eq!(strip_quotes("\"1.0'"), "\"1.0'");
    }
}
