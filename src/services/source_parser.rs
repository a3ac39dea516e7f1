// Source Snippet Theme Parser
// Extracts themes from exported object-literal bindings (`export const oceanLight = { ... }`)
//
// Supported subset: string/number/boolean literals, nested object literals and
// arrays. Spreads, references, calls and template interpolation are recognized
// but refused, so a theme is never silently under-extracted.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{ParsedTheme, ThemeFormat};
use crate::services::parse_error::ParseError;
use crate::services::source_lexer::{LexError, Lexer, Token, TokenKind};
use crate::services::text_scan::mask_comments_and_strings;

const EXPORT_BINDING_PATTERN: &str =
    r"\bexport\s+(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*(?::[^=;{]*?)?=\s*\{";
const ID_FIELDS: [&str; 2] = ["id", "themeId"];
const TOKENS_FIELD: &str = "tokens";
const THEME_NAME_HINT: &str = "theme";

static EXPORT_BINDING_REGEX: OnceLock<Regex> = OnceLock::new();

fn export_binding_regex() -> &'static Regex {
    EXPORT_BINDING_REGEX
        .get_or_init(|| Regex::new(EXPORT_BINDING_PATTERN).expect("export binding pattern is valid"))
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Str(String),
    Number(String),
    Bool(bool),
    Null,
    Object(Vec<Property>),
    Array(Vec<Literal>),
    /// Anything outside the supported subset, with a short description
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Property {
    /// `None` for spread entries
    key: Option<String>,
    value: Literal,
}

fn find_property<'a>(properties: &'a [Property], name: &str) -> Option<&'a Literal> {
    properties
        .iter()
        .rev()
        .find(|p| p.key.as_deref() == Some(name))
        .map(|p| &p.value)
}

struct ObjectParser {
    lexer: Lexer,
    peeked: Option<Token>,
}

impl ObjectParser {
    fn new(input: &str, first_line: usize) -> Self {
        Self {
            lexer: Lexer::new(input, first_line),
            peeked: None,
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token().map_err(lex_error)?;
        }
        Ok(self.peeked.as_ref())
    }

    fn bump(&mut self) -> Result<Option<Token>, ParseError> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        self.lexer.next_token().map_err(lex_error)
    }

    fn bump_required(&mut self) -> Result<Token, ParseError> {
        self.bump()?.ok_or_else(|| {
            ParseError::Malformed(format!(
                "unexpected end of input after line {}",
                self.lexer.line()
            ))
        })
    }

    fn peek_is_punct(&mut self, expected: char) -> Result<bool, ParseError> {
        Ok(self.peek()?.map(|t| t.is_punct(expected)).unwrap_or(false))
    }

    fn parse_object(&mut self) -> Result<Vec<Property>, ParseError> {
        let open = self.bump_required()?;
        if !open.is_punct('{') {
            return Err(unexpected(&open, "`{`"));
        }

        let mut properties = Vec::new();
        loop {
            let token = match self.peek()? {
                Some(token) => token.clone(),
                None => return Err(self.unexpected_end()),
            };

            match &token.kind {
                TokenKind::Punct('}') => {
                    self.bump()?;
                    return Ok(properties);
                }
                TokenKind::Spread => {
                    self.bump()?;
                    let target = self.skip_expression()?;
                    properties.push(Property {
                        key: None,
                        value: Literal::Unsupported(format!("a spread of `{target}`")),
                    });
                }
                TokenKind::Punct('[') => {
                    let computed = self.skip_expression()?;
                    properties.push(Property {
                        key: None,
                        value: Literal::Unsupported(format!("a computed key `{computed}`")),
                    });
                }
                TokenKind::Ident(key) | TokenKind::Str(key) | TokenKind::Number(key) => {
                    let key = key.clone();
                    self.bump()?;
                    let value = if self.peek_is_punct(':')? {
                        self.bump()?;
                        self.parse_value()?
                    } else if self.peek_is_punct(',')? || self.peek_is_punct('}')? {
                        Literal::Unsupported(format!("a reference to `{key}`"))
                    } else if self.peek_is_punct('(')? {
                        self.skip_expression()?;
                        Literal::Unsupported(format!("a method `{key}()`"))
                    } else {
                        let next = self.bump_required()?;
                        return Err(unexpected(&next, "`:`"));
                    };
                    properties.push(Property {
                        key: Some(key),
                        value,
                    });
                }
                _ => return Err(unexpected(&token, "a property name")),
            }

            if self.peek_is_punct(',')? {
                self.bump()?;
            } else if !self.peek_is_punct('}')? {
                let next = self.bump_required()?;
                return Err(unexpected(&next, "`,` or `}`"));
            }
        }
    }

    fn parse_array(&mut self) -> Result<Vec<Literal>, ParseError> {
        let open = self.bump_required()?;
        if !open.is_punct('[') {
            return Err(unexpected(&open, "`[`"));
        }

        let mut items = Vec::new();
        loop {
            if self.peek_is_punct(']')? {
                self.bump()?;
                return Ok(items);
            }
            if self.peek()?.map(|t| t.kind == TokenKind::Spread).unwrap_or(false) {
                self.bump()?;
                let target = self.skip_expression()?;
                items.push(Literal::Unsupported(format!("a spread of `{target}`")));
            } else {
                items.push(self.parse_value()?);
            }

            if self.peek_is_punct(',')? {
                self.bump()?;
            } else if !self.peek_is_punct(']')? {
                let next = self.bump_required()?;
                return Err(unexpected(&next, "`,` or `]`"));
            }
        }
    }

    fn parse_value(&mut self) -> Result<Literal, ParseError> {
        let token = match self.peek()? {
            Some(token) => token.clone(),
            None => return Err(self.unexpected_end()),
        };

        let literal = match token.kind {
            TokenKind::Punct('{') => Literal::Object(self.parse_object()?),
            TokenKind::Punct('[') => Literal::Array(self.parse_array()?),
            TokenKind::Str(text) => {
                self.bump()?;
                Literal::Str(text)
            }
            TokenKind::Template {
                text,
                interpolated: false,
            } => {
                self.bump()?;
                Literal::Str(text)
            }
            TokenKind::Number(text) => {
                self.bump()?;
                Literal::Number(text)
            }
            TokenKind::Ident(ref word) if word == "true" || word == "false" => {
                self.bump()?;
                Literal::Bool(word == "true")
            }
            TokenKind::Ident(ref word) if word == "null" => {
                self.bump()?;
                Literal::Null
            }
            TokenKind::Punct('-') => {
                self.bump()?;
                match self.peek()?.map(|t| t.kind.clone()) {
                    Some(TokenKind::Number(text)) => {
                        self.bump()?;
                        Literal::Number(format!("-{text}"))
                    }
                    _ => {
                        let rest = self.skip_expression()?;
                        return Ok(Literal::Unsupported(format!("an expression `-{rest}`")));
                    }
                }
            }
            _ => {
                let expression = self.skip_expression()?;
                return Ok(Literal::Unsupported(format!("an expression `{expression}`")));
            }
        };

        // Type assertions (`as const`, `satisfies T`) leave the value unchanged
        let trailing = match self.peek()? {
            Some(token) => token.clone(),
            None => return Ok(literal),
        };
        match trailing.kind {
            TokenKind::Punct(',') | TokenKind::Punct('}') | TokenKind::Punct(']') => Ok(literal),
            TokenKind::Ident(ref word) if word == "as" || word == "satisfies" => {
                self.skip_expression()?;
                Ok(literal)
            }
            _ => {
                let rest = self.skip_expression()?;
                Ok(Literal::Unsupported(format!("an expression ending in `{rest}`")))
            }
        }
    }

    /// Consumes tokens up to the next `,`, `}`, `]` or `)` at nesting depth zero.
    fn skip_expression(&mut self) -> Result<String, ParseError> {
        let mut depth = 0usize;
        let mut parts = Vec::new();
        loop {
            let token = match self.peek()? {
                Some(token) => token.clone(),
                None => return Err(self.unexpected_end()),
            };
            match token.kind {
                TokenKind::Punct(',') | TokenKind::Punct(';') if depth == 0 => break,
                TokenKind::Punct('}') | TokenKind::Punct(']') | TokenKind::Punct(')')
                    if depth == 0 =>
                {
                    break
                }
                TokenKind::Punct('{') | TokenKind::Punct('[') | TokenKind::Punct('(') => depth += 1,
                TokenKind::Punct('}') | TokenKind::Punct(']') | TokenKind::Punct(')') => depth -= 1,
                _ => {}
            }
            parts.push(token.kind.to_string());
            self.bump()?;
        }
        Ok(parts.join(" "))
    }

    fn unexpected_end(&self) -> ParseError {
        ParseError::Malformed(format!(
            "unexpected end of input after line {}",
            self.lexer.line()
        ))
    }
}

fn lex_error(error: LexError) -> ParseError {
    ParseError::Malformed(error.to_string())
}

fn unexpected(token: &Token, expected: &str) -> ParseError {
    ParseError::Malformed(format!(
        "expected {expected} but found `{}` on line {}",
        token.kind, token.line
    ))
}

/// Parses exported object-literal theme bindings from a source file.
pub fn parse_source_snippet(
    content: &str,
    source_path: &str,
    reserved_prefix: &str,
) -> Result<Vec<ParsedTheme>, ParseError> {
    // Exports inside comments or string literals are not bindings
    let masked = mask_comments_and_strings(content);
    let regex = export_binding_regex();
    let matches: Vec<_> = regex.captures_iter(&masked).collect();
    let mut themes = Vec::new();

    for (index, captures) in matches.iter().enumerate() {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let name = name.as_str();
        let open = whole.end() - 1;
        let window_end = matches
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(content.len());

        if !looks_like_theme(name, &content[open..window_end], reserved_prefix) {
            log::debug!("Skipping export '{}' in {}: not a theme binding", name, source_path);
            continue;
        }

        let first_line = content[..open].matches('\n').count() + 1;
        let mut parser = ObjectParser::new(&content[open..], first_line);
        let properties = parser.parse_object().map_err(|e| match e {
            ParseError::Malformed(message) => {
                ParseError::Malformed(format!("in export '{name}': {message}"))
            }
            other => other,
        })?;

        if let Some(theme) = build_theme(name, &properties, source_path, reserved_prefix)? {
            log::debug!(
                "Parsed source binding '{}' from {} ({} tokens)",
                name,
                source_path,
                theme.tokens.len()
            );
            themes.push(theme);
        }
    }

    if themes.is_empty() {
        return Err(ParseError::Unsupported(
            "no exported theme object literal found".to_string(),
        ));
    }

    Ok(themes)
}

fn looks_like_theme(name: &str, body: &str, reserved_prefix: &str) -> bool {
    name.to_lowercase().contains(THEME_NAME_HINT)
        || body.contains(reserved_prefix)
        || body.contains(TOKENS_FIELD)
}

fn build_theme(
    name: &str,
    properties: &[Property],
    source_path: &str,
    reserved_prefix: &str,
) -> Result<Option<ParsedTheme>, ParseError> {
    // A spread or computed member could carry the id or any token
    if let Some(member) = properties.iter().find(|p| p.key.is_none()) {
        return Err(ParseError::Unsupported(format!(
            "'{name}' uses {}",
            describe(&member.value)
        )));
    }

    let explicit_id = match ID_FIELDS.iter().find_map(|field| find_property(properties, field)) {
        Some(Literal::Str(id)) => Some(id.trim().to_string()),
        Some(_) => {
            return Err(ParseError::Unsupported(format!(
                "theme id of '{name}' must be a string literal"
            )))
        }
        None => None,
    };

    let token_properties: Vec<&Property> = match find_property(properties, TOKENS_FIELD) {
        Some(Literal::Object(tokens)) => tokens.iter().collect(),
        Some(other) => {
            return Err(ParseError::Unsupported(format!(
                "token container of '{name}' must be an object literal, found {}",
                describe(other)
            )))
        }
        None => properties
            .iter()
            .filter(|p| p.key.as_deref().map(|k| k.starts_with(reserved_prefix)).unwrap_or(false))
            .collect(),
    };

    let has_container = find_property(properties, TOKENS_FIELD).is_some();
    if explicit_id.is_none() && !has_container && token_properties.is_empty() {
        log::debug!("Export '{}' in {} has no theme data", name, source_path);
        return Ok(None);
    }

    let theme_id = explicit_id.or_else(|| theme_id_from_binding(name));
    let mut theme = ParsedTheme::new(theme_id, source_path, ThemeFormat::SourceSnippet);

    for property in token_properties {
        let Some(key) = property.key.as_deref() else {
            return Err(ParseError::Unsupported(format!(
                "tokens of '{name}' use {}",
                describe(&property.value)
            )));
        };
        if !key.starts_with(reserved_prefix) {
            continue;
        }
        match &property.value {
            Literal::Str(value) | Literal::Number(value) => theme.insert_token(key, value),
            Literal::Bool(flag) => theme.insert_token(key, &flag.to_string()),
            other => {
                return Err(ParseError::Unsupported(format!(
                    "token '{key}' of '{name}' uses {}",
                    describe(other)
                )))
            }
        }
    }

    Ok(Some(theme))
}

fn describe(literal: &Literal) -> String {
    match literal {
        Literal::Str(_) => "a string".to_string(),
        Literal::Number(_) => "a number".to_string(),
        Literal::Bool(_) => "a boolean".to_string(),
        Literal::Null => "null".to_string(),
        Literal::Object(_) => "a nested object".to_string(),
        Literal::Array(_) => "an array".to_string(),
        Literal::Unsupported(description) => description.clone(),
    }
}

/// Derives `<palette>-<mode>` from a binding name such as `oceanLight` or `NORD_DARK_THEME`.
fn theme_id_from_binding(name: &str) -> Option<String> {
    let mut kebab = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;

    for ch in name.chars() {
        if matches!(ch, '_' | '$' | '-') {
            if !kebab.is_empty() && !kebab.ends_with('-') {
                kebab.push('-');
            }
        } else {
            let boundary = ch.is_ascii_uppercase()
                && previous.map(|p| p.is_ascii_lowercase() || p.is_ascii_digit()).unwrap_or(false);
            if boundary && !kebab.ends_with('-') {
                kebab.push('-');
            }
            kebab.push(ch.to_ascii_lowercase());
        }
        previous = Some(ch);
    }

    let mut segments: Vec<&str> = kebab.split('-').filter(|s| !s.is_empty()).collect();
    if segments.last() == Some(&THEME_NAME_HINT) {
        segments.pop();
    }
    if segments.first() == Some(&THEME_NAME_HINT) {
        segments.remove(0);
    }
    if segments.len() < 2 {
        return None;
    }

    match segments.last() {
        Some(&"light") | Some(&"dark") => Some(segments.join("-")),
        _ => None,
    }
}
