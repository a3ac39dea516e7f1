// Source Snippet Lexer
// Tokenizes the restricted object-literal subset of TypeScript/JavaScript theme sources

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Template { text: String, interpolated: bool },
    Number(String),
    Spread,
    Punct(char),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => f.write_str(name),
            TokenKind::Str(text) => write!(f, "'{text}'"),
            TokenKind::Template { text, .. } => write!(f, "`{text}`"),
            TokenKind::Number(text) => f.write_str(text),
            TokenKind::Spread => f.write_str("..."),
            TokenKind::Punct(ch) => write!(f, "{ch}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn is_punct(&self, expected: char) -> bool {
        self.kind == TokenKind::Punct(expected)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal on line {0}")]
    UnterminatedString(usize),

    #[error("unterminated comment starting on line {0}")]
    UnterminatedComment(usize),
}

/// On-demand tokenizer; it never reads past the token the parser asks for.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub fn new(input: &str, first_line: usize) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: first_line,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_trivia()?;

        let Some(ch) = self.current() else {
            return Ok(None);
        };
        let line = self.line;

        let kind = match ch {
            '"' | '\'' => TokenKind::Str(self.read_string(ch)?),
            '`' => self.read_template()?,
            '.' if self.peek_at(1) == Some('.') && self.peek_at(2) == Some('.') => {
                self.pos += 3;
                TokenKind::Spread
            }
            c if c.is_ascii_digit() => TokenKind::Number(self.read_while(|c| {
                c.is_ascii_alphanumeric() || c == '.' || c == '_'
            })),
            c if is_ident_start(c) => TokenKind::Ident(self.read_while(is_ident_continue)),
            c => {
                self.pos += 1;
                TokenKind::Punct(c)
            }
        };

        Ok(Some(Token { kind, line }))
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match (self.current(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.advance();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.current() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.line;
                    self.pos += 2;
                    loop {
                        match self.advance() {
                            Some('*') if self.current() == Some('/') => {
                                self.pos += 1;
                                break;
                            }
                            Some(_) => {}
                            None => return Err(LexError::UnterminatedComment(start)),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.line;
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('\\') => match self.advance() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some(other) => text.push(other),
                    None => return Err(LexError::UnterminatedString(start)),
                },
                Some(c) if c == quote => return Ok(text),
                Some('\n') | None => return Err(LexError::UnterminatedString(start)),
                Some(c) => text.push(c),
            }
        }
    }

    fn read_template(&mut self) -> Result<TokenKind, LexError> {
        let start = self.line;
        self.pos += 1;
        let mut text = String::new();
        let mut interpolated = false;
        loop {
            match self.advance() {
                Some('\\') => match self.advance() {
                    Some(other) => text.push(other),
                    None => return Err(LexError::UnterminatedString(start)),
                },
                Some('`') => return Ok(TokenKind::Template { text, interpolated }),
                Some('$') if self.current() == Some('{') => {
                    interpolated = true;
                    text.push('$');
                }
                Some(c) => text.push(c),
                None => return Err(LexError::UnterminatedString(start)),
            }
        }
    }

    fn read_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.current() {
            if !keep(c) {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
        text
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
