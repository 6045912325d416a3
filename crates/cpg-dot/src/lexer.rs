//! Tokenizer for the DOT language

use crate::error::ParseError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted identifier or numeral. Keywords are identifiers too.
    Id(String),
    /// Double-quoted string, escapes already resolved.
    Quoted(String),
    /// `<...>` string without its outer brackets.
    Html(String),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equals,
    Semicolon,
    Comma,
    Colon,
    Plus,
    /// `->`
    Arrow,
    /// `--`
    Line,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Id(s) => write!(f, "`{}`", s),
            TokenKind::Quoted(s) => write!(f, "\"{}\"", s),
            TokenKind::Html(s) => write!(f, "<{}>", s),
            TokenKind::LBrace => f.write_str("`{`"),
            TokenKind::RBrace => f.write_str("`}`"),
            TokenKind::LBracket => f.write_str("`[`"),
            TokenKind::RBracket => f.write_str("`]`"),
            TokenKind::Equals => f.write_str("`=`"),
            TokenKind::Semicolon => f.write_str("`;`"),
            TokenKind::Comma => f.write_str("`,`"),
            TokenKind::Colon => f.write_str("`:`"),
            TokenKind::Plus => f.write_str("`+`"),
            TokenKind::Arrow => f.write_str("`->`"),
            TokenKind::Line => f.write_str("`--`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Case-insensitive keyword match on an unquoted identifier.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Id(s) if s.eq_ignore_ascii_case(keyword))
    }
}

fn is_id_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_id_continue(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

/// Lazy tokenizer: tokens are produced on demand, one graph at a time.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
            if !c.is_whitespace() {
                self.at_line_start = false;
            }
        }
        Some(c)
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump_char() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Skip whitespace and comments. `#` starts a comment only as the first
    /// non-blank character of a line (C preprocessor output).
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.bump_char();
                }
                Some('#') if self.at_line_start => self.skip_line(),
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.next() {
                        Some('/') => self.skip_line(),
                        Some('*') => {
                            let (line, column) = (self.line, self.column);
                            self.bump_char();
                            self.bump_char();
                            let mut closed = false;
                            while let Some(c) = self.bump_char() {
                                if c == '*' && self.peek_char() == Some('/') {
                                    self.bump_char();
                                    closed = true;
                                    break;
                                }
                            }
                            if !closed {
                                return Err(ParseError::Unterminated {
                                    line,
                                    column,
                                    what: "comment",
                                });
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Next token, or `None` at the end of the input.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek_char() else {
            return Ok(None);
        };

        let kind = match c {
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '=' => self.single(TokenKind::Equals),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '+' => self.single(TokenKind::Plus),
            '"' => self.quoted(line, column)?,
            '<' => self.html(line, column)?,
            '-' => {
                self.bump_char();
                match self.peek_char() {
                    Some('>') => self.single(TokenKind::Arrow),
                    Some('-') => self.single(TokenKind::Line),
                    Some(d) if d.is_ascii_digit() || d == '.' => {
                        let mut numeral = String::from("-");
                        self.numeral(&mut numeral);
                        TokenKind::Id(numeral)
                    }
                    _ => return Err(ParseError::InvalidChar { line, column, ch: '-' }),
                }
            }
            d if d.is_ascii_digit() || d == '.' => {
                let mut numeral = String::new();
                self.numeral(&mut numeral);
                if numeral == "." {
                    return Err(ParseError::InvalidChar { line, column, ch: '.' });
                }
                TokenKind::Id(numeral)
            }
            s if is_id_start(s) => {
                let mut id = String::new();
                while let Some(c) = self.peek_char().filter(|&c| is_id_continue(c)) {
                    id.push(c);
                    self.bump_char();
                }
                TokenKind::Id(id)
            }
            other => return Err(ParseError::InvalidChar { line, column, ch: other }),
        };

        Ok(Some(Token { kind, line, column }))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump_char();
        kind
    }

    fn numeral(&mut self, out: &mut String) {
        let mut seen_dot = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                seen_dot |= c == '.';
                out.push(c);
                self.bump_char();
            } else {
                break;
            }
        }
    }

    /// Only `\"` is unescaped and backslash-newline is a line
    /// continuation; every other escape is kept verbatim.
    fn quoted(&mut self, line: usize, column: usize) -> Result<TokenKind, ParseError> {
        self.bump_char();
        let mut value = String::new();
        loop {
            match self.bump_char() {
                None => {
                    return Err(ParseError::Unterminated {
                        line,
                        column,
                        what: "string",
                    })
                }
                Some('"') => return Ok(TokenKind::Quoted(value)),
                Some('\\') => match self.peek_char() {
                    Some('"') => {
                        self.bump_char();
                        value.push('"');
                    }
                    Some('\n') => {
                        self.bump_char();
                    }
                    Some('\r') => {
                        self.bump_char();
                        if self.peek_char() == Some('\n') {
                            self.bump_char();
                        }
                    }
                    _ => value.push('\\'),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn html(&mut self, line: usize, column: usize) -> Result<TokenKind, ParseError> {
        self.bump_char();
        let mut value = String::new();
        let mut depth = 1;
        loop {
            match self.bump_char() {
                None => {
                    return Err(ParseError::Unterminated {
                        line,
                        column,
                        what: "HTML string",
                    })
                }
                Some('<') => {
                    depth += 1;
                    value.push('<');
                }
                Some('>') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(TokenKind::Html(value));
                    }
                    value.push('>');
                }
                Some(c) => value.push(c),
            }
        }
    }
}
