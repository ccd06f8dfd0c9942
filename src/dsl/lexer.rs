//! Lexer for definition documents.
//!
//! Converts source text into a stream of [`Token`]s. Malformed input is
//! reported through [`Diagnostics`] and skipped, so one bad character does
//! not hide the rest of the document.

use super::error::{Diagnostic, Diagnostics};
use super::token::{Keyword, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    diagnostics: Diagnostics,
}

impl Lexer {
    pub fn new(document: &str, source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            diagnostics: Diagnostics::new(document),
        }
    }

    /// Tokenize the whole input. The returned stream always ends with `Eof`.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line: self.line,
                    col: self.col,
                });
                break;
            }

            let ch = self.peek();
            let token = match ch {
                '{' => Some(self.single_char(TokenKind::LBrace)),
                '}' => Some(self.single_char(TokenKind::RBrace)),
                '(' => Some(self.single_char(TokenKind::LParen)),
                ')' => Some(self.single_char(TokenKind::RParen)),
                '.' => Some(self.single_char(TokenKind::Dot)),
                '=' => Some(self.single_char(TokenKind::Eq)),
                '"' => self.lex_string(),
                '-' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                    Some(self.lex_number())
                }
                '0'..='9' => Some(self.lex_number()),
                'a'..='z' | 'A'..='Z' | '_' => Some(self.lex_ident_or_keyword()),
                _ => {
                    self.diagnostics.lexical(
                        format!("unexpected character: '{ch}'"),
                        self.line,
                        self.col,
                    );
                    self.resync();
                    None
                }
            };

            if let Some(token) = token {
                tokens.push(token);
            }
        }

        (tokens, self.diagnostics.into_vec())
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Skip whitespace, newlines and `//` comments.
    fn skip_trivia(&mut self) {
        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_next() == Some('/') {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Skip to the next whitespace or punctuation boundary.
    fn resync(&mut self) {
        self.advance();
        while !self.is_at_end() && !is_boundary(self.peek()) {
            self.advance();
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let line = self.line;
        let col = self.col;
        self.advance();
        Token { kind, line, col }
    }

    /// A string runs to the next `"`, across lines if needed. Without a
    /// closing quote the rest of the opening line is skipped.
    fn lex_string(&mut self) -> Option<Token> {
        let line = self.line;
        let col = self.col;
        self.advance(); // opening '"'

        let closed = self.chars[self.pos..].contains(&'"');
        if !closed {
            self.diagnostics
                .lexical("unterminated string literal", line, col);
            while !self.is_at_end() && self.peek() != '\n' {
                self.advance();
            }
            return None;
        }

        let mut s = String::new();
        while self.peek() != '"' {
            s.push(self.advance());
        }
        self.advance(); // closing '"'
        Some(Token {
            kind: TokenKind::Str(s),
            line,
            col,
        })
    }

    fn lex_number(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut s = String::new();

        if self.peek() == '-' {
            s.push(self.advance());
        }
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            s.push(self.advance());
        }
        if !self.is_at_end()
            && self.peek() == '.'
            && self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            s.push(self.advance());
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                s.push(self.advance());
            }
        }

        // The scanned text is always `-?[0-9]+(\.[0-9]+)?`, which f64 accepts.
        let value = s.parse::<f64>().unwrap_or_default();
        Token {
            kind: TokenKind::Number(value, s),
            line,
            col,
        }
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut s = String::new();

        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            s.push(self.advance());
        }

        let kind = match Keyword::from_word(&s) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(s),
        };

        Token { kind, line, col }
    }
}

fn is_boundary(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '{' | '}' | '(' | ')' | '.' | '=' | '"')
}
