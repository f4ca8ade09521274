//! Expression lexer.
//!
//! The [`Lexer`] converts expression source into [`Token`]s, dispatching on
//! the first character. Lexemes are copied into the arena.

use bracketed_core::{ParseError, ParseErrorKind, Span};
use bumpalo::Bump;

use super::token::{Token, TokenKind, lookup_keyword};
use crate::lexer::{Cursor, Mark, is_ident_continue, is_ident_start, regex_literal_len};

/// Lexer for one expression.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
        }
    }

    /// Lex the whole expression, ending with an [`TokenKind::Eof`] token.
    pub fn tokenize(mut self) -> Result<bumpalo::collections::Vec<'ast, Token<'ast>>, ParseError> {
        let mut tokens = bumpalo::collections::Vec::new_in(self.arena);
        loop {
            let token = self.next_token()?;
            tokens.push(token);
            if token.kind == TokenKind::Eof {
                return Ok(tokens);
            }
        }
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Result<Token<'ast>, ParseError> {
        self.cursor.eat_while(char::is_whitespace);

        let start = self.cursor.mark();
        let Some(c) = self.cursor.peek() else {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                Span::point(start.line, start.column),
            ));
        };

        match c {
            '"' | '\'' => self.scan_string(c, start),
            '/' => self.scan_slash(start),
            c if c.is_ascii_digit() => self.scan_number(start),
            '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start)
            }
            c if is_ident_start(c) => Ok(self.scan_identifier(start)),
            _ => self.scan_operator(start),
        }
    }

    fn make_token(&self, kind: TokenKind, start: Mark) -> Token<'ast> {
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start.offset));
        Token::new(kind, lexeme, self.cursor.span_from(start))
    }

    // =========================================
    // Scanning: Strings
    // =========================================

    fn scan_string(&mut self, quote: char, start: Mark) -> Result<Token<'ast>, ParseError> {
        self.cursor.advance();
        loop {
            match self.cursor.advance() {
                None => {
                    return Err(ParseError::unterminated_string(
                        self.cursor.span_from(start),
                        quote,
                    ));
                }
                Some('\\') => {
                    self.cursor.advance();
                }
                Some(c) if c == quote => return Ok(self.make_token(TokenKind::String, start)),
                Some(_) => {}
            }
        }
    }

    // =========================================
    // Scanning: Slash
    // =========================================

    /// A slash is a regex literal when the preceding text allows one and the
    /// literal is complete; otherwise it is division.
    fn scan_slash(&mut self, start: Mark) -> Result<Token<'ast>, ParseError> {
        let before = &self.cursor.source()[..start.offset as usize];
        if let Some(len) = regex_literal_len(before, self.cursor.rest()) {
            self.cursor.advance_bytes(len);
            return Ok(self.make_token(TokenKind::Regex, start));
        }
        self.cursor.advance();
        Ok(self.make_token(TokenKind::Slash, start))
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    fn scan_number(&mut self, start: Mark) -> Result<Token<'ast>, ParseError> {
        if self.cursor.check_str("0x") || self.cursor.check_str("0X") {
            self.cursor.advance_bytes(2);
            if self.cursor.eat_while(|c| c.is_ascii_hexdigit()).is_empty() {
                return Err(self.invalid_number(start));
            }
        } else {
            self.cursor.eat_while(|c| c.is_ascii_digit());
            if self.cursor.eat('.') {
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
            if self.cursor.check(|c| c == 'e' || c == 'E') {
                self.cursor.advance();
                if !self.cursor.eat('+') {
                    self.cursor.eat('-');
                }
                if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
                    return Err(self.invalid_number(start));
                }
            }
        }

        // `3in` or `1x` are not numbers followed by identifiers
        if self.cursor.check(is_ident_start) {
            self.cursor.eat_while(is_ident_continue);
            return Err(self.invalid_number(start));
        }

        Ok(self.make_token(TokenKind::Number, start))
    }

    fn invalid_number(&self, start: Mark) -> ParseError {
        ParseError::new(
            ParseErrorKind::InvalidLiteral,
            self.cursor.span_from(start),
            format!("invalid number literal `{}`", self.cursor.slice_from(start.offset)),
        )
    }

    // =========================================
    // Scanning: Identifiers
    // =========================================

    fn scan_identifier(&mut self, start: Mark) -> Token<'ast> {
        let word = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(word).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    // =========================================
    // Scanning: Operators
    // =========================================

    fn scan_operator(&mut self, start: Mark) -> Result<Token<'ast>, ParseError> {
        use TokenKind::*;

        // longest match first
        const OPERATORS: &[(&str, TokenKind)] = &[
            ("===", EqualEqualEqual),
            ("!==", BangEqualEqual),
            ("==", EqualEqual),
            ("!=", BangEqual),
            ("<=", LessEqual),
            (">=", GreaterEqual),
            ("&&", AmpAmp),
            ("||", PipePipe),
            ("??", QuestionQuestion),
            ("(", LeftParen),
            (")", RightParen),
            ("[", LeftBracket),
            ("]", RightBracket),
            ("{", LeftBrace),
            ("}", RightBrace),
            (",", Comma),
            (".", Dot),
            (":", Colon),
            ("?", Question),
            ("+", Plus),
            ("-", Minus),
            ("*", Star),
            ("%", Percent),
            ("!", Bang),
            ("<", Less),
            (">", Greater),
        ];

        for &(text, kind) in OPERATORS {
            if self.cursor.eat_str(text) {
                return Ok(self.make_token(kind, start));
            }
        }

        let c = self.cursor.advance().unwrap_or_default();
        Err(ParseError::new(
            ParseErrorKind::UnexpectedChar,
            self.cursor.span_from(start),
            format!("unexpected character '{c}'"),
        ))
    }
}
