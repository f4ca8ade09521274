//! Expression parsing using Pratt parsing (precedence climbing).
//!
//! This module implements expression parsing with proper operator precedence
//! and associativity using the Pratt parsing algorithm.

use bracketed_core::{ParseError, ParseErrorKind, Span, format_number};
use bumpalo::Bump;
use bumpalo::collections::{String as BumpString, Vec as BumpVec};

use super::ast::*;
use super::lexer::Lexer;
use super::ops::{BinaryOp, POSTFIX_BP, TERNARY_BP, UnaryOp};
use super::token::{Token, TokenKind};

/// Deepest nesting of sub-expressions the parser accepts.
///
/// Brackets, unary operators and right operands each add a level.
pub const MAX_DEPTH: usize = 128;

/// Recursive-descent parser over a fully lexed expression.
pub struct Parser<'ast> {
    arena: &'ast Bump,
    /// Lexed tokens, always terminated by an `Eof` token.
    buffer: &'ast [Token<'ast>],
    position: usize,
    depth: usize,
}

impl<'ast> Parser<'ast> {
    /// Lex `source` and prepare to parse it.
    pub fn new(source: &str, arena: &'ast Bump) -> Result<Self, ParseError> {
        let buffer = Lexer::new(source, arena).tokenize()?.into_bump_slice();
        Ok(Self {
            arena,
            buffer,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the whole source as one expression.
    ///
    /// Returns `None` when the source contains only whitespace.
    pub fn parse(mut self) -> Result<Option<Expr<'ast>>, ParseError> {
        if self.check(TokenKind::Eof) {
            return Ok(None);
        }
        let expr = self.parse_sequence()?;
        let trailing = *self.peek();
        if trailing.kind != TokenKind::Eof {
            return Err(ParseError::unexpected_token(trailing.span, trailing.lexeme));
        }
        Ok(Some(expr))
    }

    // =========================================
    // Token access
    // =========================================

    fn peek(&self) -> &Token<'ast> {
        &self.buffer[self.position.min(self.buffer.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.expected(kind))
    }

    /// Error for a missing `kind` at the current token.
    fn expected(&self, kind: TokenKind) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            return ParseError::unexpected_eof(token.span);
        }
        ParseError::expected_token(token.span, &kind.to_string(), &token.kind.to_string())
    }

    // =========================================
    // Expressions
    // =========================================

    /// Parse a comma-separated sequence.
    pub fn parse_sequence(&mut self) -> Result<Expr<'ast>, ParseError> {
        let first = self.parse_expr(0)?;
        if !self.check(TokenKind::Comma) {
            return Ok(first);
        }

        let mut exprs = BumpVec::new_in(self.arena);
        exprs.push(first);
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr(0)?);
        }
        let span = first.span().to(exprs[exprs.len() - 1].span());
        Ok(Expr::Sequence(self.arena.alloc(SequenceExpr {
            exprs: exprs.into_bump_slice(),
            span,
        })))
    }

    /// Parse an expression with a minimum binding power.
    ///
    /// This is the core of the Pratt parser. It handles operator precedence
    /// by only consuming operators with sufficient binding power.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<Expr<'ast>, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::nesting_too_deep(self.peek().span, MAX_DEPTH));
        }
        self.depth += 1;
        let result = self.parse_operators(min_bp);
        self.depth -= 1;
        result
    }

    fn parse_operators(&mut self, min_bp: u8) -> Result<Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let kind = self.peek().kind;

            match kind {
                TokenKind::Dot | TokenKind::LeftBracket | TokenKind::LeftParen => {
                    if POSTFIX_BP < min_bp {
                        break;
                    }
                    lhs = match kind {
                        TokenKind::Dot => self.parse_member_access(lhs)?,
                        TokenKind::LeftBracket => self.parse_index(lhs)?,
                        _ => self.parse_call(lhs)?,
                    };
                }
                TokenKind::Question => {
                    if TERNARY_BP < min_bp {
                        break;
                    }
                    lhs = self.parse_ternary(lhs)?;
                }
                _ => {
                    let Some(op) = BinaryOp::from_token(kind) else {
                        break;
                    };
                    let (l_bp, r_bp) = op.binding_power();
                    if l_bp < min_bp {
                        break;
                    }

                    self.advance();
                    let right = self.parse_expr(r_bp)?;
                    let span = lhs.span().to(right.span());
                    lhs = Expr::Binary(self.arena.alloc(BinaryExpr {
                        left: lhs,
                        op,
                        right,
                        span,
                    }));
                }
            }
        }

        Ok(lhs)
    }

    /// Parse a prefix expression (the start of an expression).
    fn parse_prefix(&mut self) -> Result<Expr<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = parse_number_literal(token.lexeme).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("invalid number literal `{}`", token.lexeme),
                    )
                })?;
                Ok(self.literal(LiteralKind::Number(value), token.span))
            }

            TokenKind::String => {
                self.advance();
                let text = self.decode_string(token)?;
                Ok(self.literal(LiteralKind::String(text), token.span))
            }

            TokenKind::Regex => {
                self.advance();
                let (source, flags) = split_regex(token.lexeme);
                Ok(self.literal(LiteralKind::Regex { source, flags }, token.span))
            }

            TokenKind::True | TokenKind::False => {
                self.advance();
                let value = token.kind == TokenKind::True;
                Ok(self.literal(LiteralKind::Bool(value), token.span))
            }

            TokenKind::Null => {
                self.advance();
                Ok(self.literal(LiteralKind::Null, token.span))
            }

            TokenKind::Undefined => {
                self.advance();
                Ok(self.literal(LiteralKind::Undefined, token.span))
            }

            TokenKind::This => {
                self.advance();
                Ok(Expr::This(token.span))
            }

            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Ident(IdentExpr {
                    name: token.lexeme,
                    span: token.span,
                }))
            }

            TokenKind::LeftParen => {
                let start_span = self.advance().span;
                let expr = self.parse_sequence()?;
                let end_span = self.expect(TokenKind::RightParen)?.span;
                Ok(Expr::Paren(self.arena.alloc(ParenExpr {
                    expr,
                    span: start_span.to(end_span),
                })))
            }

            TokenKind::LeftBracket => self.parse_array(),

            TokenKind::LeftBrace => self.parse_object(),

            kind => {
                if let Some(op) = UnaryOp::from_token(kind) {
                    self.advance();
                    let operand = self.parse_expr(UnaryOp::binding_power())?;
                    let span = token.span.to(operand.span());
                    return Ok(Expr::Unary(self.arena.alloc(UnaryExpr { op, operand, span })));
                }
                if kind == TokenKind::Eof {
                    return Err(ParseError::unexpected_eof(token.span));
                }
                Err(ParseError::expected_expression(token.span, &kind.to_string()))
            }
        }
    }

    fn literal(&self, kind: LiteralKind<'ast>, span: Span) -> Expr<'ast> {
        Expr::Literal(self.arena.alloc(LiteralExpr { kind, span }))
    }

    /// Parse `[a, b, c]`. A trailing comma is allowed.
    fn parse_array(&mut self) -> Result<Expr<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::LeftBracket)?.span;
        let mut elements = BumpVec::new_in(self.arena);

        while !self.check(TokenKind::RightBracket) {
            elements.push(self.parse_expr(0)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let end_span = self.expect(TokenKind::RightBracket)?.span;
        Ok(Expr::Array(self.arena.alloc(ArrayExpr {
            elements: elements.into_bump_slice(),
            span: start_span.to(end_span),
        })))
    }

    /// Parse `{ key: value, "key": value, 1: value, shorthand }`.
    fn parse_object(&mut self) -> Result<Expr<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::LeftBrace)?.span;
        let mut properties = BumpVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) {
            let key_token = self.advance();
            let key: &'ast str = match key_token.kind {
                kind if kind.is_property_name() => key_token.lexeme,
                TokenKind::String => self.decode_string(key_token)?,
                TokenKind::Number => match parse_number_literal(key_token.lexeme) {
                    Some(n) => self.arena.alloc_str(&format_number(n)),
                    None => key_token.lexeme,
                },
                TokenKind::Eof => return Err(ParseError::unexpected_eof(key_token.span)),
                _ => {
                    return Err(ParseError::expected_identifier(
                        key_token.span,
                        &key_token.kind.to_string(),
                    ));
                }
            };

            let value = if self.eat(TokenKind::Colon) {
                self.parse_expr(0)?
            } else if key_token.kind == TokenKind::Identifier {
                Expr::Ident(IdentExpr {
                    name: key,
                    span: key_token.span,
                })
            } else {
                return Err(self.expected(TokenKind::Colon));
            };

            properties.push(Property {
                key,
                value,
                span: key_token.span.to(value.span()),
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let end_span = self.expect(TokenKind::RightBrace)?.span;
        Ok(Expr::Object(self.arena.alloc(ObjectExpr {
            properties: properties.into_bump_slice(),
            span: start_span.to(end_span),
        })))
    }

    /// Parse member access (dot operator).
    fn parse_member_access(&mut self, object: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        self.expect(TokenKind::Dot)?;
        let name = self.advance();
        if !name.kind.is_property_name() {
            if name.kind == TokenKind::Eof {
                return Err(ParseError::unexpected_eof(name.span));
            }
            return Err(ParseError::expected_identifier(name.span, &name.kind.to_string()));
        }

        Ok(Expr::Member(self.arena.alloc(MemberExpr {
            object,
            property: name.lexeme,
            span: object.span().to(name.span),
        })))
    }

    /// Parse computed member access.
    fn parse_index(&mut self, object: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftBracket)?;
        let index = self.parse_sequence()?;
        let end_span = self.expect(TokenKind::RightBracket)?.span;

        Ok(Expr::Index(self.arena.alloc(IndexExpr {
            object,
            index,
            span: object.span().to(end_span),
        })))
    }

    /// Parse a call's argument list.
    fn parse_call(&mut self, callee: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = BumpVec::new_in(self.arena);

        while !self.check(TokenKind::RightParen) {
            args.push(self.parse_expr(0)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let end_span = self.expect(TokenKind::RightParen)?.span;
        Ok(Expr::Call(self.arena.alloc(CallExpr {
            callee,
            args: args.into_bump_slice(),
            span: callee.span().to(end_span),
        })))
    }

    /// Parse `cond ? a : b`; the else branch is right-associative.
    fn parse_ternary(&mut self, condition: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        self.expect(TokenKind::Question)?;
        let then_expr = self.parse_expr(0)?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_expr(TERNARY_BP)?;

        Ok(Expr::Ternary(self.arena.alloc(TernaryExpr {
            condition,
            then_expr,
            else_expr,
            span: condition.span().to(else_expr.span()),
        })))
    }

    // =========================================
    // Literal helpers
    // =========================================

    /// Decode the escapes of a quoted string token.
    fn decode_string(&self, token: Token<'ast>) -> Result<&'ast str, ParseError> {
        let raw = &token.lexeme[1..token.lexeme.len() - 1];
        if !raw.contains('\\') {
            return Ok(raw);
        }

        let mut out = BumpString::with_capacity_in(raw.len(), self.arena);
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('b') => out.push('\u{8}'),
                Some('f') => out.push('\u{c}'),
                Some('v') => out.push('\u{b}'),
                Some('0') => out.push('\0'),
                Some('x') => out.push(self.hex_escape(&mut chars, 2, token.span)?),
                Some('u') => out.push(self.hex_escape(&mut chars, 4, token.span)?),
                // line continuation
                Some('\n') => {}
                Some(other) => out.push(other),
                None => {}
            }
        }
        Ok(out.into_bump_str())
    }

    fn hex_escape(
        &self,
        chars: &mut std::str::Chars<'_>,
        digits: usize,
        span: Span,
    ) -> Result<char, ParseError> {
        let hex: String = chars.by_ref().take(digits).collect();
        if hex.len() == digits
            && let Ok(code) = u32::from_str_radix(&hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Ok(c);
        }
        Err(ParseError::new(
            ParseErrorKind::InvalidEscapeSequence,
            span,
            format!("invalid escape sequence in string literal: \\{hex}"),
        ))
    }
}

/// Parse a number token's lexeme.
fn parse_number_literal(lexeme: &str) -> Option<f64> {
    match lexeme
        .strip_prefix("0x")
        .or_else(|| lexeme.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok().map(|n| n as f64),
        None => lexeme.parse::<f64>().ok(),
    }
}

/// Split `/body/flags` into body and flags.
fn split_regex(lexeme: &str) -> (&str, &str) {
    match lexeme.rfind('/') {
        Some(end) if end > 0 => (&lexeme[1..end], &lexeme[end + 1..]),
        _ => (lexeme, ""),
    }
}

/// Parse an expression into `arena`.
///
/// Returns `Ok(None)` for an empty (or whitespace-only) expression.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse_expression<'ast>(
    source: &str,
    arena: &'ast Bump,
) -> Result<Option<Expr<'ast>>, ParseError> {
    Parser::new(source, arena)?.parse()
}
