//! Token types for the expression lexer.

use std::fmt;

use bracketed_core::Span;

/// A token from an expression.
///
/// The lexeme is allocated in the parse arena, so tokens stay valid after
/// the expression source is gone.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    /// The source text of this token.
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// `42`, `0.5`, `1e3`, `0xff`
    Number,
    /// `"text"`, `'text'` (quotes and escapes included)
    String,
    /// `/body/flags`
    Regex,

    Identifier,

    // =========================================
    // Keywords
    // =========================================
    True,
    False,
    Null,
    Undefined,
    This,
    Typeof,

    // =========================================
    // Punctuation
    // =========================================
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Colon,
    Question,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    EqualEqual,
    EqualEqualEqual,
    BangEqual,
    BangEqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AmpAmp,
    PipePipe,
    QuestionQuestion,

    /// End of expression.
    Eof,
}

impl TokenKind {
    /// Whether this token may be used as a property name after `.` or as
    /// an object key.
    pub fn is_property_name(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Undefined
                | TokenKind::This
                | TokenKind::Typeof
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let s = match self {
            Number => "number",
            String => "string",
            Regex => "regular expression",
            Identifier => "identifier",
            True => "'true'",
            False => "'false'",
            Null => "'null'",
            Undefined => "'undefined'",
            This => "'this'",
            Typeof => "'typeof'",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Comma => "','",
            Dot => "'.'",
            Colon => "':'",
            Question => "'?'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Bang => "'!'",
            EqualEqual => "'=='",
            EqualEqualEqual => "'==='",
            BangEqual => "'!='",
            BangEqualEqual => "'!=='",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            AmpAmp => "'&&'",
            PipePipe => "'||'",
            QuestionQuestion => "'??'",
            Eof => "end of expression",
        };
        f.write_str(s)
    }
}

/// Look up a keyword by its spelling.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "undefined" => TokenKind::Undefined,
        "this" => TokenKind::This,
        "typeof" => TokenKind::Typeof,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(lookup_keyword("typeof"), Some(TokenKind::Typeof));
        assert_eq!(lookup_keyword("undefined"), Some(TokenKind::Undefined));
        assert_eq!(lookup_keyword("value"), None);
    }

    #[test]
    fn keywords_are_property_names() {
        assert!(TokenKind::Null.is_property_name());
        assert!(!TokenKind::Number.is_property_name());
    }

    #[test]
    fn display() {
        assert_eq!(TokenKind::EqualEqualEqual.to_string(), "'==='");
        assert_eq!(TokenKind::Eof.to_string(), "end of expression");
    }
}
