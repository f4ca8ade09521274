//! Operator definitions for expressions.
//!
//! Provides enums for binary and unary operators along with precedence and
//! associativity information for the Pratt parser.

use std::fmt;

use super::token::TokenKind;

/// Binding power of the ternary operator (right-associative).
pub const TERNARY_BP: u8 = 2;

/// Binding power of member access, indexing and calls.
pub const POSTFIX_BP: u8 = 19;

/// Binary operators, organized by precedence from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical OR / nullish coalescing (precedence 3)
    /// `||`
    LogicalOr,
    /// `??`
    Nullish,

    // Logical AND (precedence 4)
    /// `&&`
    LogicalAnd,

    // Equality (precedence 5)
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `===`
    StrictEqual,
    /// `!==`
    StrictNotEqual,

    // Relational (precedence 6)
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    // Additive (precedence 7)
    /// `+`
    Add,
    /// `-`
    Sub,

    // Multiplicative (precedence 8)
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    /// Get the binding power (precedence) for this operator.
    ///
    /// Higher values bind more tightly. Returns (left_bp, right_bp); all
    /// binary operators are left-associative.
    pub fn binding_power(&self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            LogicalOr | Nullish => (3, 4),
            LogicalAnd => (5, 6),
            Equal | NotEqual | StrictEqual | StrictNotEqual => (7, 8),
            Less | LessEqual | Greater | GreaterEqual => (9, 10),
            Add | Sub => (11, 12),
            Mul | Div | Mod => (13, 14),
        }
    }

    /// Try to convert a token kind to a binary operator.
    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;

        Some(match token {
            PipePipe => BinaryOp::LogicalOr,
            QuestionQuestion => BinaryOp::Nullish,
            AmpAmp => BinaryOp::LogicalAnd,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            EqualEqualEqual => BinaryOp::StrictEqual,
            BangEqualEqual => BinaryOp::StrictNotEqual,
            Less => BinaryOp::Less,
            LessEqual => BinaryOp::LessEqual,
            Greater => BinaryOp::Greater,
            GreaterEqual => BinaryOp::GreaterEqual,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Mod,
            _ => return None,
        })
    }

    /// Whether the right operand is only evaluated depending on the left.
    pub fn is_short_circuit(&self) -> bool {
        matches!(
            self,
            BinaryOp::LogicalOr | BinaryOp::LogicalAnd | BinaryOp::Nullish
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOp::*;
        let s = match self {
            LogicalOr => "||",
            Nullish => "??",
            LogicalAnd => "&&",
            Equal => "==",
            NotEqual => "!=",
            StrictEqual => "===",
            StrictNotEqual => "!==",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        };
        write!(f, "{}", s)
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-` negation
    Neg,
    /// `+` numeric conversion
    Plus,
    /// `!` logical NOT
    LogicalNot,
    /// `typeof`
    Typeof,
}

impl UnaryOp {
    /// Get the binding power for prefix operators.
    pub fn binding_power() -> u8 {
        17 // Higher than all binary operators
    }

    /// Try to convert a token kind to a unary operator.
    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;

        Some(match token {
            Minus => UnaryOp::Neg,
            Plus => UnaryOp::Plus,
            Bang => UnaryOp::LogicalNot,
            Typeof => UnaryOp::Typeof,
            _ => return None,
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use UnaryOp::*;
        let s = match self {
            Neg => "-",
            Plus => "+",
            LogicalNot => "!",
            Typeof => "typeof ",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_op_precedence() {
        let (or_l, or_r) = BinaryOp::LogicalOr.binding_power();
        let (add_l, add_r) = BinaryOp::Add.binding_power();
        let (mul_l, mul_r) = BinaryOp::Mul.binding_power();

        assert!(TERNARY_BP < or_l);
        assert!(or_l < add_l);
        assert!(add_l < mul_l);

        // left-associative: right_bp > left_bp
        assert!(or_r > or_l);
        assert!(add_r > add_l);
        assert!(mul_r > mul_l);

        assert!(mul_r < UnaryOp::binding_power());
        assert!(UnaryOp::binding_power() < POSTFIX_BP);
    }

    #[test]
    fn operator_from_token() {
        assert_eq!(BinaryOp::from_token(TokenKind::Plus), Some(BinaryOp::Add));
        assert_eq!(
            BinaryOp::from_token(TokenKind::QuestionQuestion),
            Some(BinaryOp::Nullish)
        );
        assert_eq!(UnaryOp::from_token(TokenKind::Typeof), Some(UnaryOp::Typeof));
        assert_eq!(BinaryOp::from_token(TokenKind::Comma), None);
    }

    #[test]
    fn short_circuit() {
        assert!(BinaryOp::LogicalAnd.is_short_circuit());
        assert!(!BinaryOp::Add.is_short_circuit());
    }
}
