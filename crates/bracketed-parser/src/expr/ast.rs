//! Expression AST nodes.
//!
//! Nodes are allocated in a [`bumpalo::Bump`] arena and refer to each other
//! by reference, so a whole tree is freed at once when the arena is dropped.
//!
//! # Expression Precedence
//!
//! 1. Comma sequence
//! 2. Ternary (?:) - right associative
//! 3. Logical OR and nullish coalescing (||, ??)
//! 4. Logical AND (&&)
//! 5. Equality (==, !=, ===, !==)
//! 6. Relational (<, <=, >, >=)
//! 7. Additive (+, -)
//! 8. Multiplicative (*, /, %)
//! 9. Prefix unary (-, +, !, typeof)
//! 10. Postfix (call, index, member)

use bracketed_core::Span;

use super::ops::{BinaryOp, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(&'ast LiteralExpr<'ast>),
    Ident(IdentExpr<'ast>),
    /// The `this` keyword (the render context).
    This(Span),
    Array(&'ast ArrayExpr<'ast>),
    Object(&'ast ObjectExpr<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    /// Ternary conditional (? :)
    Ternary(&'ast TernaryExpr<'ast>),
    /// Member access (.)
    Member(&'ast MemberExpr<'ast>),
    /// Computed member access ([])
    Index(&'ast IndexExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    /// Comma-separated sequence; evaluates to the last item.
    Sequence(&'ast SequenceExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::This(span) => *span,
            Self::Array(e) => e.span,
            Self::Object(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Ternary(e) => e.span,
            Self::Member(e) => e.span,
            Self::Index(e) => e.span,
            Self::Call(e) => e.span,
            Self::Sequence(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr<'ast> {
        let mut expr = self;
        while let Expr::Paren(paren) = expr {
            expr = &paren.expr;
        }
        expr
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind<'ast> {
    Number(f64),
    /// String literal with escapes already decoded.
    String(&'ast str),
    Bool(bool),
    Null,
    Undefined,
    /// Regular expression literal, split into body and flags.
    Regex { source: &'ast str, flags: &'ast str },
}

/// An identifier reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

/// `[a, b, c]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr<'ast> {
    pub elements: &'ast [Expr<'ast>],
    pub span: Span,
}

/// `{ key: value, shorthand }`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpr<'ast> {
    pub properties: &'ast [Property<'ast>],
    pub span: Span,
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property<'ast> {
    pub key: &'ast str,
    pub value: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: Expr<'ast>,
    pub op: BinaryOp,
    pub right: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryExpr<'ast> {
    pub condition: Expr<'ast>,
    pub then_expr: Expr<'ast>,
    pub else_expr: Expr<'ast>,
    pub span: Span,
}

/// `object.property`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub object: Expr<'ast>,
    pub property: &'ast str,
    pub span: Span,
}

/// `object[index]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub object: Expr<'ast>,
    pub index: Expr<'ast>,
    pub span: Span,
}

/// `callee(args)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: Expr<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceExpr<'ast> {
    pub exprs: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub expr: Expr<'ast>,
    pub span: Span,
}
