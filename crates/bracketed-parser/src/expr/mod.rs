//! The expression language used inside delimiters.
//!
//! Expressions are lexed and parsed into an arena-allocated [`Expr`] tree
//! which the default evaluator interprets.

pub mod ast;
mod lexer;
mod ops;
mod parser;
mod token;

pub use ast::*;
pub use lexer::Lexer;
pub use ops::{BinaryOp, POSTFIX_BP, TERNARY_BP, UnaryOp};
pub use parser::{MAX_DEPTH, Parser, parse_expression};
pub use token::{Token, TokenKind, lookup_keyword};
