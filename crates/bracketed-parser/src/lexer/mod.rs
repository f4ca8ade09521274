//! Character-level scanning shared by the splitter and the expression lexer.

mod cursor;
mod slash;

pub use cursor::{Cursor, Mark, is_ident_continue, is_ident_start};
pub use slash::{REGEX_FLAGS, regex_allowed, regex_literal_len, scan_regex};
