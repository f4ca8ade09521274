//! Division versus regular expression literal classification.
//!
//! A `/` inside an expression is ambiguous until you know what precedes it.
//! Both the splitter and the expression lexer use [`regex_literal_len`] so
//! they always agree on where a regex literal starts and ends.

use super::cursor::is_ident_continue;

/// Words after which a `/` starts a regular expression literal.
const REGEX_KEYWORDS: &[&str] = &[
    "case",
    "default",
    "do",
    "else",
    "in",
    "instanceof",
    "prefix",
    "return",
    "typeof",
    "void",
    "yield",
];

/// Punctuation after which a `/` starts a regular expression literal.
const REGEX_PUNCT: &[char] = &[
    '[', '{', '(', ',', ';', ':', '?', '=', '|', '&', '!', '^', '~', '>', '%', '*', '/',
];

/// Whether a `/` following `before` starts a regular expression literal.
///
/// `before` is the expression text preceding the slash; trailing whitespace
/// is ignored.
pub fn regex_allowed(before: &str) -> bool {
    let text = before.trim_end();
    let mut chars = text.chars().rev();
    let Some(last) = chars.next() else {
        return true;
    };

    match last {
        c if REGEX_PUNCT.contains(&c) => true,
        '+' | '-' => {
            if chars.next() != Some(last) {
                // binary operator
                return true;
            }
            // `a++ /` is postfix, `++ /` is prefix
            !chars.next().is_some_and(is_ident_continue)
        }
        '.' => chars.next() == Some('.'),
        c if is_ident_continue(c) => {
            let start = text
                .char_indices()
                .rev()
                .take_while(|&(_, c)| is_ident_continue(c))
                .last()
                .map_or(0, |(i, _)| i);
            REGEX_KEYWORDS.contains(&&text[start..])
        }
        _ => false,
    }
}

/// Flags accepted after a regular expression literal.
pub const REGEX_FLAGS: &str = "gimsuy";

/// Byte length of the regular expression literal at the start of `rest`,
/// flags included.
///
/// `rest` must start with `/`. Returns `None` when the literal is not
/// closed on the same line, or when its body would start with `*`, `/` or
/// `>` (comments and self-closing tags), in which case the slash is an
/// ordinary character.
pub fn scan_regex(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices();
    if chars.next()?.1 != '/' {
        return None;
    }

    let mut in_class = false;
    let mut first = true;
    let end = loop {
        let (i, c) = chars.next()?;
        if first && matches!(c, '*' | '/' | '>') {
            return None;
        }
        first = false;
        match c {
            '\n' | '\r' => return None,
            '\\' => match chars.next() {
                Some((_, '\n' | '\r')) | None => return None,
                Some(_) => {}
            },
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => break i + 1,
            _ => {}
        }
    };

    let flags = rest[end..]
        .chars()
        .take_while(|c| REGEX_FLAGS.contains(*c))
        .count();
    Some(end + flags)
}

/// Length of the regex literal starting a `/` that follows `before`, or
/// `None` when the slash is a division (or an unterminated literal).
pub fn regex_literal_len(before: &str, rest: &str) -> Option<usize> {
    if regex_allowed(before) {
        scan_regex(rest)
    } else {
        None
    }
}
