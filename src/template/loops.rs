//! Loop header parsing: `{ item, i in items }`.

use crate::brackets::Brackets;

/// Pattern template for a loop header. Captures the item name, the optional
/// position name and the collection expression.
pub const LOOP_TEMPLATE: &str =
    r"^\s*\{\s*([$\w]+)(?:\s*,\s*(\S+))?\s+in\s+(\S(?s:.*?))\s*\}\s*$";

/// The names bound by a loop header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopKeys {
    /// Name of the current item.
    pub key: String,
    /// Name of the current position, if the header declares one.
    pub pos: Option<String>,
    /// The collection, rewrapped in delimiters so it can be rendered as a
    /// template of its own.
    pub val: String,
}

/// Parse a loop header under the pair currently installed in `brackets`.
///
/// Returns `None` when `header` is not of the form
/// `<open> key[, pos] in collection <close>`.
pub fn loop_keys(brackets: &Brackets, header: &str) -> Option<LoopKeys> {
    let pattern = brackets.pattern(LOOP_TEMPLATE).ok()?;
    let caps = pattern.captures(header)?;
    let [open, close] = brackets.pair();
    Some(LoopKeys {
        key: caps.get(1)?.as_str().to_string(),
        pos: caps.get(2).map(|m| m.as_str().to_string()),
        val: format!("{open}{}{close}", caps.get(3)?.as_str().trim()),
    })
}
