//! Dynamic values flowing through templates.
//!
//! [`Value`] is both the data context a template is rendered against and the
//! result of evaluating an expression. It follows the loose typing of the
//! expression language: numbers are `f64`, objects keep insertion order, and
//! string coercion uses the same rules a browser would.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;

/// Type name reported by `typeof` for numbers.
///
/// Exposed so hosts can build `typeof x == "number"` style snippets without
/// repeating the literal.
pub const E_NUMBER: &str = "number";

/// Ordered string-keyed map used for object values.
pub type Map = IndexMap<String, Value>;

/// A dynamically typed template value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value (unknown identifiers, missing properties, empty expressions).
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    /// A compiled regular expression literal.
    Regex(RegexValue),
}

/// A regular expression literal together with its original spelling.
#[derive(Debug, Clone)]
pub struct RegexValue {
    source: String,
    flags: String,
    regex: Arc<Regex>,
}

impl RegexValue {
    /// Compile a regular expression literal body with the given flags.
    ///
    /// Supported flags are `i`, `m` and `s`; `g`, `u` and `y` are accepted and
    /// ignored since they only affect stateful matching. Braces that do not
    /// form a counted repetition are taken literally.
    pub fn new(source: &str, flags: &str) -> Result<Self, regex::Error> {
        let mut inline = String::new();
        for flag in flags.chars() {
            if matches!(flag, 'i' | 'm' | 's') && !inline.contains(flag) {
                inline.push(flag);
            }
        }
        let body = translate_body(source);
        let pattern = if inline.is_empty() {
            body
        } else {
            format!("(?{inline}){body}")
        };
        Ok(Self {
            source: source.to_string(),
            flags: flags.to_string(),
            regex: Arc::new(Regex::new(&pattern)?),
        })
    }

    /// The literal body, without slashes.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The literal flags.
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// The compiled matcher.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Rewrite a literal body into the `regex` dialect.
///
/// A `{` or `}` that is not part of a `{n}`, `{n,}` or `{n,m}` repetition is
/// escaped, as is a stray `]`. Inside a class `[` and the set operators `&`
/// and `~` are escaped too, since `regex` gives them meaning there.
fn translate_body(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 4);
    let mut in_class = false;
    let mut index = 0;
    while let Some(ch) = source[index..].chars().next() {
        let mut width = ch.len_utf8();
        match ch {
            '\\' => match source[index + 1..].chars().next() {
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                    width += next.len_utf8();
                }
                None => out.push_str(r"\\"),
            },
            '[' | '&' | '~' if in_class => {
                out.push('\\');
                out.push(ch);
            }
            '[' => {
                in_class = true;
                out.push('[');
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            ']' => out.push_str(r"\]"),
            '{' if !in_class => match repetition_len(&source[index..]) {
                Some(len) if !out.is_empty() => {
                    out.push_str(&source[index..index + len]);
                    width = len;
                }
                _ => out.push_str(r"\{"),
            },
            '}' if !in_class => out.push_str(r"\}"),
            _ => out.push(ch),
        }
        index += width;
    }
    out
}

/// Byte length of a `{n}`, `{n,}` or `{n,m}` prefix of `rest`.
fn repetition_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };
    let min = digits(1);
    if min == 0 {
        return None;
    }
    let mut end = 1 + min;
    if bytes.get(end) == Some(&b',') {
        end += 1;
        end += digits(end);
    }
    (bytes.get(end) == Some(&b'}')).then_some(end + 1)
}

impl PartialEq for RegexValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.regex, &other.regex)
    }
}

impl PartialEq for Value {
    /// Structural equality, used by hosts and tests to inspect results.
    /// Expression-level `==`/`===` live in [`Value::loose_equals`] and
    /// [`Value::strict_equals`].
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a.source == b.source && a.flags == b.flags,
            _ => false,
        }
    }
}

impl Value {
    /// The `typeof` name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => E_NUMBER,
            Value::String(_) => "string",
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Regex(_) => "object",
        }
    }

    /// Whether this value is `undefined` or `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Truthiness as used by `!`, `&&`, `||` and `?:`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Regex(_) => true,
        }
    }

    /// Look up a property of an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number payload, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric conversion (`Number(x)` semantics).
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => parse_number(s),
            Value::Array(items) => match items.as_slice() {
                [] => 0.0,
                [single] => parse_number(&single.to_js_string()),
                _ => f64::NAN,
            },
            Value::Object(_) | Value::Regex(_) => f64::NAN,
        }
    }

    /// String conversion (`String(x)` semantics).
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => join_items(items, ","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Regex(re) => format!("/{}/{}", re.source, re.flags),
        }
    }

    /// Conversion used when a value is interpolated into surrounding text.
    ///
    /// `undefined` and `null` disappear; everything else uses
    /// [`to_js_string`](Self::to_js_string). Structured values are not
    /// pretty-printed.
    pub fn to_display_string(&self) -> String {
        if self.is_nullish() {
            String::new()
        } else {
            self.to_js_string()
        }
    }

    /// `===` comparison.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
            | (Value::Regex(_), Value::Regex(_)) => {
                // values are copied out of the context, so structured values
                // never share identity
                false
            }
            _ => self == other,
        }
    }

    /// `==` comparison with the usual coercions between primitives.
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Value::Number(_), Value::String(_))
            | (Value::String(_), Value::Number(_))
            | (Value::Bool(_), _)
            | (_, Value::Bool(_)) => {
                let (a, b) = (self.to_number(), other.to_number());
                a == b
            }
            (Value::Array(_) | Value::Object(_), Value::String(_) | Value::Number(_)) => {
                Value::String(self.to_js_string()).loose_equals(other)
            }
            (Value::String(_) | Value::Number(_), Value::Array(_) | Value::Object(_)) => {
                self.loose_equals(&Value::String(other.to_js_string()))
            }
            _ => self.strict_equals(other),
        }
    }

    /// Convert into a JSON value, as `JSON.stringify` would see it.
    ///
    /// Returns `None` for values JSON cannot represent at the top level
    /// (`undefined`).
    pub fn to_json(&self) -> Option<serde_json::Value> {
        Some(match self {
            Value::Undefined => return None,
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|v| v.to_json().unwrap_or(serde_json::Value::Null))
                    .collect(),
            ),
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .filter_map(|(k, v)| v.to_json().map(|json| (k.clone(), json)))
                    .collect(),
            ),
            Value::Regex(_) => serde_json::Value::Object(serde_json::Map::new()),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl PartialEq<serde_json::Value> for Value {
    fn eq(&self, other: &serde_json::Value) -> bool {
        *self == Value::from(other.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

/// Join array items the way `Array.prototype.join` does.
pub fn join_items(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(Value::to_display_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Format a number using the shortest round-trip representation, switching
/// to exponent notation outside `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{n}");
    }
    let formatted = format!("{n:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

/// Parse a string the way `Number(string)` does.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    let is_decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !is_decimal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}
