//! Built-in properties, methods and globals available to expressions.

use bracketed_core::{Span, Value, format_number, join_items};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::EvalFailure;

const NAMESPACES: &[&str] = &["JSON", "Math"];

pub(super) fn is_namespace(name: &str) -> bool {
    NAMESPACES.contains(&name)
}

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&Value::Undefined)
}

/// Clamp a possibly negative index into `0..=len` the way `slice` does.
fn relative_index(value: &Value, len: usize, default: usize) -> usize {
    if matches!(value, Value::Undefined) {
        return default;
    }
    let n = value.to_number();
    if n.is_nan() {
        return 0;
    }
    let n = n.trunc();
    if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        n.min(len as f64) as usize
    }
}

fn not_a_function(name: &str, span: Span) -> EvalFailure {
    EvalFailure::at(span, format!("{name} is not a function"))
}

/// Parse a canonical array index (`"0"`, `"12"`, not `"01"` or `"1.0"`).
fn array_index(key: &str) -> Option<usize> {
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse().ok()
}

// ============================================================================
// Property access
// ============================================================================

pub(super) fn get_property(object: &Value, key: &str, span: Span) -> Result<Value, EvalFailure> {
    Ok(match object {
        Value::Undefined | Value::Null => {
            return Err(EvalFailure::at(
                span,
                format!(
                    "cannot read properties of {} (reading '{key}')",
                    object.to_js_string()
                ),
            ));
        }
        Value::Object(map) => map.get(key).cloned().unwrap_or_default(),
        Value::Array(items) => match key {
            "length" => Value::Number(items.len() as f64),
            _ => array_index(key)
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or_default(),
        },
        Value::String(s) => match key {
            "length" => Value::Number(s.chars().count() as f64),
            _ => array_index(key)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::String(c.to_string()))
                .unwrap_or_default(),
        },
        Value::Regex(re) => match key {
            "source" => Value::from(re.source()),
            "flags" => Value::from(re.flags()),
            _ => Value::Undefined,
        },
        Value::Bool(_) | Value::Number(_) => Value::Undefined,
    })
}

// ============================================================================
// Methods
// ============================================================================

pub(super) fn call_method(
    receiver: &Value,
    name: &str,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalFailure> {
    match receiver {
        Value::String(s) => string_method(s, name, args, span),
        Value::Array(items) => array_method(items, name, args, span),
        Value::Regex(re) => match name {
            "test" => Ok(Value::Bool(re.regex().is_match(&arg(args, 0).to_js_string()))),
            "toString" => Ok(Value::String(receiver.to_js_string())),
            _ => Err(not_a_function(&format!("regex.{name}"), span)),
        },
        Value::Number(n) => match name {
            "toFixed" => {
                let digits = arg(args, 0).to_number();
                let digits = if digits.is_nan() { 0 } else { digits.clamp(0.0, 100.0) as usize };
                Ok(Value::String(format!("{n:.digits$}")))
            }
            "toString" => Ok(Value::String(format_number(*n))),
            _ => Err(not_a_function(&format!("number.{name}"), span)),
        },
        Value::Undefined | Value::Null => Err(EvalFailure::at(
            span,
            format!(
                "cannot read properties of {} (reading '{name}')",
                receiver.to_js_string()
            ),
        )),
        _ => match name {
            "toString" => Ok(Value::String(receiver.to_js_string())),
            _ => Err(not_a_function(&format!("{}.{name}", receiver.type_name()), span)),
        },
    }
}

fn string_method(s: &str, name: &str, args: &[Value], span: Span) -> Result<Value, EvalFailure> {
    let chars: Vec<char> = s.chars().collect();
    Ok(match name {
        "charAt" => {
            let index = arg(args, 0).to_number();
            let index = if index.is_nan() { 0.0 } else { index.trunc() };
            if index < 0.0 {
                Value::String(String::new())
            } else {
                Value::String(
                    chars
                        .get(index as usize)
                        .map(char::to_string)
                        .unwrap_or_default(),
                )
            }
        }
        "indexOf" => {
            let needle: Vec<char> = arg(args, 0).to_js_string().chars().collect();
            let from = relative_index(arg(args, 1), chars.len(), 0);
            let found = (from..=chars.len().saturating_sub(needle.len()))
                .find(|&i| chars[i..].starts_with(&needle));
            Value::Number(found.map_or(-1.0, |i| i as f64))
        }
        "includes" => Value::Bool(s.contains(&arg(args, 0).to_js_string())),
        "startsWith" => Value::Bool(s.starts_with(&arg(args, 0).to_js_string())),
        "endsWith" => Value::Bool(s.ends_with(&arg(args, 0).to_js_string())),
        "slice" => {
            let start = relative_index(arg(args, 0), chars.len(), 0);
            let end = relative_index(arg(args, 1), chars.len(), chars.len());
            Value::String(chars[start..end.max(start)].iter().collect())
        }
        "toUpperCase" => Value::String(s.to_uppercase()),
        "toLowerCase" => Value::String(s.to_lowercase()),
        "trim" => Value::from(s.trim()),
        "toString" => Value::from(s),
        "split" => Value::Array(split(s, arg(args, 0), arg(args, 1))),
        _ => return Err(not_a_function(&format!("string.{name}"), span)),
    })
}

fn split(s: &str, separator: &Value, limit: &Value) -> Vec<Value> {
    let parts: Vec<String> = match separator {
        Value::Undefined => vec![s.to_string()],
        Value::Regex(re) => {
            if s.is_empty() {
                if re.regex().is_match(s) { Vec::new() } else { vec![String::new()] }
            } else {
                re.regex().split(s).map(str::to_string).collect()
            }
        }
        other => {
            let separator = other.to_js_string();
            if separator.is_empty() {
                s.chars().map(|c| c.to_string()).collect()
            } else {
                s.split(separator.as_str()).map(str::to_string).collect()
            }
        }
    };
    let limit = match limit {
        Value::Undefined => usize::MAX,
        other => {
            let n = other.to_number();
            if n.is_nan() { 0 } else { n.max(0.0) as usize }
        }
    };
    parts.into_iter().take(limit).map(Value::String).collect()
}

fn array_method(
    items: &[Value],
    name: &str,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalFailure> {
    Ok(match name {
        // arrays are copied out of the context, so there is nothing to mutate
        "pop" => items.last().cloned().unwrap_or_default(),
        "join" => {
            let separator = match arg(args, 0) {
                Value::Undefined => ",".to_string(),
                other => other.to_js_string(),
            };
            Value::String(join_items(items, &separator))
        }
        "indexOf" => {
            let needle = arg(args, 0);
            let from = relative_index(arg(args, 1), items.len(), 0);
            let found = items[from..].iter().position(|v| v.strict_equals(needle));
            Value::Number(found.map_or(-1.0, |i| (i + from) as f64))
        }
        "includes" => Value::Bool(items.iter().any(|v| v.strict_equals(arg(args, 0)))),
        "slice" => {
            let start = relative_index(arg(args, 0), items.len(), 0);
            let end = relative_index(arg(args, 1), items.len(), items.len());
            Value::Array(items[start..end.max(start)].to_vec())
        }
        "toString" => Value::String(join_items(items, ",")),
        _ => return Err(not_a_function(&format!("array.{name}"), span)),
    })
}

// ============================================================================
// Namespaces and globals
// ============================================================================

pub(super) fn namespace_constant(namespace: &str, name: &str) -> Option<Value> {
    match (namespace, name) {
        ("Math", "PI") => Some(Value::Number(std::f64::consts::PI)),
        ("Math", "E") => Some(Value::Number(std::f64::consts::E)),
        _ => None,
    }
}

pub(super) fn call_namespace(
    namespace: &str,
    name: &str,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalFailure> {
    match namespace {
        "JSON" => json_function(name, args, span),
        _ => math_function(name, args, span),
    }
}

fn json_function(name: &str, args: &[Value], span: Span) -> Result<Value, EvalFailure> {
    match name {
        "stringify" => stringify(arg(args, 0), arg(args, 2))
            .map_err(|e| EvalFailure::at(span, format!("JSON.stringify failed: {e}"))),
        "parse" => serde_json::from_str::<serde_json::Value>(&arg(args, 0).to_js_string())
            .map(Value::from)
            .map_err(|e| EvalFailure::at(span, format!("JSON.parse failed: {e}"))),
        _ => Err(not_a_function(&format!("JSON.{name}"), span)),
    }
}

fn stringify(value: &Value, space: &Value) -> Result<Value, serde_json::Error> {
    let Some(json) = value.to_json() else {
        return Ok(Value::Undefined);
    };
    let indent = match space {
        Value::Number(n) if *n >= 1.0 => " ".repeat(n.min(10.0) as usize),
        Value::String(s) => s.chars().take(10).collect(),
        _ => String::new(),
    };
    if indent.is_empty() {
        return serde_json::to_string(&json).map(Value::String);
    }
    let mut out = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    json.serialize(&mut serializer)?;
    Ok(Value::String(String::from_utf8_lossy(&out).into_owned()))
}

fn math_function(name: &str, args: &[Value], span: Span) -> Result<Value, EvalFailure> {
    let x = arg(args, 0).to_number();
    let n = match name {
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        // rounds half up, including for negatives
        "round" => (x + 0.5).floor(),
        "trunc" => x.trunc(),
        "abs" => x.abs(),
        "sqrt" => x.sqrt(),
        "pow" => x.powf(arg(args, 1).to_number()),
        "max" => fold_numbers(args, f64::NEG_INFINITY, f64::max),
        "min" => fold_numbers(args, f64::INFINITY, f64::min),
        _ => return Err(not_a_function(&format!("Math.{name}"), span)),
    };
    Ok(Value::Number(n))
}

/// Fold numeric arguments, propagating NaN like `Math.max` does.
fn fold_numbers(args: &[Value], init: f64, f: fn(f64, f64) -> f64) -> f64 {
    args.iter().map(Value::to_number).try_fold(init, |acc, n| {
        if n.is_nan() { None } else { Some(f(acc, n)) }
    })
    .unwrap_or(f64::NAN)
}

pub(super) fn call_global(name: &str, args: &[Value], span: Span) -> Result<Value, EvalFailure> {
    Ok(match name {
        "String" => Value::String(args.first().map(Value::to_js_string).unwrap_or_default()),
        "Number" => Value::Number(args.first().map_or(0.0, Value::to_number)),
        "Boolean" => Value::Bool(arg(args, 0).is_truthy()),
        "isNaN" => Value::Bool(arg(args, 0).to_number().is_nan()),
        _ => return Err(not_a_function(name, span)),
    })
}
