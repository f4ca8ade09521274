//! Tree-walking interpreter for the expression language.

use bracketed_core::{Map, RegexValue, Span, Value};
use bracketed_parser::expr::{BinaryOp, Expr, LiteralKind, UnaryOp};
use bracketed_parser::parse_expression;
use bumpalo::Bump;

use super::builtins;
use super::{EvalFailure, Evaluator};

/// The default [`Evaluator`].
///
/// Parses each expression into a fresh arena and walks the tree. Identifiers
/// resolve against the context object; names missing from the context
/// evaluate to `undefined`, except for the built-in `JSON`, `Math`,
/// `String`, `Number`, `Boolean`, `NaN` and `Infinity`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprEvaluator;

impl ExprEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for ExprEvaluator {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn evaluate(&self, code: &str, context: &Value) -> Result<Value, EvalFailure> {
        let arena = Bump::new();
        match parse_expression(code, &arena)? {
            Some(expr) => Interpreter { context }.eval(&expr),
            None => Ok(Value::Undefined),
        }
    }
}

struct Interpreter<'ctx> {
    context: &'ctx Value,
}

impl Interpreter<'_> {
    fn eval(&self, expr: &Expr<'_>) -> Result<Value, EvalFailure> {
        match expr {
            Expr::Literal(lit) => Ok(match &lit.kind {
                LiteralKind::Number(n) => Value::Number(*n),
                LiteralKind::String(s) => Value::from(*s),
                LiteralKind::Bool(b) => Value::Bool(*b),
                LiteralKind::Null => Value::Null,
                LiteralKind::Undefined => Value::Undefined,
                LiteralKind::Regex { source, flags } => Value::Regex(
                    RegexValue::new(source, flags).map_err(|e| {
                        EvalFailure::at(lit.span, format!("invalid regular expression: {e}"))
                    })?,
                ),
            }),

            Expr::Ident(ident) => Ok(self.lookup(ident.name)),

            Expr::This(_) => Ok(self.context.clone()),

            Expr::Array(array) => Ok(Value::Array(
                array
                    .elements
                    .iter()
                    .map(|e| self.eval(e))
                    .collect::<Result<_, _>>()?,
            )),

            Expr::Object(object) => {
                let mut map = Map::with_capacity(object.properties.len());
                for property in object.properties {
                    map.insert(property.key.to_string(), self.eval(&property.value)?);
                }
                Ok(Value::Object(map))
            }

            Expr::Unary(unary) => {
                let operand = self.eval(&unary.operand)?;
                Ok(match unary.op {
                    UnaryOp::Neg => Value::Number(-operand.to_number()),
                    UnaryOp::Plus => Value::Number(operand.to_number()),
                    UnaryOp::LogicalNot => Value::Bool(!operand.is_truthy()),
                    UnaryOp::Typeof => Value::from(operand.type_name()),
                })
            }

            Expr::Binary(binary) => {
                let left = self.eval(&binary.left)?;
                if binary.op.is_short_circuit() {
                    let take_left = match binary.op {
                        BinaryOp::LogicalOr => left.is_truthy(),
                        BinaryOp::LogicalAnd => !left.is_truthy(),
                        _ => !left.is_nullish(),
                    };
                    return if take_left {
                        Ok(left)
                    } else {
                        self.eval(&binary.right)
                    };
                }
                let right = self.eval(&binary.right)?;
                Ok(binary_op(binary.op, &left, &right))
            }

            Expr::Ternary(ternary) => {
                if self.eval(&ternary.condition)?.is_truthy() {
                    self.eval(&ternary.then_expr)
                } else {
                    self.eval(&ternary.else_expr)
                }
            }

            Expr::Member(member) => {
                if let Some(constant) = self.namespace_constant(&member.object, member.property) {
                    return Ok(constant);
                }
                let object = self.eval(&member.object)?;
                builtins::get_property(&object, member.property, member.span)
            }

            Expr::Index(index) => {
                let object = self.eval(&index.object)?;
                let key = self.eval(&index.index)?;
                builtins::get_property(&object, &property_key(&key), index.span)
            }

            Expr::Call(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(&call.callee, &args, call.span)
            }

            Expr::Sequence(sequence) => {
                let mut last = Value::Undefined;
                for expr in sequence.exprs {
                    last = self.eval(expr)?;
                }
                Ok(last)
            }

            Expr::Paren(paren) => self.eval(&paren.expr),
        }
    }

    /// Resolve an identifier against the context, then the built-in globals.
    fn lookup(&self, name: &str) -> Value {
        if let Some(value) = self.context.get(name) {
            return value.clone();
        }
        match name {
            "NaN" => Value::Number(f64::NAN),
            "Infinity" => Value::Number(f64::INFINITY),
            _ => Value::Undefined,
        }
    }

    /// A built-in namespace (`JSON`, `Math`) named by `expr`, unless the
    /// context shadows it.
    fn namespace<'a>(&self, expr: &Expr<'a>) -> Option<&'a str> {
        match expr.unparenthesized() {
            Expr::Ident(ident)
                if builtins::is_namespace(ident.name) && self.context.get(ident.name).is_none() =>
            {
                Some(ident.name)
            }
            _ => None,
        }
    }

    fn namespace_constant(&self, object: &Expr<'_>, property: &str) -> Option<Value> {
        self.namespace(object)
            .and_then(|ns| builtins::namespace_constant(ns, property))
    }

    fn call(&self, callee: &Expr<'_>, args: &[Value], span: Span) -> Result<Value, EvalFailure> {
        match callee.unparenthesized() {
            Expr::Member(member) => {
                if let Some(ns) = self.namespace(&member.object) {
                    return builtins::call_namespace(ns, member.property, args, span);
                }
                let receiver = self.eval(&member.object)?;
                builtins::call_method(&receiver, member.property, args, span)
            }
            Expr::Index(index) => {
                let receiver = self.eval(&index.object)?;
                let name = property_key(&self.eval(&index.index)?);
                builtins::call_method(&receiver, &name, args, span)
            }
            Expr::Ident(ident) if self.context.get(ident.name).is_none() => {
                builtins::call_global(ident.name, args, span)
            }
            other => {
                let value = self.eval(other)?;
                Err(EvalFailure::at(
                    span,
                    format!("{} is not a function", value.type_name()),
                ))
            }
        }
    }
}

/// The property name a computed key refers to.
fn property_key(key: &Value) -> String {
    key.to_js_string()
}

fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> Value {
    use BinaryOp::*;
    match op {
        Add => {
            if is_stringish(left) || is_stringish(right) {
                let mut s = left.to_js_string();
                s.push_str(&right.to_js_string());
                Value::String(s)
            } else {
                Value::Number(left.to_number() + right.to_number())
            }
        }
        Sub => Value::Number(left.to_number() - right.to_number()),
        Mul => Value::Number(left.to_number() * right.to_number()),
        Div => Value::Number(left.to_number() / right.to_number()),
        Mod => Value::Number(left.to_number() % right.to_number()),
        Equal => Value::Bool(left.loose_equals(right)),
        NotEqual => Value::Bool(!left.loose_equals(right)),
        StrictEqual => Value::Bool(left.strict_equals(right)),
        StrictNotEqual => Value::Bool(!left.strict_equals(right)),
        Less | LessEqual | Greater | GreaterEqual => Value::Bool(compare(op, left, right)),
        // handled before both operands are evaluated
        LogicalOr | LogicalAnd | Nullish => Value::Undefined,
    }
}

/// Values that become strings when used with `+`.
fn is_stringish(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Regex(_)
    )
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> bool {
    if let (Value::String(a), Value::String(b)) = (left, right) {
        return match op {
            BinaryOp::Less => a < b,
            BinaryOp::LessEqual => a <= b,
            BinaryOp::Greater => a > b,
            _ => a >= b,
        };
    }
    let (a, b) = (left.to_number(), right.to_number());
    match op {
        BinaryOp::Less => a < b,
        BinaryOp::LessEqual => a <= b,
        BinaryOp::Greater => a > b,
        _ => a >= b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(code: &str, context: serde_json::Value) -> Value {
        ExprEvaluator.evaluate(code, &Value::from(context)).unwrap()
    }

    fn eval_err(code: &str) -> EvalFailure {
        ExprEvaluator
            .evaluate(code, &Value::from(json!({})))
            .unwrap_err()
    }

    // ========================================================================
    // Values and lookup
    // ========================================================================

    #[test]
    fn empty_expression_is_undefined() {
        assert_eq!(eval("", json!({})), Value::Undefined);
        assert_eq!(eval("   ", json!({})), Value::Undefined);
    }

    #[test]
    fn identifiers_resolve_against_context() {
        assert_eq!(eval(" x ", json!({"x": 2})), json!(2));
        assert_eq!(eval("missing", json!({})), Value::Undefined);
        assert_eq!(eval("this.x", json!({"x": "y"})), json!("y"));
        assert_eq!(eval("a.b.c", json!({"a": {"b": {"c": true}}})), json!(true));
    }

    #[test]
    fn literals() {
        assert_eq!(eval("{ a:1 }", json!({})), json!({"a": 1}));
        assert_eq!(eval("{a: {}}", json!({})), json!({"a": {}}));
        assert_eq!(eval("[1, 'b', null]", json!({})), json!([1, "b", null]));
        assert_eq!(eval(r#""\{ 1 \}""#, json!({})), json!("{ 1 }"));
        assert_eq!(eval("{a}", json!({"a": 3})), json!({"a": 3}));
    }

    // ========================================================================
    // Operators
    // ========================================================================

    #[test]
    fn arithmetic() {
        assert_eq!(eval("1 + 1", json!({})), json!(2));
        assert_eq!(eval("7 % 4 * 2", json!({})), json!(6));
        assert_eq!(eval("-x", json!({"x": 3})), json!(-3));
        assert_eq!(eval("+'5'", json!({})), json!(5));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval("'a' + 1", json!({})), json!("a1"));
        assert_eq!(eval("[1,2] + ''", json!({})), json!("1,2"));
        assert_eq!(eval("'' + {}", json!({})), json!("[object Object]"));
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("a < 1", json!({"a": 0})), json!(true));
        assert_eq!(eval("a > 2", json!({"a": 0})), json!(false));
        assert_eq!(eval("'b' >= 'a'", json!({})), json!(true));
        assert_eq!(eval("1 == '1'", json!({})), json!(true));
        assert_eq!(eval("1 === '1'", json!({})), json!(false));
        assert_eq!(eval("null != undefined", json!({})), json!(false));
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(eval("0 || 'x'", json!({})), json!("x"));
        assert_eq!(eval("0 && missing.prop", json!({})), json!(0));
        assert_eq!(eval("null ?? 'd'", json!({})), json!("d"));
        assert_eq!(eval("0 ?? 'd'", json!({})), json!(0));
        assert_eq!(eval("!x", json!({"x": ""})), json!(true));
    }

    #[test]
    fn ternary_and_sequence() {
        assert_eq!(eval("x ? 'yes' : 'no'", json!({"x": 1})), json!("yes"));
        assert_eq!(eval(r#"("b"),("c")"#, json!({})), json!("c"));
    }

    #[test]
    fn typeof_names() {
        assert_eq!(eval("typeof 1", json!({})), json!("number"));
        assert_eq!(eval("typeof missing", json!({})), json!("undefined"));
        assert_eq!(eval("typeof null", json!({})), json!("object"));
    }

    // ========================================================================
    // Built-ins
    // ========================================================================

    #[test]
    fn method_calls() {
        assert_eq!(eval("[1].pop()", json!({})), json!(1));
        assert_eq!(eval("str.charAt(0)", json!({"str": "x"})), json!("x"));
        assert_eq!(eval("str[0]", json!({"str": "xyz"})), json!("x"));
        assert_eq!(eval("JSON.stringify({ x: 5 })", json!({})), json!("{\"x\":5}"));
        assert_eq!(eval("Math.max(1, 3, 2)", json!({})), json!(3));
        assert_eq!(eval("/^a/i.test('Abc')", json!({})), json!(true));
    }

    #[test]
    fn regex_literal_braces() {
        let ctx = || json!({"s": "a}", "n": "aa"});
        assert_eq!(eval("/}/.test(s)", ctx()), json!(true));
        assert_eq!(eval("/[}]/.test(s)", ctx()), json!(true));
        assert_eq!(eval("/^a{2}$/.test(n)", ctx()), json!(true));
        assert_eq!(eval("/^a{2}$/.test(s)", ctx()), json!(false));
    }

    #[test]
    fn context_shadows_namespaces() {
        assert_eq!(eval("Math.PI", json!({"Math": {"PI": 3}})), json!(3));
    }

    #[test]
    fn regex_literal_value() {
        match eval("/b}{/i", json!({})) {
            Value::Regex(re) => {
                assert_eq!(re.source(), "b}{");
                assert_eq!(re.flags(), "i");
                assert!(re.regex().is_match("aB}{"));
            }
            other => panic!("expected regex, got {other:?}"),
        }
    }

    // ========================================================================
    // Failures
    // ========================================================================

    #[test]
    fn syntax_errors_fail() {
        let failure = eval_err("a +");
        assert_eq!(failure.span, Some(Span::point(1, 4)));
    }

    #[test]
    fn property_of_undefined_fails() {
        let failure = eval_err("missing.prop");
        assert!(failure.message.contains("undefined"));
        assert_eq!(failure.span, Some(Span::new(1, 1, 12)));
    }

    #[test]
    fn calling_non_function_fails() {
        let failure = eval_err("nope()");
        assert!(failure.message.contains("is not a function"));
    }

    #[test]
    fn invalid_regex_fails() {
        let failure = eval_err("/(/.test('x')");
        assert!(failure.message.contains("invalid regular expression"));
    }
}
