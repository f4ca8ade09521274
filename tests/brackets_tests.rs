//! End-to-end tests for the global delimiter registry, splitting and
//! rendering.

use std::sync::Arc;

use bracketed::{
    Brackets, E_NUMBER, Engine, Part, TemplateError, Value, delimiters, has_expr, loop_keys, parse,
    render_str, set_delimiters, split,
};
use regex::Regex;
use serde_json::json;
use serial_test::serial;

fn data() -> Value {
    Value::from(json!({
        "yes": true,
        "no": false,
        "x": 2,
        "str": "x"
    }))
}

fn render(template: &str) -> Value {
    render_str(template, &data()).unwrap()
}

fn set(spec: &str) {
    set_delimiters(Some(spec)).unwrap();
}

fn reset() {
    set_delimiters(None).unwrap();
}

fn pair() -> String {
    delimiters().join(" ")
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
#[serial]
fn test_default_when_unset_or_empty() {
    set("[ ]");
    set_delimiters(None).unwrap();
    assert_eq!(pair(), "{ }");
    assert_eq!(render("{ x }"), json!(2));

    set("[ ]");
    set_delimiters(Some("")).unwrap();
    assert_eq!(pair(), "{ }");
    assert_eq!(render("{ x }"), json!(2));
}

#[test]
#[serial]
fn test_single_and_multi_character_brackets() {
    reset();

    set("[ ]");
    assert_eq!(pair(), "[ ]");
    assert_eq!(render("[ x ]"), json!(2));
    assert_eq!(render(r"[ str\[0\] ]"), json!("x"));

    set("{{ }}");
    assert_eq!(pair(), "{{ }}");
    assert_eq!(render("{{ x }}"), json!(2));

    set("${ }");
    assert_eq!(pair(), "${ }");
    assert_eq!(render("${ x }"), json!(2));

    reset();
}

#[test]
#[serial]
fn test_reconfiguration_changes_interpretation() {
    set("[ ]");
    assert_eq!(render("[ x ]"), json!(2));
    reset();
    assert_eq!(render("[ x ]"), json!("[ x ]"));
}

#[test]
#[serial]
fn test_forbidden_characters_are_rejected() {
    reset();
    for spec in [", ,", "\" \"", "a[ ]a", "<% %>", "{ } {", "{", "{  }"] {
        let err = set_delimiters(Some(spec)).unwrap_err();
        assert!(err.to_string().contains(spec), "{err}");
    }
    assert_eq!(pair(), "{ }");

    set("[ ]");
    assert!(set_delimiters(Some("<% %>")).is_err());
    assert_eq!(pair(), "[ ]");
    reset();
}

#[test]
#[serial]
fn test_escaped_forms() {
    reset();
    let brackets = Brackets::global();

    let template = Arc::new(Regex::new(r"\{x\}").unwrap());
    assert!(Arc::ptr_eq(&brackets.rebind(&template).unwrap(), &template));
    assert_eq!(brackets.get(Part::Open), "{");
    assert_eq!(brackets.get(Part::Close), "}");
    assert_eq!(brackets.get(Part::OpenEscaped), r"\{");
    assert_eq!(brackets.get(Part::CloseEscaped), r"\}");

    let cases = [
        ("{# #}", r"\{\# \#\}"),
        ("[! !]", r"\[! !\]"),
        ("·ʃ ʃ", "·ʃ ʃ"),
        ("{$ $}", r"\{\$ \$\}"),
        ("_( )_", r"_\( \)_"),
    ];
    let pattern = Arc::new(Regex::new(r"\{ \}").unwrap());
    for (spec, escaped) in cases {
        set(spec);
        assert_eq!(brackets.rebind(&pattern).unwrap().as_str(), escaped);

        let tokens: Vec<&str> = spec.split(' ').collect();
        assert_eq!(brackets.get(Part::Open), tokens[0]);
        assert_eq!(brackets.get(Part::Close), tokens[1]);

        let tokens: Vec<&str> = escaped.split(' ').collect();
        assert_eq!(brackets.get(Part::OpenEscaped), tokens[0]);
        assert_eq!(brackets.get(Part::CloseEscaped), tokens[1]);
    }
    reset();
}

#[test]
#[serial]
fn test_pattern_identity_across_calls() {
    reset();
    let brackets = Brackets::global();
    let a = brackets.pattern(r"^\{\s*\}$").unwrap();
    let b = brackets.pattern(r"^\{\s*\}$").unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    set("[[ ]]");
    let c = brackets.pattern(r"^\{\s*\}$").unwrap();
    assert!(c.is_match("[[  ]]"));
    assert!(!c.is_match("{ }"));
    reset();
}

// ============================================================================
// Brackets inside expressions
// ============================================================================

#[test]
#[serial]
fn test_brackets_can_always_be_escaped() {
    reset();
    assert_eq!(render(r#"{ "\{ 1 \}" }"#), json!("{ 1 }"));
    assert_eq!(render(r"\{ 1 }"), json!("{ 1 }"));
    assert_eq!(render(r#"{ "\}" }"#), json!("}"));
    assert_eq!(render(r#"{ "\{" }"#), json!("{"));
}

#[test]
#[serial]
fn test_escaping_is_optional() {
    reset();
    assert_eq!(render("{ JSON.stringify({ x: 5 }) }"), json!(r#"{"x":5}"#));
    assert_eq!(
        render(r#"a{ "b{c}d" }e { "{f{f}}" } g"#),
        json!("ab{c}de {f{f}} g")
    );

    set("[ ]");
    assert_eq!(
        render(r#"a[ "b[c]d" ]e [ "[f[f]]" ] g"#),
        json!("ab[c]de [f[f]] g")
    );

    set("{{ }}");
    assert_eq!(
        render(r#"a{{ "b{{c}}d" }}e {{ "{f{{f}}}" }} g"#),
        json!("ab{{c}}de {f{{f}}} g")
    );

    set("[[ ]]");
    assert_eq!(
        render(r#"a[[ "b[[c]]d" ]]e [["[[f[f]]]"]]g[[]]"#),
        json!("ab[[c]]de [[f[f]]]g")
    );
    reset();
}

#[test]
#[serial]
fn test_brackets_inside_strings() {
    reset();
    assert_eq!(render(r#"a{ "b{" }c"#), json!("ab{c"));
    assert_eq!(render(r#"a{ "b\{" }c"#), json!("ab{c"));
    assert_eq!(render(r#"a{ "{b" }c"#), json!("a{bc"));
    assert_eq!(render(r#"a{ "\{b" }c"#), json!("a{bc"));

    assert_eq!(render(r#"a{ "b}" }c"#), json!("ab}c"));
    assert_eq!(render(r#"a{ "b\}" }c"#), json!("ab}c"));
    assert_eq!(render(r#"a{ "}b" }c"#), json!("a}bc"));
    assert_eq!(render(r#"a{ "\}b" }c"#), json!("a}bc"));

    assert_eq!(render(r#"{"{"}"#), json!("{"));
    assert_eq!(render(r#"{"\{"}"#), json!("{"));
    assert_eq!(render(r#"{"}"}"#), json!("}"));
    assert_eq!(render(r#"{"\}"}"#), json!("}"));

    assert_eq!(render(r#"{{a:"{}}"}}"#), json!({"a": "{}}"}));
    assert_eq!(render(r#"{{a:"{\}\}"}}"#), json!({"a": "{}}"}));

    assert_eq!(render(r#"{ "}" }"#), json!("}"));
}

#[test]
#[serial]
fn test_square_brackets() {
    set("[ ]");
    assert_eq!(render("[ str[0] ]"), json!("x"));
    assert_eq!(render("[ [1].pop() ]"), json!(1));
    assert_eq!(render(r#"a,[["b", "c"]],d"#), json!("a,b,c,d"));
    reset();
}

#[test]
#[serial]
fn test_parentheses() {
    set("( )");
    assert_eq!(render("(str.charAt(0))"), json!("x"));
    assert_eq!(render("((1 + 1))"), json!(2));
    assert_eq!(render(r#"a,(("b"),("c")),d"#), json!("a,c,d"));
    reset();
}

#[test]
#[serial]
fn test_double_braces() {
    set("{{ }}");
    assert_eq!(render("{{{ a:1 }}}"), json!({"a": 1}));
    assert_eq!(render("{{{a: {}}}}"), json!({"a": {}}));
    assert_eq!(render(r"{{{a: {\}}}}"), json!({"a": {}}));
    assert_eq!(render(" {{{}}}"), json!(" [object Object]"));
    reset();
}

#[test]
#[serial]
fn test_double_parentheses() {
    set("(( ))");
    assert_eq!(render("((({})))"), json!({}));
    assert_eq!(render(r#"(((("o"))))="o""#), json!(r#"o="o""#));
    assert_eq!(render(r#"((( ("o") )))="o""#), json!(r#"o="o""#));
    reset();
}

#[test]
#[serial]
fn test_asymmetric_brackets() {
    set("${ }");
    assert_eq!(render("${ {a:1} }"), json!({"a": 1}));
    assert_eq!(render(r"${ {a:1\} }"), json!({"a": 1}));
    reset();
}

#[test]
#[serial]
fn test_unequal_length_tokens() {
    set("[ ]]");
    assert_eq!(render(r#"a[ "[]]"]]b"#), json!("a[]]b"));
    assert_eq!(render("[[[]]]]"), json!([[]]));

    set("( ))");
    assert_eq!(render(r#"a( "b))" ))c"#), json!("ab))c"));
    assert_eq!(render(r#"a( (("bc))")) ))"#), json!("abc))"));
    assert_eq!(render(r#"a( ("(((b))") ))c"#), json!("a(((b))c"));
    assert_eq!(render(r#"a( ("b" + (")c" ))))"#), json!("ab)c"));
    reset();
}

#[test]
#[serial]
fn test_reconfiguration_releases_compiled_templates() {
    reset();
    let templates = Engine::global().templates();
    for i in 0..500 {
        let spec = if i % 2 == 0 { "[ ]" } else { "{{ }}" };
        if i % 3 == 0 {
            Brackets::global().set(Some(spec)).unwrap();
        } else {
            set(spec);
        }
        parse(&format!("a [ x ] {{{{ x }}}} {i}")).unwrap();
        assert_eq!(templates.len(), 1);
    }
    reset();
    assert!(templates.is_empty());
}

// ============================================================================
// Helpers
// ============================================================================

#[test]
#[serial]
fn test_detector() {
    reset();
    for (text, expected) in [
        ("{ 123 }", true),
        ("}{", false),
        ("{", false),
        (r"\{}", true),
        ("{}", true),
    ] {
        assert_eq!(has_expr(text).unwrap(), expected, "{text}");
    }

    set("[[ ]]");
    assert!(has_expr("a [[b]] c").unwrap());
    assert!(!has_expr("a {b} c").unwrap());
    reset();
}

#[test]
#[serial]
fn test_number_constant_renders() {
    reset();
    assert_eq!(render(E_NUMBER), json!("number"));
    assert_eq!(render("{ typeof x }"), json!(E_NUMBER));
}

#[test]
#[serial]
fn test_loop_keys() {
    reset();
    let keys = loop_keys("{ item, i in items }").unwrap();
    assert_eq!(keys.key, "item");
    assert_eq!(keys.pos.as_deref(), Some("i"));
    assert_eq!(keys.val, "{items}");
    assert!(loop_keys("{ items }").is_none());
}

// ============================================================================
// Splitting
// ============================================================================

#[test]
#[serial]
fn test_split_with_current_brackets() {
    reset();
    let template = "<tag att=\"{ a }\" expr1={a<1} expr2={a>2}>\n{body}\r\n</tag>\n";
    let parts = split(template, None).unwrap();

    assert_eq!(parts.len(), 9);
    assert_eq!(parts[1], " a ");
    assert_eq!(parts[3], "a<1");
    assert_eq!(parts[5], "a>2");
    assert_eq!(parts[7], "body");
    assert!(parts[8].contains("</tag>"));
}

#[test]
#[serial]
fn test_split_with_other_brackets() {
    reset();
    let template = "<tag att1=\"$[a]\" att2=$[a<1] att3=$[a>2]>\n{body}\r\n</tag>\n";
    let custom = Brackets::array(Some("$[ ]")).unwrap();
    let parts = split(template, Some(&custom)).unwrap();

    assert_eq!(parts.len(), 7);
    assert_eq!(parts[1], "a");
    assert_eq!(parts[3], "a<1");
    assert_eq!(parts[5], "a>2");
    assert!(parts[6].contains("{body}"));
    assert_eq!(pair(), "{ }");
}

#[test]
#[serial]
fn test_split_quotes_inside_quoted_attributes() {
    reset();
    let template = r#"<tag att1="{"a"}" att2={"a"} att3={'a'}>'{'a'}'</tag>"#;
    let parts = split(template, None).unwrap();

    assert_eq!(parts.len(), 9);
    assert_eq!(parts[1], r#""a""#);
    assert_eq!(parts[3], r#""a""#);
    assert_eq!(parts[5], "'a'");
    assert_eq!(parts[7], "'a'");
    assert!(parts[8].contains("</tag>"));
}

#[test]
#[serial]
fn test_split_difficult_regexes() {
    reset();
    let (p1, p2) = (r#"<p a=""#, r#"">"#);
    let cases: &[&[&str]] = &[
        &[p1, "{5+3/ /}/}", p2],
        &[p1, "{/[///[]}/}", p2],
        &[p1, r"{/\/[}\]]/}", p2],
        &[p1, "{x/y}", "", "{x/g}", p2],
        &[p1, "{a++/b}", "", "{/i}", p2],
        &[p1, "{''+/b}{/i}", p2],
        &[p1, "{a==/b}{/i}", p2],
    ];

    for parts in cases {
        let template = parts.concat();
        let split = split(&template, None).unwrap();
        let expected: Vec<&str> = parts
            .iter()
            .map(|p| {
                p.strip_prefix('{')
                    .and_then(|p| p.strip_suffix('}'))
                    .unwrap_or(p)
            })
            .collect();
        assert_eq!(split, expected, "{template}");
    }
}

#[test]
#[serial]
fn test_split_alternation_and_reassembly() {
    reset();
    for template in ["", "plain", "{a}", "a{b}c{d}e", "{x}{y}"] {
        let parts = split(template, None).unwrap();
        assert_eq!(parts.len() % 2, 1);
        let rebuilt: String = parts
            .iter()
            .enumerate()
            .map(|(i, p)| if i % 2 == 1 { format!("{{{p}}}") } else { p.clone() })
            .collect();
        assert_eq!(rebuilt, template);
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
#[serial]
fn test_unbalanced_input_is_a_parse_error() {
    reset();
    let err = render_str("a{ (b }", &data()).unwrap_err();
    assert!(matches!(err, TemplateError::Parse(_)), "{err:?}");
    assert!(split("x { 'open", None).is_err());
}

#[test]
#[serial]
fn test_failing_expression_is_an_eval_error() {
    reset();
    let err = render_str("ok { missing.deep } ok", &data()).unwrap_err();
    let TemplateError::Eval(err) = err else {
        panic!("expected eval error, got {err:?}");
    };
    assert_eq!(err.segment, 1);
    assert_eq!(err.expression, " missing.deep ");
}

#[test]
#[serial]
fn test_deeply_nested_expression_is_an_eval_error() {
    reset();
    let template = format!("{{{}x{}}}", "(".repeat(100_000), ")".repeat(100_000));
    let err = render_str(&template, &data()).unwrap_err();
    let TemplateError::Eval(err) = err else {
        panic!("expected eval error, got {err:?}");
    };
    assert_eq!(err.segment, 1);
    assert!(err.message.contains("nested too deeply"), "{}", err.message);
}
