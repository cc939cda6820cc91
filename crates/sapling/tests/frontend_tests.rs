//! End-to-end tests of the reference frontend

use pretty_assertions::assert_eq;
use sapling::*;

fn run(src: &str) -> Value {
    Interpreter::new(Config::default())
        .run(src)
        .unwrap_or_else(|err| panic!("{src:?} failed: {err}"))
}

fn parse_error(src: &str) -> ParseError {
    match parse(src) {
        Err(err) => err,
        Ok(_) => panic!("expected a parse error from {src:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Lexical
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_comments_are_ignored() {
    let src = "
        // line comment
        x := 1 # trailing hash comment
        # whole-line hash comment
        x + 1 // done";
    assert_eq!(run(src), Value::Int(2));
}

#[test]
fn test_string_escapes() {
    assert_eq!(run("len(\"a\\tb\\n\")"), Value::Int(4));
    assert_eq!(run("'it\\'s'"), Value::string("it's"));
    assert_eq!(run("\"say \\\"hi\\\"\""), Value::string("say \"hi\""));
}

#[test]
fn test_float_and_int_literals() {
    assert_eq!(run("[1, 2.5, 1.0e3]").to_string(), "[1, 2.5, 1000.0]");
}

// ═══════════════════════════════════════════════════════════════════════
// Declarations
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_var_and_const_declarations() {
    assert_eq!(run("var a = 1\nconst b = 2\na = a + b\na"), Value::Int(3));
    assert!(Interpreter::new(Config::default()).run("const c = 1\nc = 2").is_err());
}

#[test]
fn test_semicolons_separate_statements() {
    assert_eq!(run("a := 1; b := 2;; a + b;"), Value::Int(3));
}

// ═══════════════════════════════════════════════════════════════════════
// Loop Headers
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_all_for_forms() {
    let src = "
        n := 0
        for i := 0; i < 3; i++ { n++ }
        for (i := 0; i < 3; i++) { n++ }
        for n < 10 { n++ }
        for (n < 12) { n++ }
        for { n++; if n >= 15 { break } }
        n";
    assert_eq!(run(src), Value::Int(15));
}

#[test]
fn test_else_if_chain() {
    let src = "
        func grade(s) {
            if s >= 90 { \"a\" } else if s >= 80 { \"b\" } else { \"c\" }
        }
        [grade(95), grade(85), grade(10)]";
    assert_eq!(run(src).to_string(), "[\"a\", \"b\", \"c\"]");
}

// ═══════════════════════════════════════════════════════════════════════
// Parse Errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_parse_error_location() {
    let err = parse_error("x := 1\ny := (2 + ");
    let location = err.location.unwrap();
    assert_eq!(location.line, 2);
    assert!(err.message.contains("end of input"), "{}", err.message);
}

#[test]
fn test_unexpected_character() {
    let err = parse_error("x := 1\n  @");
    let location = err.location.unwrap();
    assert_eq!((location.line, location.column), (2, 3));
    assert!(err.message.contains("unexpected character"));
}

#[test]
fn test_frontend_reports_file_name() {
    let err = SaplingFrontend::new("script.sap").parse("func (").unwrap_err();
    assert_eq!(err.location.unwrap().file, "script.sap");
}

#[test]
fn test_nothing_to_evaluate() {
    assert_eq!(run(""), Value::Nil);
    assert_eq!(run("// just a comment"), Value::Nil);
}
