mod common;

use pretty_assertions::assert_eq;
use rstest::rstest;

use rox::diagnostics::Diagnostics;
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::scanner::scan_tokens;
use rox::value::{NativeFunction, Value};

fn evaluate(source: &str) -> Result<String, String> {
    let buffer = common::SharedBuffer::default();
    let mut interpreter = common::interpreter(&buffer);
    let mut diagnostics = Diagnostics::new();

    let tokens = scan_tokens(source, &mut diagnostics);
    let expr = Parser::new(&tokens, &mut diagnostics)
        .parse_expression()
        .expect("expression should parse");

    interpreter
        .interpret_expression(&expr)
        .map(|value| interpreter.stringify(&value))
        .map_err(|e| e.to_string())
}

#[rstest]
#[case("2 + 3 * 4 - 5 / 2", "13.5")]
#[case("(1 + 2) * 3", "9")]
#[case("10 / 4", "2.5")]
#[case("-0.5 + 1", "0.5")]
#[case("1 / 0", "Infinity")]
#[case("\"foo\" + \"bar\"", "foobar")]
#[case("!nil", "true")]
#[case("!0", "false")]
#[case("1 == 1.0", "true")]
#[case("\"1\" == 1", "false")]
#[case("nil == nil", "true")]
#[case("nil or \"x\"", "x")]
#[case("false and missing", "false")]
#[case("3 >= 3", "true")]
#[case("clock()", "42")]
fn expressions_evaluate(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(evaluate(source), Ok(expected.to_string()));
}

#[rstest]
#[case("-\"a\"", "Operand must be a number.\n[line 1]")]
#[case("1 < \"2\"", "Operands must be numbers.\n[line 1]")]
#[case("1 + nil", "Operands must be two numbers or two strings.\n[line 1]")]
#[case("missing", "Undefined variable 'missing'.\n[line 1]")]
#[case("\"not callable\"()", "Can only call functions and classes.\n[line 1]")]
#[case("clock(1)", "Expected 0 arguments but got 1.\n[line 1]")]
fn expression_runtime_errors(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(evaluate(source), Err(expected.to_string()));
}

#[test]
fn partial_output_then_abort() {
    let outcome = common::run("print \"A\";\n1 + \"b\";\nprint \"C\";");

    assert_eq!(outcome.output, "A\n");
    assert!(outcome.had_runtime_error);
    assert!(!outcome.had_error);
    assert_eq!(
        outcome.errors,
        vec!["Operands must be two numbers or two strings.\n[line 2]"]
    );
}

#[test]
fn closures_share_captured_environment() {
    let source = "fun counter() { var i = 0; fun inc() { i = i + 1; print i; } return inc; }\n\
                  var c = counter(); c(); c();";
    let outcome = common::run(source);

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.lines(), vec!["1", "2"]);
}

#[test]
fn shadowing_is_scope_local() {
    let outcome = common::run("var x = \"outer\"; { var x = \"inner\"; print x; } print x;");

    assert_eq!(outcome.lines(), vec!["inner", "outer"]);
}

#[test]
fn globals_are_late_bound() {
    let source = "fun show() { print later; }\nvar later = \"ok\";\nshow();";
    let outcome = common::run(source);

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.output, "ok\n");
}

#[test]
fn control_flow_and_for_loops() {
    let source = r#"
var total = 0;
for (var i = 1; i <= 4; i = i + 1) {
  if (i == 3) total = total + 10; else total = total + i;
}
print total;
var n = 0;
while (n < 3) n = n + 1;
print n;
"#;
    let outcome = common::run(source);

    assert_eq!(outcome.lines(), vec!["17", "3"]);
}

#[test]
fn return_unwinds_to_the_call_boundary_only() {
    let source = r#"
fun find(limit) {
  var i = 0;
  while (true) {
    { if (i == limit) return i; }
    i = i + 1;
  }
  print "unreachable";
}
print find(3);
print "after";
"#;
    let outcome = common::run(source);

    assert_eq!(outcome.lines(), vec!["3", "after"]);
}

#[test]
fn recursion() {
    let source = "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }\n\
                  print fib(15);";

    assert_eq!(common::run(source).output, "610\n");
}

#[test]
fn values_stringify_like_the_language() {
    let source = r#"
fun f() {}
class Bagel {}
print f;
print Bagel;
print Bagel();
print clock;
print nil;
print 1.50;
print f();
"#;
    let outcome = common::run(source);

    assert_eq!(
        outcome.lines(),
        vec!["<fn f>", "Bagel", "Bagel instance", "<native fn>", "nil", "1.5", "nil"]
    );
}

#[test]
fn instances_hold_fields_and_bound_methods() {
    let source = r#"
class Box {
  init(value) { this.value = value; }
  get() { return this.value; }
}
var b = Box(7);
var getter = b.get;
b.value = 8;
print getter();
print b.init(9) == b;
print b.value;
"#;
    let outcome = common::run(source);

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.lines(), vec!["8", "true", "9"]);
}

#[test]
fn init_always_yields_the_instance() {
    let source = r#"
class Early {
  init(flag) {
    this.set = true;
    if (flag) return;
    this.set = false;
  }
}
var e = Early(true);
print e;
print e.set;
"#;
    let outcome = common::run(source);

    assert_eq!(outcome.lines(), vec!["Early instance", "true"]);
}

#[test]
fn super_dispatches_to_the_defining_class_with_original_receiver() {
    let source = r#"
class A {
  method() { print "A method"; }
  name() { return "A sees " + this.tag; }
}
class B < A {
  method() { print "B method"; }
  test() { super.method(); print super.name(); }
}
class C < B {}
var c = C();
c.tag = "C";
c.test();
c.method();
"#;
    let outcome = common::run(source);

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.lines(), vec!["A method", "A sees C", "B method"]);
}

#[test]
fn class_arity_follows_inherited_initializer() {
    let source = r#"
class P { init(a, b) { this.sum = a + b; } }
class Q < P {}
print Q(1, 2).sum;
Q(1);
"#;
    let outcome = common::run(source);

    assert_eq!(outcome.output, "3\n");
    assert_eq!(
        outcome.errors,
        vec!["Expected 2 arguments but got 1.\n[line 5]"]
    );
}

#[rstest]
#[case("var x = 1; x.y;", "Only instances have properties.\n[line 1]")]
#[case("var x = 1; x.y = 2;", "Only instances have fields.\n[line 1]")]
#[case("class A {} A().missing;", "Undefined property 'missing'.\n[line 1]")]
#[case("var NotAClass = 1; class B < NotAClass {}", "Superclass must be a class.\n[line 1]")]
#[case("undefined = 1;", "Undefined variable 'undefined'.\n[line 1]")]
fn object_model_runtime_errors(#[case] source: &str, #[case] expected: &str) {
    let outcome = common::run(source);

    assert!(outcome.had_runtime_error);
    assert_eq!(outcome.errors, vec![expected.to_string()]);
}

#[test]
fn heap_values_compare_by_identity() {
    let source = r#"
class A {}
var a = A();
var b = A();
print a == a;
print a == b;
print A == A;
fun f() {}
print f == f;
"#;

    assert_eq!(
        common::run(source).lines(),
        vec!["true", "false", "true", "true"]
    );
}

#[test]
fn one_interpreter_persists_across_runs() {
    let buffer = common::SharedBuffer::default();
    let mut interpreter = common::interpreter(&buffer);
    let mut diagnostics = Diagnostics::new();

    let lines = [
        "var count = 0; fun bump() { count = count + 1; }",
        "bump(); bump();",
        "{ var local = count; print local; }",
    ];
    for line in lines {
        rox::run(line, &mut interpreter, &mut diagnostics);
    }

    assert!(diagnostics.errors().is_empty());
    assert_eq!(buffer.contents(), "2\n");
}

#[test]
fn host_defined_natives_are_callable() {
    let buffer = common::SharedBuffer::default();
    let mut interpreter: Interpreter = common::interpreter(&buffer);
    let mut diagnostics = Diagnostics::new();

    interpreter.define_native(NativeFunction::new("double", 1, |args: &[Value]| {
        match args.first() {
            Some(Value::Number(n)) => Value::Number(n * 2.0),
            _ => Value::Nil,
        }
    }));

    rox::run("print double(21); print double;", &mut interpreter, &mut diagnostics);

    assert!(diagnostics.errors().is_empty());
    assert_eq!(buffer.contents(), "42\n<native fn>\n");
}

#[rstest]
#[case("-0", "0")]
#[case("0 * -1", "0")]
#[case("1000000000000000000000", "1e+21")]
#[case("100000000000000000000", "100000000000000000000")]
#[case("0.0000001", "1e-7")]
#[case("0.000001", "0.000001")]
#[case("123456789012345678901234567890", "1.2345678901234568e+29")]
#[case("0.1 + 0.2", "0.30000000000000004")]
fn numbers_print_in_shortest_script_form(#[case] source: &str, #[case] expected: &str) {
    let outcome = common::run(&format!("print {};", source));

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.output, format!("{}\n", expected));
}

#[test]
fn block_scope_is_restored_after_a_runtime_error() {
    let buffer = common::SharedBuffer::default();
    let mut interpreter = common::interpreter(&buffer);
    let mut diagnostics = Diagnostics::new();

    rox::run(
        "var x = \"g\"; { var x = \"l\"; 1 + nil; }",
        &mut interpreter,
        &mut diagnostics,
    );
    assert!(diagnostics.had_runtime_error());

    diagnostics.clear();
    rox::run("print x;", &mut interpreter, &mut diagnostics);

    assert!(diagnostics.errors().is_empty());
    assert_eq!(buffer.contents(), "g\n");
}

#[test]
fn else_binds_to_the_nearest_if() {
    let outcome = common::run("if (true) if (false) print 1; else print 2;");

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.output, "2\n");
}
