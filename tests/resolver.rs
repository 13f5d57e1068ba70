mod common;

use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(
    "{ var a = 1; var a = 2; }",
    "[line 1] Error at 'a': Already a variable with this name in this scope."
)]
#[case(
    "{ var a = a; }",
    "[line 1] Error at 'a': Can't read local variable in its own initializer."
)]
#[case("return 1;", "[line 1] Error at 'return': Can't return from top-level code.")]
#[case(
    "class A { init() { return 1; } }",
    "[line 1] Error at 'return': Can't return a value from an initializer."
)]
#[case("print this;", "[line 1] Error at 'this': Can't use 'this' outside of a class.")]
#[case(
    "fun f() { return this; }",
    "[line 1] Error at 'this': Can't use 'this' outside of a class."
)]
#[case(
    "fun f() { super.m(); }",
    "[line 1] Error at 'super': Can't use 'super' outside of a class."
)]
#[case(
    "class A { m() { super.m(); } }",
    "[line 1] Error at 'super': Can't use 'super' in a class with no superclass."
)]
#[case("class A < A {}", "[line 1] Error at 'A': A class can't inherit from itself.")]
#[case(
    "fun f(a, a) {}",
    "[line 1] Error at 'a': Already a variable with this name in this scope."
)]
fn static_errors_are_reported_at_the_offending_token(
    #[case] source: &str,
    #[case] expected: &str,
) {
    let outcome = common::run(source);

    assert!(outcome.had_error);
    assert!(!outcome.had_runtime_error);
    assert_eq!(outcome.errors, vec![expected.to_string()]);
}

#[test]
fn resolution_errors_suppress_execution() {
    let outcome = common::run("print \"before\";\n{ var a = a; }\nprint \"after\";");

    assert_eq!(outcome.output, "");
    assert_eq!(
        outcome.errors,
        vec!["[line 2] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn every_resolution_error_is_collected() {
    let outcome = common::run("return 1;\nprint this;\n{ var b; var b; }");

    assert_eq!(
        outcome.errors,
        vec![
            "[line 1] Error at 'return': Can't return from top-level code.",
            "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            "[line 3] Error at 'b': Already a variable with this name in this scope.",
        ]
    );
}

#[test]
fn globals_may_be_redeclared() {
    let outcome = common::run("var a = 1; var a = a + 1; print a;");

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.output, "2\n");
}

#[test]
fn bare_return_is_allowed_in_initializer() {
    let outcome = common::run("class A { init() { return; } } print A();");

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.output, "A instance\n");
}

#[test]
fn closures_bind_to_the_scope_seen_at_resolution() {
    let source = r#"
var a = "global";
{
  fun showA() {
    print a;
  }

  showA();
  var a = "block";
  showA();
}
"#;
    let outcome = common::run(source);

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.lines(), vec!["global", "global"]);
}

#[test]
fn parse_errors_skip_resolution() {
    let outcome = common::run("var = 1;\nreturn 2;");

    assert_eq!(
        outcome.errors,
        vec!["[line 1] Error at '=': Expect variable name."]
    );
}

#[test]
fn redeclared_local_still_checks_its_initializer() {
    let outcome = common::run("{ var a = 1; var a = a; }");

    assert_eq!(
        outcome.errors,
        vec![
            "[line 1] Error at 'a': Already a variable with this name in this scope.",
            "[line 1] Error at 'a': Can't read local variable in its own initializer.",
        ]
    );
}
