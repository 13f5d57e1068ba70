use pretty_assertions::assert_eq;
use rstest::rstest;

use rox::ast::{Expr, Stmt};
use rox::ast_printer::AstPrinter;
use rox::diagnostics::Diagnostics;
use rox::parser::Parser;
use rox::scanner::scan_tokens;
use rox::token::{Token, TokenType};

fn print_expression(source: &str) -> Result<String, Vec<String>> {
    let mut diagnostics = Diagnostics::new();
    let tokens = scan_tokens(source, &mut diagnostics);
    let expr = Parser::new(&tokens, &mut diagnostics).parse_expression();

    match expr {
        Some(expr) if !diagnostics.had_error() => Ok(AstPrinter::print(&expr)),
        _ => Err(diagnostics.messages()),
    }
}

fn parse_program(source: &str) -> (Vec<Stmt>, Vec<String>) {
    let mut diagnostics = Diagnostics::new();
    let tokens = scan_tokens(source, &mut diagnostics);
    let statements = Parser::new(&tokens, &mut diagnostics).parse();

    (statements, diagnostics.messages())
}

#[rstest]
#[case("2 + 3 * 4 - 5 / 2", "(- (+ 2.0 (* 3.0 4.0)) (/ 5.0 2.0))")]
#[case("(1+2)", "(group (+ 1.0 2.0))")]
#[case("98.6", "98.6")]
#[case("\"hello\" == \"world\"", "(== hello world)")]
#[case("!true", "(! true)")]
#[case("-(-5)", "(- (group (- 5.0)))")]
#[case("1 - 2 - 3", "(- (- 1.0 2.0) 3.0)")]
#[case("1 < 2 != false", "(!= (< 1.0 2.0) false)")]
#[case("nil or 1 and 2", "(or nil (and 1.0 2.0))")]
#[case("a = b = c", "(= a (= b c))")]
#[case("foo.bar(1, 2)(3)", "(call (call (. foo bar) 1.0 2.0) 3.0)")]
#[case("a.b.c = 4", "(= (. (. a b) c) 4.0)")]
fn expressions_print_in_prefix_form(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(print_expression(source), Ok(expected.to_string()));
}

#[rstest]
#[case("(72 +", "[line 1] Error at end: Expect expression.")]
#[case("(1 + 2", "[line 1] Error at end: Expect ')' after expression.")]
#[case("1 +\n*", "[line 2] Error at '*': Expect expression.")]
fn malformed_expressions_are_reported(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(print_expression(source), Err(vec![expected.to_string()]));
}

#[rstest]
#[case("print 1", "[line 1] Error at end: Expect ';' after value.")]
#[case("var 1 = 2;", "[line 1] Error at '1': Expect variable name.")]
#[case("1 = 2;", "[line 1] Error at '=': Invalid assignment target.")]
#[case("if 1 print 2;", "[line 1] Error at '1': Expect '(' after 'if'.")]
#[case("{ print 1;", "[line 1] Error at end: Expect '}' after block.")]
#[case("fun (a) {}", "[line 1] Error at '(': Expect function name.")]
#[case("class A { m( {} }", "[line 1] Error at '{': Expect parameter name.")]
#[case("class A < {}", "[line 1] Error at '{': Expect superclass name.")]
#[case("super;", "[line 1] Error at ';': Expect '.' after 'super'.")]
#[case("a.;", "[line 1] Error at ';': Expect property name after '.'.")]
fn statement_errors_use_canonical_messages(#[case] source: &str, #[case] expected: &str) {
    let (_, errors) = parse_program(source);

    assert_eq!(errors, vec![expected.to_string()]);
}

#[test]
fn parser_synchronizes_and_keeps_going() {
    let (statements, errors) = parse_program("var = 1;\nprint 2;\nvar x = ;\nprint 3;");

    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '=': Expect variable name.",
            "[line 3] Error at ';': Expect expression.",
        ]
    );
    assert_eq!(statements.len(), 2);
    assert!(statements.iter().all(|s| matches!(s, Stmt::Print(_))));
}

#[test]
fn invalid_assignment_target_does_not_unwind() {
    let (statements, errors) = parse_program("1 + 2 = 3; print 4;");

    assert_eq!(errors, vec!["[line 1] Error at '=': Invalid assignment target."]);
    assert_eq!(statements.len(), 2);
}

#[test]
fn too_many_arguments_is_reported_once() {
    let arguments: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});", arguments.join(", "));

    let (statements, errors) = parse_program(&source);

    assert_eq!(
        errors,
        vec!["[line 1] Error at '255': Can't have more than 255 arguments."]
    );
    assert_eq!(statements.len(), 1);
}

#[test]
fn for_loop_desugars_into_block_and_while() {
    let (statements, errors) = parse_program("for (var i = 0; i < 3; i = i + 1) print i;");

    assert!(errors.is_empty());
    assert_eq!(statements.len(), 1);

    let Stmt::Block(outer) = &statements[0] else {
        panic!("expected a block, got {:?}", statements[0]);
    };
    assert!(matches!(outer[0], Stmt::Var { .. }));

    let Stmt::While { body, .. } = &outer[1] else {
        panic!("expected a while loop, got {:?}", outer[1]);
    };
    let Stmt::Block(inner) = body.as_ref() else {
        panic!("expected the body block, got {:?}", body);
    };
    assert!(matches!(inner[0], Stmt::Print(_)));
    assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
}

#[test]
fn class_with_superclass_and_methods() {
    let (statements, errors) =
        parse_program("class B < A { init(x) { this.x = x; } get() { return super.get(); } }");

    assert!(errors.is_empty());

    let Stmt::Class {
        name,
        superclass,
        methods,
    } = &statements[0]
    else {
        panic!("expected a class, got {:?}", statements[0]);
    };

    assert_eq!(name.lexeme, "B");
    assert!(matches!(superclass, Some(Expr::Variable { name, .. }) if name.lexeme == "A"));

    let names: Vec<&str> = methods.iter().map(|m| m.name.lexeme.as_str()).collect();
    assert_eq!(names, vec!["init", "get"]);
    assert_eq!(methods[0].params.len(), 1);
}

#[test]
fn too_many_parameters_is_reported_at_the_extra_one() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));

    let (statements, errors) = parse_program(&source);

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'p255': Can't have more than 255 parameters."]
    );
    assert_eq!(statements.len(), 1);
}

#[test]
fn dangling_else_attaches_to_the_inner_if() {
    let (statements, errors) = parse_program("if (true) if (false) print 1; else print 2;");

    assert!(errors.is_empty());

    let Stmt::If {
        then_branch,
        else_branch: None,
        ..
    } = &statements[0]
    else {
        panic!("outer if should have no else, got {:?}", statements[0]);
    };
    assert!(matches!(
        then_branch.as_ref(),
        Stmt::If {
            else_branch: Some(_),
            ..
        }
    ));
}

#[test]
fn token_streams_without_eof_do_not_panic() {
    let mut diagnostics = Diagnostics::new();
    assert!(Parser::new(&[], &mut diagnostics).parse().is_empty());
    assert!(!diagnostics.had_error());
    assert!(Parser::new(&[], &mut diagnostics)
        .parse_expression()
        .is_none());
    assert_eq!(
        diagnostics.messages(),
        vec!["[line 1] Error at end: Expect expression."]
    );

    let tokens = vec![
        Token::new(TokenType::PRINT, "print", 3),
        Token::new(TokenType::NUMBER(1.0), "1", 3),
    ];
    let mut diagnostics = Diagnostics::new();
    let statements = Parser::new(&tokens, &mut diagnostics).parse();

    assert!(statements.is_empty());
    assert_eq!(
        diagnostics.messages(),
        vec!["[line 3] Error at end: Expect ';' after value."]
    );
}
