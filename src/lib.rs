pub mod ast;
pub mod ast_printer;
pub mod class;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod function;
pub mod instance;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use log::info;

use diagnostics::Diagnostics;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;

/// Scan, parse, resolve and execute `source` against `interpreter`.
///
/// A static error in any phase stops the pipeline before execution.  The
/// first runtime error aborts the run; output printed before it stays
/// printed.  Check `diagnostics` afterwards for what went wrong.
pub fn run(source: &str, interpreter: &mut Interpreter, diagnostics: &mut Diagnostics) {
    let tokens = scanner::scan_tokens(source, diagnostics);

    let statements = Parser::new(&tokens, diagnostics).parse();
    if diagnostics.had_error() {
        info!("Static errors found, skipping resolution");
        return;
    }

    Resolver::new(interpreter, diagnostics).resolve(&statements);
    if diagnostics.had_error() {
        info!("Resolution errors found, skipping execution");
        return;
    }

    if let Err(e) = interpreter.interpret(&statements) {
        diagnostics.report_runtime(e);
    }
}
