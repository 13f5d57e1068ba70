use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::diagnostics::Diagnostics;
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::scanner::scan_tokens;
use rox::token::Token;

const EXIT_USAGE: i32 = 64;
const EXIT_STATIC: i32 = 65;
const EXIT_NO_INPUT: i32 = 66;
const EXIT_RUNTIME: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// Where log records go when --log is set
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the token stream as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },

    /// Reads and runs Lox one line at a time
    Repl,
}

/// Reads a source file, rejecting anything that is not UTF-8.
fn read_file(filename: &Path) -> rox::error::Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename)?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader.read_to_end(&mut buf)?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(String::from_utf8(buf)?)
}

/// Reads the source or exits with the no-input code.
fn read_source(filename: &Path) -> String {
    match read_file(filename) {
        Ok(source) => source,
        Err(e) => {
            debug!("Read failure: {:?}", e);
            eprintln!("Could not read {:?}: {}", filename, e);
            process::exit(EXIT_NO_INPUT);
        }
    }
}

fn init_logger(path: &Path) -> Result<()> {
    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

/// Seconds since the Unix epoch, backing the `clock()` native.
fn wall_clock() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn new_interpreter() -> Interpreter {
    Interpreter::new(Box::new(io::stdout()), wall_clock)
}

/// Print every collected diagnostic to stderr, in report order.
fn report(diagnostics: &Diagnostics) {
    for error in diagnostics.errors() {
        eprintln!("{}", error);
    }
}

fn exit_code(diagnostics: &Diagnostics) -> i32 {
    if diagnostics.had_error() {
        EXIT_STATIC
    } else if diagnostics.had_runtime_error() {
        EXIT_RUNTIME
    } else {
        0
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<i32> {
    info!("Running Tokenize subcommand");

    let source = read_source(filename);
    let mut diagnostics = Diagnostics::new();
    let tokens: Vec<Token> = scan_tokens(&source, &mut diagnostics);

    report(&diagnostics);

    if json {
        let rendered =
            serde_json::to_string_pretty(&tokens).context("Failed to serialise tokens")?;
        println!("{}", rendered);
    } else {
        for token in &tokens {
            debug!("Scanned token: {}", token);
            println!("{}", token);
        }
    }

    Ok(exit_code(&diagnostics))
}

fn parse(filename: &Path) -> Result<i32> {
    info!("Running Parse subcommand");

    let source = read_source(filename);
    let mut diagnostics = Diagnostics::new();
    let tokens = scan_tokens(&source, &mut diagnostics);
    let expr = Parser::new(&tokens, &mut diagnostics).parse_expression();

    report(&diagnostics);

    match expr {
        Some(expr) if !diagnostics.had_error() => {
            let ast_str = AstPrinter::print(&expr);
            debug!("AST: {}", ast_str);
            println!("{}", ast_str);
            Ok(0)
        }
        _ => Ok(EXIT_STATIC),
    }
}

fn evaluate(filename: &Path) -> Result<i32> {
    info!("Running Evaluate subcommand");

    let source = read_source(filename);
    let mut diagnostics = Diagnostics::new();
    let tokens = scan_tokens(&source, &mut diagnostics);
    let expr = Parser::new(&tokens, &mut diagnostics).parse_expression();

    let expr = match expr {
        Some(expr) if !diagnostics.had_error() => expr,
        _ => {
            report(&diagnostics);
            return Ok(EXIT_STATIC);
        }
    };

    let mut interpreter = new_interpreter();

    match interpreter.interpret_expression(&expr) {
        Ok(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", interpreter.stringify(&value));
            Ok(0)
        }
        Err(e) => {
            debug!("Evaluation debug: {}", e);
            eprintln!("{}", e);
            Ok(EXIT_RUNTIME)
        }
    }
}

fn run(filename: &Path) -> Result<i32> {
    info!("Running Run subcommand");

    let source = read_source(filename);
    debug!("Provided input:\n {}", source);

    let mut diagnostics = Diagnostics::new();
    let mut interpreter = new_interpreter();

    rox::run(&source, &mut interpreter, &mut diagnostics);
    report(&diagnostics);

    Ok(exit_code(&diagnostics))
}

fn repl() -> Result<i32> {
    info!("Starting REPL");

    let mut diagnostics = Diagnostics::new();
    let mut interpreter = new_interpreter();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            break;
        }

        rox::run(&line, &mut interpreter, &mut diagnostics);
        report(&diagnostics);
        diagnostics.clear();
    }

    info!("REPL finished");
    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            e.print().context("Failed to print usage")?;
            process::exit(code);
        }
    };

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger(&args.log_file)?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json)?,
        Commands::Parse { filename } => parse(filename)?,
        Commands::Evaluate { filename } => evaluate(filename)?,
        Commands::Run { filename } => run(filename)?,
        Commands::Repl => repl()?,
    };

    debug!("Exiting with code {}", code);

    if code != 0 {
        process::exit(code);
    }

    Ok(())
}
