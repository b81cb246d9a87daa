use std::cell::RefCell;
use std::fs;
use std::process;
use std::rc::Rc;

use clap::Parser;

use saki_interpreter::macros::{define_macros, expand_macros};
use saki_interpreter::object::Object;
use saki_interpreter::{Environment, Evaluator};
use saki_parser::lexer::Lexer;

/// saki is a small, dynamically typed expression language with first-class
/// functions, closures, and quote/unquote macros.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script file to run; starts the interactive prompt when omitted.
    script: Option<String>,
}

fn main() {
    let args = Args::parse();

    match args.script {
        Some(path) => run_file(&path),
        None => saki_repl::repl(),
    }
}

fn run_file(path: &str) {
    let source = fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("failed to read '{}': {}", path, err);
        process::exit(1);
    });

    let lexer = Lexer::new(&source);
    let mut parser = saki_parser::parser::Parser::new(lexer);

    let mut program = match parser.parse_program() {
        Ok(program) => program,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            process::exit(1);
        }
    };

    let macro_env = Rc::new(RefCell::new(Environment::new()));
    define_macros(&mut program, &macro_env);
    let program = expand_macros(program, &macro_env);

    let env = Rc::new(RefCell::new(Environment::new()));
    let result = Evaluator::new_with_env(env).eval(program);

    if let Object::Error(_) = result.as_ref() {
        eprintln!("{}", result);
        process::exit(1);
    }
}
