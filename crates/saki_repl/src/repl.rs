use std::cell::RefCell;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::Editor;

use saki_interpreter::macros::{define_macros, expand_macros};
use saki_interpreter::{Environment, Evaluator};
use saki_parser::{lexer::Lexer, parser::Parser};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn repl() {
    println!("saki language v{}", VERSION);

    let env = Rc::new(RefCell::new(Environment::new()));
    // Macros live in their own environment so definitions never leak into
    // runtime lookups
    let macro_env = Rc::new(RefCell::new(Environment::new()));

    // `()` can be used when no completer is required
    let mut rl = Editor::<()>::new();
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                if line.trim() == ":q" {
                    println!("Bye bye!");
                    break;
                }
                // Skip empty lines
                else if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str());

                let l = Lexer::new(&line);
                let mut p = Parser::new(l);
                let prog = p.parse_program();

                match prog {
                    Ok(mut prog) => {
                        define_macros(&mut prog, &macro_env);
                        let prog = expand_macros(prog, &macro_env);

                        let mut e = Evaluator::new_with_env(Rc::clone(&env));
                        let result = e.eval(prog);

                        println!("{}", result);
                    }
                    Err(errors) => {
                        println!("Parser errors:");
                        for error in errors {
                            println!("\t{}", error);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
}
