//! Two-phase macro expansion, run on a parsed program before evaluation.

use std::cell::RefCell;
use std::rc::Rc;

use saki_parser::ast::{CallExpression, Expression, Program, Statement};
use saki_parser::modify;

use crate::environment::Environment;
use crate::evaluator::Evaluator;
use crate::object::{Macro, Object};

/// Phase 1: find top-level `let NAME = macro(...) { ... }` statements,
/// bind each macro in `env`, and strip the definitions out of the
/// program so they are never evaluated.
pub fn define_macros(program: &mut Program, env: &Rc<RefCell<Environment>>) {
    let statements = std::mem::take(&mut program.statements);

    for statement in statements {
        if is_macro_definition(&statement) {
            add_macro(statement, env);
        } else {
            program.statements.push(statement);
        }
    }
}

fn is_macro_definition(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::Let {
            value: Expression::Macro(_),
            ..
        }
    )
}

fn add_macro(statement: Statement, env: &Rc<RefCell<Environment>>) {
    if let Statement::Let {
        name,
        value: Expression::Macro(literal),
    } = statement
    {
        let mac = Object::Macro(Macro {
            parameters: literal.parameters,
            body: literal.body,
            env: Rc::clone(env),
        });
        env.borrow_mut().define(name.name, Rc::new(mac));
    }
}

/// Phase 2: rewrite every call whose callee names a macro bound in `env`.
/// The macro body is evaluated over the *unevaluated* argument ASTs, each
/// wrapped in a Quote; the Quote the body returns replaces the call site.
pub fn expand_macros(program: Program, env: &Rc<RefCell<Environment>>) -> Program {
    modify::modify_program(program, &mut |node| {
        let call = match &node {
            Expression::Call(call) => call,
            _ => return node,
        };

        let obj = match macro_for_call(call, env) {
            Some(obj) => obj,
            None => return node,
        };

        let mac = match obj.as_ref() {
            Object::Macro(mac) => mac,
            _ => unreachable!("macro_for_call only returns macros"),
        };

        let mut expand_env = Environment::new_enclosed(Rc::clone(&mac.env));
        for (param, arg) in mac.parameters.iter().zip(call.arguments.iter()) {
            expand_env.define(
                param.name.clone(),
                Rc::new(Object::Quote(arg.clone())),
            );
        }

        let mut evaluator = Evaluator::new_with_env(Rc::new(RefCell::new(expand_env)));
        let evaluated = evaluator.eval_block_statement(&mac.body);

        match evaluated.as_ref() {
            Object::Quote(quoted) => quoted.clone(),
            _ => panic!("we only support returning AST-nodes from macros"),
        }
    })
}

fn macro_for_call(call: &CallExpression, env: &Rc<RefCell<Environment>>) -> Option<Rc<Object>> {
    let ident = match &call.function {
        Expression::Identifier(ident) => ident,
        _ => return None,
    };

    let obj = env.borrow().get(&ident.name)?;

    match obj.as_ref() {
        Object::Macro(_) => Some(obj),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::environment::Environment;
    use crate::macros::{define_macros, expand_macros};
    use crate::object::Object;

    use saki_parser::{ast::Program, lexer::Lexer, parser::Parser};

    #[test]
    fn test_define_macros() {
        let input = "
            let number = 1;
            let function = fn(x, y) { x + y };
            let mymacro = macro(x, y) { x + y; };
        ";

        let env = Rc::new(RefCell::new(Environment::new()));
        let mut program = parse(input);

        define_macros(&mut program, &env);

        // Only the macro definition is stripped
        assert_eq!(program.statements.len(), 2);

        assert!(env.borrow().get("number").is_none());
        assert!(env.borrow().get("function").is_none());

        let mac = env
            .borrow()
            .get("mymacro")
            .expect("macro not in environment");
        match mac.as_ref() {
            Object::Macro(mac) => {
                assert_eq!(mac.parameters.len(), 2);
                assert_eq!(mac.parameters[0].name, "x");
                assert_eq!(mac.parameters[1].name, "y");
                assert_eq!(mac.body.to_string(), "(x + y)");
            }
            obj => panic!("expected macro object but got {}", obj),
        }
    }

    #[test]
    fn test_expand_macros() {
        // Tests: (input, expected program string after expansion)
        let tests = vec![
            (
                "
                let infixExpression = macro() { quote(1 + 2); };
                infixExpression();
                ",
                "(1 + 2)",
            ),
            (
                "
                let reverse = macro(a, b) { quote(unquote(b) - unquote(a)); };
                reverse(2 + 2, 10 - 5);
                ",
                "((10 - 5) - (2 + 2))",
            ),
            (
                "
                let unless = macro(condition, consequence, alternative) {
                    quote(if (!(unquote(condition))) {
                        unquote(consequence);
                    } else {
                        unquote(alternative);
                    });
                };

                unless(10 > 5, puts(\"not greater\"), puts(\"greater\"));
                ",
                "if ((!(10 > 5))) { puts(\"not greater\") } else { puts(\"greater\") }",
            ),
        ];

        for (input, expected) in tests {
            let env = Rc::new(RefCell::new(Environment::new()));
            let mut program = parse(input);

            define_macros(&mut program, &env);
            let expanded = expand_macros(program, &env);

            assert_eq!(expanded.to_string(), expected);
        }
    }

    #[test]
    fn macros_expand_before_evaluation() {
        use crate::evaluator::Evaluator;

        let input = "
            let unless = macro(cond, a, b) {
                quote(if (!(unquote(cond))) { unquote(a) } else { unquote(b) });
            };
            unless(1 > 2, \"big\", \"small\");
        ";

        let env = Rc::new(RefCell::new(Environment::new()));
        let mut program = parse(input);

        define_macros(&mut program, &env);
        let expanded = expand_macros(program, &env);

        let result = Evaluator::new().eval(expanded);
        assert_eq!(result.to_string(), "big");
    }

    fn parse(input: &str) -> Program {
        let l = Lexer::new(input);
        let mut p = Parser::new(l);

        match p.parse_program() {
            Ok(prog) => prog,
            Err(errors) => {
                println!("parser had {} errors", errors.len());
                for error in errors {
                    println!("parser error: {}", error);
                }
                panic!("parser errors")
            }
        }
    }
}
