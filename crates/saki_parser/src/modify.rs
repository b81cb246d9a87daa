//! Post-order AST rewriting, used by macro expansion to splice new
//! expressions into a parsed program.

use std::rc::Rc;

use crate::ast::{
    ArrayLiteral, BlockStatement, Expression, HashLiteral, IfExpression, IndexExpression,
    InfixExpression, PrefixExpression, Program, Statement,
};

/// Rewrite every expression in the program, children first. The modifier
/// sees each expression node after its children have already been
/// rewritten and returns the node's replacement (commonly the node
/// itself, untouched).
pub fn modify_program<F>(program: Program, modifier: &mut F) -> Program
where
    F: FnMut(Expression) -> Expression,
{
    Program {
        statements: program
            .statements
            .into_iter()
            .map(|stmt| modify_statement(stmt, modifier))
            .collect(),
    }
}

pub fn modify_statement<F>(statement: Statement, modifier: &mut F) -> Statement
where
    F: FnMut(Expression) -> Expression,
{
    match statement {
        Statement::Let { name, value } => Statement::Let {
            name,
            value: modify_expression(value, modifier),
        },
        Statement::Return { value } => Statement::Return {
            value: modify_expression(value, modifier),
        },
        Statement::Expression { expression } => Statement::Expression {
            expression: modify_expression(expression, modifier),
        },
    }
}

pub fn modify_block<F>(block: BlockStatement, modifier: &mut F) -> BlockStatement
where
    F: FnMut(Expression) -> Expression,
{
    BlockStatement {
        statements: block
            .statements
            .into_iter()
            .map(|stmt| modify_statement(stmt, modifier))
            .collect(),
    }
}

pub fn modify_expression<F>(expression: Expression, modifier: &mut F) -> Expression
where
    F: FnMut(Expression) -> Expression,
{
    let expression = match expression {
        Expression::Prefix(prefix) => {
            let PrefixExpression { operator, right } = *prefix;
            Expression::Prefix(Box::new(PrefixExpression {
                operator,
                right: modify_expression(right, modifier),
            }))
        }
        Expression::Infix(infix) => {
            let InfixExpression {
                left,
                operator,
                right,
            } = *infix;
            Expression::Infix(Box::new(InfixExpression {
                left: modify_expression(left, modifier),
                operator,
                right: modify_expression(right, modifier),
            }))
        }
        Expression::Index(index) => {
            let IndexExpression { left, index } = *index;
            Expression::Index(Box::new(IndexExpression {
                left: modify_expression(left, modifier),
                index: modify_expression(index, modifier),
            }))
        }
        Expression::If(if_expr) => {
            let IfExpression {
                condition,
                consequence,
                alternative,
            } = *if_expr;
            Expression::If(Box::new(IfExpression {
                condition: modify_expression(condition, modifier),
                consequence: modify_block(consequence, modifier),
                alternative: alternative.map(|alt| modify_block(alt, modifier)),
            }))
        }
        Expression::Function(mut func) => {
            func.body = Rc::new(modify_block(func.body.as_ref().clone(), modifier));
            Expression::Function(func)
        }
        Expression::Array(arr) => Expression::Array(Box::new(ArrayLiteral {
            elements: arr
                .elements
                .into_iter()
                .map(|el| modify_expression(el, modifier))
                .collect(),
        })),
        Expression::Hash(hash) => Expression::Hash(Box::new(HashLiteral {
            pairs: hash
                .pairs
                .into_iter()
                .map(|(key, value)| {
                    (
                        modify_expression(key, modifier),
                        modify_expression(value, modifier),
                    )
                })
                .collect(),
        })),
        // Call arguments are intentionally not traversed; the macro
        // expander inspects call nodes whole.
        other => other,
    };

    modifier(expression)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::ast::{
        ArrayLiteral, BlockStatement, Expression, FunctionLiteral, HashLiteral, IdentifierLiteral,
        IfExpression, IndexExpression, InfixExpression, PrefixExpression, Program, Statement,
    };
    use crate::modify::{modify_expression, modify_program};
    use crate::token::Token;

    fn one() -> Expression {
        Expression::Integer(1)
    }

    fn two() -> Expression {
        Expression::Integer(2)
    }

    fn turn_one_into_two(expr: Expression) -> Expression {
        match expr {
            Expression::Integer(1) => Expression::Integer(2),
            other => other,
        }
    }

    #[test]
    fn modify_program_statements() {
        let program = Program {
            statements: vec![
                Statement::Expression { expression: one() },
                Statement::Return { value: one() },
                Statement::Let {
                    name: IdentifierLiteral::from("x"),
                    value: one(),
                },
            ],
        };

        let modified = modify_program(program, &mut turn_one_into_two);

        assert_eq!(
            modified.statements,
            vec![
                Statement::Expression { expression: two() },
                Statement::Return { value: two() },
                Statement::Let {
                    name: IdentifierLiteral::from("x"),
                    value: two(),
                },
            ]
        );
    }

    #[test]
    fn modify_nested_expressions() {
        // Tests: (input, expected)
        let tests = vec![
            (
                Expression::Infix(Box::new(InfixExpression {
                    left: one(),
                    operator: Token::Plus,
                    right: two(),
                })),
                Expression::Infix(Box::new(InfixExpression {
                    left: two(),
                    operator: Token::Plus,
                    right: two(),
                })),
            ),
            (
                Expression::Infix(Box::new(InfixExpression {
                    left: two(),
                    operator: Token::Plus,
                    right: one(),
                })),
                Expression::Infix(Box::new(InfixExpression {
                    left: two(),
                    operator: Token::Plus,
                    right: two(),
                })),
            ),
            (
                Expression::Prefix(Box::new(PrefixExpression {
                    operator: Token::Minus,
                    right: one(),
                })),
                Expression::Prefix(Box::new(PrefixExpression {
                    operator: Token::Minus,
                    right: two(),
                })),
            ),
            (
                Expression::Index(Box::new(IndexExpression {
                    left: one(),
                    index: one(),
                })),
                Expression::Index(Box::new(IndexExpression {
                    left: two(),
                    index: two(),
                })),
            ),
            (
                Expression::Array(Box::new(ArrayLiteral {
                    elements: vec![one(), one()],
                })),
                Expression::Array(Box::new(ArrayLiteral {
                    elements: vec![two(), two()],
                })),
            ),
            (
                Expression::Hash(Box::new(HashLiteral {
                    pairs: vec![(one(), one())],
                })),
                Expression::Hash(Box::new(HashLiteral {
                    pairs: vec![(two(), two())],
                })),
            ),
        ];

        for (input, expected) in tests {
            let modified = modify_expression(input, &mut turn_one_into_two);
            assert_eq!(modified, expected);
        }
    }

    #[test]
    fn modify_if_expression() {
        let input = Expression::If(Box::new(IfExpression {
            condition: one(),
            consequence: BlockStatement {
                statements: vec![Statement::Expression { expression: one() }],
            },
            alternative: Some(BlockStatement {
                statements: vec![Statement::Expression { expression: one() }],
            }),
        }));

        let expected = Expression::If(Box::new(IfExpression {
            condition: two(),
            consequence: BlockStatement {
                statements: vec![Statement::Expression { expression: two() }],
            },
            alternative: Some(BlockStatement {
                statements: vec![Statement::Expression { expression: two() }],
            }),
        }));

        assert_eq!(modify_expression(input, &mut turn_one_into_two), expected);
    }

    #[test]
    fn modify_function_body() {
        let input = Expression::Function(Box::new(FunctionLiteral {
            parameters: vec![],
            body: Rc::new(BlockStatement {
                statements: vec![Statement::Expression { expression: one() }],
            }),
        }));

        let expected = Expression::Function(Box::new(FunctionLiteral {
            parameters: vec![],
            body: Rc::new(BlockStatement {
                statements: vec![Statement::Expression { expression: two() }],
            }),
        }));

        assert_eq!(modify_expression(input, &mut turn_one_into_two), expected);
    }
}
