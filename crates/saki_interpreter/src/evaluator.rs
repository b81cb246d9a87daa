use std::{cell::RefCell, convert::TryInto, rc::Rc};

use crate::builtin::Builtin;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::object::{Array, Function, Hash, HashPair, Macro, Object};

use saki_parser::ast::{BlockStatement, Expression, HashLiteral, Program, Statement};
use saki_parser::modify;
use saki_parser::token::Token;

pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())))
    }

    pub fn new_with_env(env: Rc<RefCell<Environment>>) -> Self {
        Evaluator { env }
    }

    pub fn eval(&mut self, prog: Program) -> Rc<Object> {
        let mut result = Rc::new(Object::Null);

        for stmt in &prog.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                // If a return value is found, immediately return and stop evaluating statements
                // Unwrap the return value into a final value so the program can use it
                Object::ReturnValue(inner_value) => return Rc::clone(inner_value),
                Object::Error(_) => return val,
                _ => result = val,
            }
        }

        result
    }

    // Similar to eval (for programs) but doesn't unwrap return values
    pub(crate) fn eval_block_statement(&mut self, block: &BlockStatement) -> Rc<Object> {
        let mut result = Rc::new(Object::Null);

        for stmt in &block.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                // If a return value is found, immediately return and stop evaluating statements
                // Don't unwrap the return value, we might be in a nested block which also needs to return
                Object::ReturnValue(_) => return val,
                Object::Error(_) => return val,
                _ => result = val,
            }
        }

        result
    }

    fn eval_statement(&mut self, stmt: &Statement) -> Rc<Object> {
        match stmt {
            Statement::Expression { expression } => self.eval_expression(expression),
            Statement::Return { value } => {
                let obj = self.eval_expression(value);

                // No need to encapsulate an Error with a ReturnValue since they both bubble up the same way
                if obj.is_error() {
                    return obj;
                }

                Rc::new(Object::ReturnValue(obj))
            }
            Statement::Let { name, value } => {
                let obj = self.eval_expression(value);
                // Early return the first error received
                if obj.is_error() {
                    return obj;
                }

                // Add the variable to the surrounding environment
                self.env.borrow_mut().define(name.name.clone(), obj);

                Rc::new(Object::Null)
            }
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> Rc<Object> {
        match expr {
            Expression::Integer(value) => Rc::new(Object::Integer(*value)),
            Expression::String(value) => Rc::new(Object::String(value.clone())),
            Expression::Boolean(value) => Rc::new(Object::Boolean(*value)),
            Expression::Identifier(identifier) => self.eval_identifier_expression(&identifier.name),

            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right);
                // Early return the first error received
                if right.is_error() {
                    return right;
                }
                self.eval_prefix_expression(&prefix.operator, right)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left);
                // Early return the first error received
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(&infix.right);
                // Early return the first error received
                if right.is_error() {
                    return right;
                }
                self.eval_infix_expression(&infix.operator, left, right)
            }

            Expression::If(if_expr) => self.eval_if_expression(
                &if_expr.condition,
                &if_expr.consequence,
                &if_expr.alternative,
            ),

            Expression::Array(arr) => {
                let elements = self.eval_expressions(&arr.elements);
                if elements.len() == 1 && elements.first().unwrap().is_error() {
                    return Rc::clone(elements.first().unwrap());
                }
                Rc::new(Object::Array(Array { elements }))
            }
            Expression::Hash(hash) => self.eval_hash_literal(hash),
            Expression::Index(expr) => {
                let left = self.eval_expression(&expr.left);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expression(&expr.index);
                if index.is_error() {
                    return index;
                }
                self.eval_index_expression(left, index)
            }

            Expression::Function(func) => Rc::new(Object::Function(Function {
                parameters: func.parameters.clone(),
                body: Rc::clone(&func.body),
                env: Rc::clone(&self.env),
            })),
            // A macro literal outside a definition evaluates like a
            // function literal; calling it is a `not a function` error
            Expression::Macro(mac) => Rc::new(Object::Macro(Macro {
                parameters: mac.parameters.clone(),
                body: Rc::clone(&mac.body),
                env: Rc::clone(&self.env),
            })),
            Expression::Call(call) => {
                // `quote` suppresses evaluation of its argument; it is
                // recognized by name, before the callee is looked up
                if let Expression::Identifier(ident) = &call.function {
                    if ident.name == "quote" {
                        if call.arguments.len() != 1 {
                            return Rc::new(Object::Error(
                                RuntimeError::WrongNumberOfArguments {
                                    want: 1,
                                    got: call.arguments.len(),
                                },
                            ));
                        }
                        return self.eval_quote(&call.arguments[0]);
                    }
                }

                let func = self.eval_expression(&call.function);
                // Early return the first error received
                if func.is_error() {
                    return func;
                }
                let args = self.eval_expressions(&call.arguments);
                if args.len() == 1 && args.first().unwrap().is_error() {
                    return Rc::clone(args.first().unwrap());
                }

                self.apply_function(func, args)
            }
        }
    }

    fn eval_expressions(&mut self, exprs: &[Expression]) -> Vec<Rc<Object>> {
        let mut result = Vec::new();
        for expr in exprs {
            let evaluated = self.eval_expression(expr);
            if evaluated.is_error() {
                return vec![evaluated];
            }
            result.push(evaluated);
        }
        result
    }

    fn eval_identifier_expression(&self, name: &str) -> Rc<Object> {
        let result = self.env.borrow().get(name);

        match result {
            Some(obj) => obj,
            // If we don't find the identifier, look it up as a builtin
            // NOTE: This means that builtins are not "in environment/scope" like other variables
            None => match Builtin::lookup(name) {
                Some(builtin) => Rc::new(Object::Builtin(builtin)),
                None => Rc::new(Object::Error(RuntimeError::IdentifierNotFound(
                    name.to_owned(),
                ))),
            },
        }
    }

    fn eval_prefix_expression(&self, operator: &Token, right: Rc<Object>) -> Rc<Object> {
        match operator {
            Token::Bang => self.eval_bang_operator_expression(right),
            Token::Minus => self.eval_minus_prefix_operator_expression(right),
            // NOTE: Evaluator incorrectly asked to evaluate given operator as a prefix
            _ => panic!("unknown prefix operator {}{:?}", operator, right),
        }
    }

    /// `!` treats its operand by truthiness: only `false` and `null`
    /// negate to `true`.
    fn eval_bang_operator_expression(&self, right: Rc<Object>) -> Rc<Object> {
        match right.as_ref() {
            Object::Boolean(true) => Rc::new(Object::Boolean(false)),
            Object::Boolean(false) => Rc::new(Object::Boolean(true)),
            Object::Null => Rc::new(Object::Boolean(true)),
            _ => Rc::new(Object::Boolean(false)),
        }
    }

    fn eval_minus_prefix_operator_expression(&self, right: Rc<Object>) -> Rc<Object> {
        match right.as_ref() {
            Object::Integer(value) => Rc::new(Object::Integer(value.wrapping_neg())),
            _ => Rc::new(Object::Error(RuntimeError::UnknownPrefixOperator(
                Token::Minus,
                right,
            ))),
        }
    }

    fn eval_infix_expression(
        &self,
        operator: &Token,
        left: Rc<Object>,
        right: Rc<Object>,
    ) -> Rc<Object> {
        if let (Object::Integer(left_value), Object::Integer(right_value)) =
            (left.as_ref(), right.as_ref())
        {
            return self.eval_integer_infix_expression(operator, *left_value, *right_value);
        }

        if let (Object::String(_), Object::String(_)) = (left.as_ref(), right.as_ref()) {
            return self.eval_string_infix_expression(operator, left, right);
        }

        if left.typename() != right.typename() {
            return Rc::new(Object::Error(RuntimeError::TypeMismatch(
                operator.clone(),
                left,
                right,
            )));
        }

        match operator {
            Token::EqualEqual => Rc::new(Object::Boolean(object_eq(&left, &right))),
            Token::BangEqual => Rc::new(Object::Boolean(!object_eq(&left, &right))),
            _ => Rc::new(Object::Error(RuntimeError::UnknownInfixOperator(
                operator.clone(),
                left,
                right,
            ))),
        }
    }

    fn eval_integer_infix_expression(
        &self,
        operator: &Token,
        left_value: i64,
        right_value: i64,
    ) -> Rc<Object> {
        match operator {
            Token::Plus => Rc::new(Object::Integer(left_value + right_value)),
            Token::Minus => Rc::new(Object::Integer(left_value - right_value)),
            Token::Star => Rc::new(Object::Integer(left_value * right_value)),
            Token::Slash => {
                if right_value == 0 {
                    return Rc::new(Object::Error(RuntimeError::DivisionByZero));
                }
                // wrapping: i64::MIN / -1 must not abort the interpreter
                Rc::new(Object::Integer(left_value.wrapping_div(right_value)))
            }

            Token::LessThan => Rc::new(Object::Boolean(left_value < right_value)),
            Token::LessEqual => Rc::new(Object::Boolean(left_value <= right_value)),
            Token::GreaterThan => Rc::new(Object::Boolean(left_value > right_value)),
            Token::GreaterEqual => Rc::new(Object::Boolean(left_value >= right_value)),
            Token::EqualEqual => Rc::new(Object::Boolean(left_value == right_value)),
            Token::BangEqual => Rc::new(Object::Boolean(left_value != right_value)),

            operator => Rc::new(Object::Error(RuntimeError::UnknownInfixOperator(
                operator.clone(),
                Rc::new(Object::Integer(left_value)),
                Rc::new(Object::Integer(right_value)),
            ))),
        }
    }

    fn eval_string_infix_expression(
        &self,
        operator: &Token,
        left: Rc<Object>,
        right: Rc<Object>,
    ) -> Rc<Object> {
        if let (Object::String(left_value), Object::String(right_value)) =
            (left.as_ref(), right.as_ref())
        {
            // Concatenation is the only string operator
            if *operator == Token::Plus {
                return Rc::new(Object::String(left_value.clone() + right_value));
            }
        }

        Rc::new(Object::Error(RuntimeError::UnknownInfixOperator(
            operator.clone(),
            left,
            right,
        )))
    }

    fn eval_index_expression(&mut self, left: Rc<Object>, index: Rc<Object>) -> Rc<Object> {
        match (left.as_ref(), index.as_ref()) {
            (Object::Array(arr), Object::Integer(i)) => {
                let length: i64 = arr.elements.len().try_into().unwrap();

                // Out of bounds (including negative) indexes quietly
                // produce null
                if *i < 0 || *i >= length {
                    return Rc::new(Object::Null);
                }

                Rc::clone(&arr.elements[*i as usize])
            }
            (Object::Hash(hash), _) => match index.hash_key() {
                Some(key) => match hash.pairs.get(&key) {
                    Some(pair) => Rc::clone(&pair.value),
                    None => Rc::new(Object::Null),
                },
                None => Rc::new(Object::Error(RuntimeError::UnusableHashKey(index))),
            },
            _ => Rc::new(Object::Error(RuntimeError::IndexNotSupported(left))),
        }
    }

    fn eval_hash_literal(&mut self, hash: &HashLiteral) -> Rc<Object> {
        let mut pairs = std::collections::HashMap::new();

        for (key_expr, value_expr) in &hash.pairs {
            let key = self.eval_expression(key_expr);
            if key.is_error() {
                return key;
            }

            let hash_key = match key.hash_key() {
                Some(hash_key) => hash_key,
                None => return Rc::new(Object::Error(RuntimeError::UnusableHashKey(key))),
            };

            let value = self.eval_expression(value_expr);
            if value.is_error() {
                return value;
            }

            pairs.insert(hash_key, HashPair { key, value });
        }

        Rc::new(Object::Hash(Hash { pairs }))
    }

    fn eval_if_expression(
        &mut self,
        condition: &Expression,
        consequence: &BlockStatement,
        alternative: &Option<BlockStatement>,
    ) -> Rc<Object> {
        let evaluated_condition = self.eval_expression(condition);
        // Early return the first error received
        if evaluated_condition.is_error() {
            return evaluated_condition;
        }

        if is_truthy(&evaluated_condition) {
            self.eval_block_statement(consequence)
        } else if let Some(alternative) = alternative {
            self.eval_block_statement(alternative)
        } else {
            Rc::new(Object::Null)
        }
    }

    fn apply_function(&mut self, func: Rc<Object>, args: Vec<Rc<Object>>) -> Rc<Object> {
        match func.as_ref() {
            Object::Function(function) => {
                // Check that number of args & params matches
                if args.len() != function.parameters.len() {
                    return Rc::new(Object::Error(RuntimeError::WrongNumberOfArguments {
                        want: function.parameters.len(),
                        got: args.len(),
                    }));
                }

                // Remember current environment (when exiting from call)
                let current_env = Rc::clone(&self.env);
                // Create a new scoped environment on top of the function's capture
                let mut scoped_env = Environment::new_enclosed(Rc::clone(&function.env));

                // Add arguments as variables in function's environment
                for (ident, obj) in function.parameters.iter().zip(args.iter()) {
                    scoped_env.define(ident.name.clone(), Rc::clone(obj));
                }

                self.env = Rc::new(RefCell::new(scoped_env));

                let result = self.eval_block_statement(&function.body);

                self.env = current_env;

                // A `return` ends this call; the marker must not leak out
                // into the caller's block
                match result.as_ref() {
                    Object::ReturnValue(inner) => Rc::clone(inner),
                    _ => result,
                }
            }
            // Builtins handle themselves
            Object::Builtin(builtin) => match builtin.apply(args) {
                Ok(obj) => obj,
                Err(err) => Rc::new(Object::Error(err)),
            },
            _ => Rc::new(Object::Error(RuntimeError::NotAFunction(func))),
        }
    }

    /// `quote(expr)`: replace `unquote(...)` calls inside the expression,
    /// then capture it unevaluated.
    fn eval_quote(&mut self, expr: &Expression) -> Rc<Object> {
        let node = self.eval_unquote_calls(expr.clone());
        Rc::new(Object::Quote(node))
    }

    fn eval_unquote_calls(&mut self, quoted: Expression) -> Expression {
        modify::modify_expression(quoted, &mut |node| {
            if let Expression::Call(call) = &node {
                if let Expression::Identifier(ident) = &call.function {
                    if ident.name == "unquote" && call.arguments.len() == 1 {
                        let unquoted = self.eval_expression(&call.arguments[0]);
                        return convert_object_to_expression(unquoted);
                    }
                }
            }
            node
        })
    }
}

fn is_truthy(obj: &Object) -> bool {
    !matches!(obj, Object::Null | Object::Boolean(false))
}

/// Equality for the `==`/`!=` arms that are not integer or string pairs:
/// booleans and null compare structurally, aggregates by identity.
fn object_eq(left: &Rc<Object>, right: &Rc<Object>) -> bool {
    match (left.as_ref(), right.as_ref()) {
        (Object::Boolean(left_value), Object::Boolean(right_value)) => left_value == right_value,
        (Object::Null, Object::Null) => true,
        _ => Rc::ptr_eq(left, right),
    }
}

/// Turn the result of an `unquote(...)` back into syntax. Only values
/// with a literal form (and quoted nodes, which splice) can go back into
/// the tree; anything else is an interpreter invariant violation.
fn convert_object_to_expression(obj: Rc<Object>) -> Expression {
    match obj.as_ref() {
        Object::Integer(value) => Expression::Integer(*value),
        Object::Boolean(value) => Expression::Boolean(*value),
        Object::Quote(node) => node.clone(),
        _ => panic!("cannot represent {} as an expression node", obj.typename()),
    }
}
