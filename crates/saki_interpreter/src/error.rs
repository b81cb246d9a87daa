use std::{fmt::Display, rc::Rc};

use crate::builtin::Builtin;
use crate::object::Object;

use saki_parser::token::Token;

/// Runtime failures travel in-band as `Object::Error` values; the
/// evaluator propagates the first one it sees. The `Display` strings here
/// are the language's user-facing diagnostics and tests pin them.
#[derive(Debug, PartialEq)]
pub enum RuntimeError {
    /// When attempting a prefix operation on an invalid type (e.g. `-true`)
    UnknownPrefixOperator(Token, Rc<Object>),
    /// When an infix operator exists but does not apply to these (same-typed)
    /// operands (e.g. `true + false`)
    UnknownInfixOperator(Token, Rc<Object>, Rc<Object>),
    /// When infix operands have different types (e.g. `5 + true`)
    TypeMismatch(Token, Rc<Object>, Rc<Object>),
    DivisionByZero,
    /// When referencing an identifier that has not been defined
    IdentifierNotFound(String),
    /// When an object that is not a function is used with call syntax
    NotAFunction(Rc<Object>),
    /// When a call's argument count does not match what the callee expects
    WrongNumberOfArguments { want: usize, got: usize },
    /// When a builtin receives an argument of an unsupported type
    InvalidArgument(Builtin, Rc<Object>),
    /// When a hash key (in a literal or an index) is not a hashable type
    UnusableHashKey(Rc<Object>),
    /// When indexing an object that does not support it (e.g. `5[0]`)
    IndexNotSupported(Rc<Object>),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use RuntimeError::*;

        match self {
            UnknownPrefixOperator(operator, right) => {
                write!(f, "unknown operator: {}{}", operator, right.typename())
            }
            UnknownInfixOperator(operator, left, right) => write!(
                f,
                "unknown operator: {} {} {}",
                left.typename(),
                operator,
                right.typename()
            ),
            TypeMismatch(operator, left, right) => write!(
                f,
                "type mismatch: {} {} {}",
                left.typename(),
                operator,
                right.typename()
            ),
            DivisionByZero => write!(f, "division by zero"),
            IdentifierNotFound(name) => write!(f, "identifier not found: {}", name),
            NotAFunction(obj) => write!(f, "not a function: {}", obj.typename()),
            WrongNumberOfArguments { want, got } => {
                write!(f, "wrong number of arguments, got={}, want={}", got, want)
            }
            InvalidArgument(builtin, obj) => write!(
                f,
                "argument to `{}` not supported, got {}",
                builtin.name(),
                obj.typename()
            ),
            UnusableHashKey(obj) => write!(f, "unusable as hash key: {}", obj.typename()),
            IndexNotSupported(obj) => {
                write!(f, "index operator not supported: {}", obj.typename())
            }
        }
    }
}
