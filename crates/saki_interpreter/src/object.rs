use std::{cell::RefCell, collections::HashMap, fmt::Display, hash::Hasher, rc::Rc};

use fnv::FnvHasher;

use crate::builtin;
use crate::environment::Environment;
use crate::error::RuntimeError;

use saki_parser::ast::{BlockStatement, Expression, IdentifierLiteral};

#[derive(Debug, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Array),
    Hash(Hash),
    Function(Function),
    Macro(Macro),
    Builtin(builtin::Builtin),
    /// Special object to encapsulate a return-ed value while it goes up scopes.
    /// This is never seen by the user.
    ReturnValue(Rc<Object>),
    Error(RuntimeError),
    /// An unevaluated expression captured by `quote`
    Quote(Expression),
}

impl Object {
    pub fn typename(&self) -> &'static str {
        use Object::*;

        match self {
            Integer(_) => "INTEGER",
            Boolean(_) => "BOOLEAN",
            String(_) => "STRING",
            Null => "NULL",
            Array(_) => "ARRAY",
            Hash(_) => "HASH",
            Function(_) => "FUNCTION",
            Macro(_) => "MACRO",
            Builtin(_) => "BUILTIN",
            ReturnValue(obj) => obj.typename(),
            Error(_) => "ERROR",
            Quote(_) => "QUOTE",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The hash-map key form of this value, if it is a legal key type.
    /// Integers contribute their bits, booleans 1 or 0, strings the
    /// FNV-1a 64 hash of their UTF-8 bytes.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => Some(HashKey {
                kind: self.typename(),
                value: *value as u64,
            }),
            Object::Boolean(value) => Some(HashKey {
                kind: self.typename(),
                value: u64::from(*value),
            }),
            Object::String(value) => {
                let mut hasher = FnvHasher::default();
                hasher.write(value.as_bytes());
                Some(HashKey {
                    kind: self.typename(),
                    value: hasher.finish(),
                })
            }
            _ => None,
        }
    }
}

impl Display for Object {
    /// The Inspect form shown to the programmer (e.g. by the REPL and by
    /// `puts`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Object::*;

        match self {
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            String(value) => write!(f, "{}", value),
            Null => write!(f, "null"),
            Array(array) => write!(f, "{}", array),
            Hash(hash) => write!(f, "{}", hash),
            Function(func) => write!(f, "{}", func),
            Macro(mac) => write!(f, "{}", mac),
            Builtin(_) => write!(f, "builtin function"),
            ReturnValue(obj) => write!(f, "{}", obj),
            Error(err) => write!(f, "ERROR: {}", err),
            Quote(node) => write!(f, "QUOTE({})", node),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Array {
    pub elements: Vec<Rc<Object>>,
}

impl Display for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let elements: Vec<String> = self.elements.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", elements.join(", "))
    }
}

/// Canonical key form: the value's type tag plus 64 derived bits.
/// Equality is structural, so equal keys written through different
/// expressions land on the same slot.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct HashKey {
    kind: &'static str,
    value: u64,
}

/// The stored pair keeps the original key object so Inspect can show it.
#[derive(Debug, PartialEq)]
pub struct HashPair {
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

#[derive(Debug, PartialEq)]
pub struct Hash {
    pub pairs: HashMap<HashKey, HashPair>,
}

impl Display for Hash {
    // Iteration order is whatever the map yields; callers must not rely
    // on it.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs: Vec<String> = self
            .pairs
            .values()
            .map(|pair| format!("{}: {}", pair.key, pair.value))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockStatement>,
    pub env: Rc<RefCell<Environment>>,
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();

        write!(f, "fn({}) {{\n{}\n}}", params.join(", "), self.body)
    }
}

impl PartialEq for Function {
    fn eq(&self, _: &Function) -> bool {
        // This should never be used?
        panic!("PartialEq is not implemented for `function`");
    }
}

#[derive(Debug)]
pub struct Macro {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockStatement>,
    pub env: Rc<RefCell<Environment>>,
}

impl Display for Macro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();

        write!(f, "macro({}) {{\n{}\n}}", params.join(", "), self.body)
    }
}

impl PartialEq for Macro {
    fn eq(&self, _: &Macro) -> bool {
        panic!("PartialEq is not implemented for `macro`");
    }
}

#[cfg(test)]
mod tests {
    use crate::object::Object;

    #[test]
    fn string_hash_keys() {
        let hello1 = Object::String("Hello World".to_owned());
        let hello2 = Object::String("Hello World".to_owned());
        let diff1 = Object::String("My name is johnny".to_owned());
        let diff2 = Object::String("My name is johnny".to_owned());

        assert_eq!(hello1.hash_key(), hello2.hash_key());
        assert_eq!(diff1.hash_key(), diff2.hash_key());
        assert_ne!(hello1.hash_key(), diff1.hash_key());
    }

    #[test]
    fn keys_do_not_collide_across_types() {
        assert_ne!(
            Object::Integer(1).hash_key(),
            Object::Boolean(true).hash_key()
        );
        assert_ne!(
            Object::Integer(0).hash_key(),
            Object::Boolean(false).hash_key()
        );
    }

    #[test]
    fn only_scalars_are_hashable() {
        assert!(Object::Integer(5).hash_key().is_some());
        assert!(Object::Boolean(false).hash_key().is_some());
        assert!(Object::String("x".to_owned()).hash_key().is_some());
        assert!(Object::Null.hash_key().is_none());
    }

    #[test]
    fn inspect_forms() {
        assert_eq!(Object::Integer(5).to_string(), "5");
        assert_eq!(Object::Boolean(true).to_string(), "true");
        assert_eq!(Object::String("hi".to_owned()).to_string(), "hi");
        assert_eq!(Object::Null.to_string(), "null");
    }
}
