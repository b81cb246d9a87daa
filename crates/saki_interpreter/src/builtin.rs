use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::{Array, Object};

#[derive(Debug, PartialEq)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
    Puts,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            "first" => Some(Builtin::First),
            "last" => Some(Builtin::Last),
            "rest" => Some(Builtin::Rest),
            "push" => Some(Builtin::Push),
            "puts" => Some(Builtin::Puts),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
            Builtin::Puts => "puts",
        }
    }

    pub fn apply(&self, args: Vec<Rc<Object>>) -> Result<Rc<Object>, RuntimeError> {
        match self {
            Builtin::Len => {
                if args.len() != 1 {
                    return Err(RuntimeError::WrongNumberOfArguments {
                        want: 1,
                        got: args.len(),
                    });
                }

                let arg = Rc::clone(args.first().unwrap());
                match arg.as_ref() {
                    // Byte length, not character count
                    Object::String(value) => Ok(Rc::new(Object::Integer(value.len() as i64))),
                    Object::Array(arr) => Ok(Rc::new(Object::Integer(arr.elements.len() as i64))),
                    _ => Err(RuntimeError::InvalidArgument(Builtin::Len, arg)),
                }
            }
            Builtin::First => {
                if args.len() != 1 {
                    return Err(RuntimeError::WrongNumberOfArguments {
                        want: 1,
                        got: args.len(),
                    });
                }

                let arg = Rc::clone(args.first().unwrap());
                match arg.as_ref() {
                    Object::String(value) => Ok(match value.chars().next() {
                        Some(c) => Rc::new(Object::String(c.to_string())),
                        None => Rc::new(Object::Null),
                    }),
                    Object::Array(arr) => Ok(match arr.elements.first() {
                        Some(el) => Rc::clone(el),
                        None => Rc::new(Object::Null),
                    }),
                    _ => Err(RuntimeError::InvalidArgument(Builtin::First, arg)),
                }
            }
            Builtin::Last => {
                if args.len() != 1 {
                    return Err(RuntimeError::WrongNumberOfArguments {
                        want: 1,
                        got: args.len(),
                    });
                }

                let arg = Rc::clone(args.first().unwrap());
                match arg.as_ref() {
                    Object::String(value) => Ok(match value.chars().last() {
                        Some(c) => Rc::new(Object::String(c.to_string())),
                        None => Rc::new(Object::Null),
                    }),
                    Object::Array(arr) => Ok(match arr.elements.last() {
                        Some(el) => Rc::clone(el),
                        None => Rc::new(Object::Null),
                    }),
                    _ => Err(RuntimeError::InvalidArgument(Builtin::Last, arg)),
                }
            }
            Builtin::Rest => {
                if args.len() != 1 {
                    return Err(RuntimeError::WrongNumberOfArguments {
                        want: 1,
                        got: args.len(),
                    });
                }

                let arg = Rc::clone(args.first().unwrap());
                match arg.as_ref() {
                    Object::String(value) => {
                        if value.is_empty() {
                            Ok(Rc::new(Object::Null))
                        } else {
                            Ok(Rc::new(Object::String(value.chars().skip(1).collect())))
                        }
                    }
                    Object::Array(arr) => {
                        if arr.elements.is_empty() {
                            Ok(Rc::new(Object::Null))
                        } else {
                            // A fresh array; the source is untouched
                            let rest: Vec<Rc<Object>> =
                                arr.elements[1..].iter().map(Rc::clone).collect();
                            Ok(Rc::new(Object::Array(Array { elements: rest })))
                        }
                    }
                    _ => Err(RuntimeError::InvalidArgument(Builtin::Rest, arg)),
                }
            }
            Builtin::Push => {
                if args.len() != 2 {
                    return Err(RuntimeError::WrongNumberOfArguments {
                        want: 2,
                        got: args.len(),
                    });
                }

                let arg = Rc::clone(args.first().unwrap());
                match arg.as_ref() {
                    Object::Array(arr) => {
                        let mut elements: Vec<Rc<Object>> =
                            arr.elements.iter().map(Rc::clone).collect();
                        elements.push(Rc::clone(&args[1]));
                        Ok(Rc::new(Object::Array(Array { elements })))
                    }
                    _ => Err(RuntimeError::InvalidArgument(Builtin::Push, arg)),
                }
            }
            Builtin::Puts => {
                for arg in &args {
                    println!("{}", arg);
                }
                Ok(Rc::new(Object::Null))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::builtin::Builtin;
    use crate::error::RuntimeError;
    use crate::object::{Array, Object};

    #[test]
    fn push_does_not_mutate_the_source() {
        let source = Rc::new(Object::Array(Array {
            elements: vec![Rc::new(Object::Integer(1))],
        }));

        let pushed = Builtin::Push
            .apply(vec![Rc::clone(&source), Rc::new(Object::Integer(2))])
            .unwrap();

        assert_eq!(pushed.to_string(), "[1, 2]");
        assert_eq!(source.to_string(), "[1]");
    }

    #[test]
    fn rest_does_not_mutate_the_source() {
        let source = Rc::new(Object::Array(Array {
            elements: vec![Rc::new(Object::Integer(1)), Rc::new(Object::Integer(2))],
        }));

        let rest = Builtin::Rest.apply(vec![Rc::clone(&source)]).unwrap();

        assert_eq!(rest.to_string(), "[2]");
        assert_eq!(source.to_string(), "[1, 2]");
    }

    #[test]
    fn string_edges() {
        let empty = Rc::new(Object::String("".to_owned()));
        assert_eq!(
            Builtin::First.apply(vec![Rc::clone(&empty)]).unwrap(),
            Rc::new(Object::Null)
        );
        assert_eq!(
            Builtin::Last.apply(vec![Rc::clone(&empty)]).unwrap(),
            Rc::new(Object::Null)
        );
        assert_eq!(
            Builtin::Rest.apply(vec![empty]).unwrap(),
            Rc::new(Object::Null)
        );

        let one = Rc::new(Object::String("a".to_owned()));
        assert_eq!(
            Builtin::Rest.apply(vec![one]).unwrap(),
            Rc::new(Object::String("".to_owned()))
        );
    }

    #[test]
    fn arity_errors() {
        assert_eq!(
            Builtin::Len.apply(vec![]),
            Err(RuntimeError::WrongNumberOfArguments { want: 1, got: 0 })
        );
        assert_eq!(
            Builtin::Push.apply(vec![Rc::new(Object::Integer(1))]),
            Err(RuntimeError::WrongNumberOfArguments { want: 2, got: 1 })
        );
    }
}
