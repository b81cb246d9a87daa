use std::fmt::Display;
use std::rc::Rc;

use crate::token::Token;

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            statements: Vec::new(),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", join_statements(&self.statements))
    }
}

/// Statements are joined with "; " so that multiple expression statements
/// survive a print/re-parse cycle (without the separator, `(3 + 4)`
/// followed by `(-5)` would re-parse as a call).
fn join_statements(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|stmt| stmt.to_string())
        .collect::<Vec<String>>()
        .join("; ")
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Let {
        /// The name/identifier of the variable
        name: IdentifierLiteral,
        /// The value being bound
        value: Expression,
    },
    Return {
        /// The value being returned
        value: Expression,
    },
    Expression {
        /// The expression for this statement
        expression: Expression,
    },
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;

        match self {
            Let { name, value } => write!(
                f,
                "{tok} {ident} = {val}",
                tok = Token::Let,
                ident = name,
                val = value
            ),
            Return { value } => write!(f, "{} {}", Token::Return, value),
            Expression { expression } => write!(f, "{}", expression),
        }
    }
}

/// A braced sequence of statements. Only ever appears as the consequence
/// or alternative of an `if` and as a function or macro body.
#[derive(Debug, PartialEq, Clone)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", join_statements(&self.statements))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    // Literal
    Identifier(IdentifierLiteral),
    Integer(i64),
    String(String),
    Boolean(bool),

    // Complex
    Prefix(Box<PrefixExpression>),
    Infix(Box<InfixExpression>),
    If(Box<IfExpression>),
    Function(Box<FunctionLiteral>),
    Macro(Box<MacroLiteral>),
    Call(Box<CallExpression>),
    Array(Box<ArrayLiteral>),
    Hash(Box<HashLiteral>),
    Index(Box<IndexExpression>),
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;

        match self {
            Identifier(name) => write!(f, "{}", name),
            Integer(value) => write!(f, "{}", value),
            String(value) => write!(f, "\"{}\"", value),
            Boolean(value) => write!(f, "{}", value),

            Prefix(prefix) => write!(f, "{}", prefix),
            Infix(infix) => write!(f, "{}", infix),
            If(if_exp) => write!(f, "{}", if_exp),
            Function(func) => write!(f, "{}", func),
            Macro(mac) => write!(f, "{}", mac),
            Call(call) => write!(f, "{}", call),
            Array(arr) => write!(f, "{}", arr),
            Hash(hash) => write!(f, "{}", hash),
            Index(index) => write!(f, "{}", index),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IdentifierLiteral {
    pub name: String,
}

impl Display for IdentifierLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for IdentifierLiteral {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl From<String> for IdentifierLiteral {
    fn from(name: String) -> Self {
        Self { name }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct PrefixExpression {
    pub operator: Token,
    pub right: Expression,
}

impl Display for PrefixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({op}{r})", op = self.operator, r = self.right)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct InfixExpression {
    pub left: Expression,
    pub operator: Token,
    pub right: Expression,
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({l} {op} {r})",
            l = self.left,
            op = self.operator,
            r = self.right
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IfExpression {
    pub condition: Expression,
    /// Block if condition is truthy
    pub consequence: BlockStatement,
    /// Block if condition is falsy, if present
    pub alternative: Option<BlockStatement>,
}

impl Display for IfExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "if ({}) {{ {} }}",
            self.condition, self.consequence
        )?;

        if let Some(ref alt) = self.alternative {
            write!(f, " else {{ {} }}", alt)?;
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionLiteral {
    /// Parameter identifiers
    pub parameters: Vec<IdentifierLiteral>,
    /// Shared with the function objects that close over it at runtime
    pub body: Rc<BlockStatement>,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) {{ {} }}",
            Token::Fn,
            join_parameters(&self.parameters),
            self.body
        )
    }
}

/// Same shape as a function literal; only the introducing keyword and the
/// expansion-time semantics differ.
#[derive(Debug, PartialEq, Clone)]
pub struct MacroLiteral {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockStatement>,
}

impl Display for MacroLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) {{ {} }}",
            Token::Macro,
            join_parameters(&self.parameters),
            self.body
        )
    }
}

fn join_parameters(parameters: &[IdentifierLiteral]) -> String {
    parameters
        .iter()
        .map(|ident| ident.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

#[derive(Debug, PartialEq, Clone)]
pub struct CallExpression {
    pub function: Expression,
    pub arguments: Vec<Expression>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({})",
            self.function,
            self.arguments
                .iter()
                .map(|arg| arg.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}]",
            self.elements
                .iter()
                .map(|el| el.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

/// Key/value pairs in source order. Keys are arbitrary expressions here;
/// hashability is a runtime question.
#[derive(Debug, PartialEq, Clone)]
pub struct HashLiteral {
    pub pairs: Vec<(Expression, Expression)>,
}

impl Display for HashLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.pairs
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IndexExpression {
    pub left: Expression,
    pub index: Expression,
}

impl Display for IndexExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expression, IdentifierLiteral, Program, Statement};

    #[test]
    fn test_display_program() {
        let program = Program {
            statements: vec![
                Statement::Let {
                    name: IdentifierLiteral::from("myVar"),
                    value: Expression::Identifier(IdentifierLiteral::from("anotherVar")),
                },
                Statement::Return {
                    value: Expression::Integer(5),
                },
            ],
        };

        assert_eq!(program.to_string(), "let myVar = anotherVar; return 5")
    }

    #[test]
    fn test_display_string_requotes() {
        let expr = Expression::String("hello world".to_string());
        assert_eq!(expr.to_string(), "\"hello world\"");
    }
}
