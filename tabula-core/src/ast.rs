//! Abstract syntax tree for the snippet language.
//!
//! A snippet is a single function definition. The parser produces a
//! [`FnDef`] whose body is a list of [`Statement`]s; the evaluator walks
//! these nodes directly, there is no lowering step.

use std::fmt;

/// The single callable a snippet must define: `fn answer(table) { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub name: String,
    pub param: String,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let name = expr;`
    Let { name: String, value: Expression },
    /// `name = expr;` rebinding an existing local
    Assign { name: String, value: Expression },
    /// `return expr;`
    Return(Expression),
    /// `if cond { ... } else { ... }`, else optional
    If {
        condition: Expression,
        then_block: Vec<Statement>,
        else_block: Option<Vec<Statement>>,
    },
    /// `while cond { ... }`
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    /// Bare expression, evaluated for effect
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Variable(String),
    /// `target[index]` — column lookup on a table, positional on a list
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    /// `target.method(args...)` against the builtin whitelist
    MethodCall {
        target: Box<Expression>,
        method: String,
        arguments: Vec<Expression>,
    },
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    List(Vec<Expression>),
    Map(Vec<(String, Expression)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    And,
    Or,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Not => write!(f, "!"),
        }
    }
}
