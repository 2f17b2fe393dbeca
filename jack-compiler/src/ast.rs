//! Abstract syntax tree for the Jack language.
//!
//! Every node owns its children exclusively; the only cross-references are
//! by-name class lookups resolved during semantic analysis. Expressions are
//! a closed tagged union with explicit `Binary` nodes, folded
//! left-associatively by the parser (Jack has a single precedence class).

use crate::token::{Keyword, Span};

/// A parsed class: the top-level unit of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: String,
    pub var_decs: Vec<ClassVarDec>,
    pub subroutines: Vec<SubroutineDec>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassVarDec {
    pub kind: ClassVarKind,
    pub var_type: Type,
    pub names: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassVarKind {
    Static,
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Char,
    Boolean,
    ClassName(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubroutineDec {
    pub kind: SubroutineKind,
    pub return_type: ReturnType,
    pub name: String,
    /// `Class.name`, stamped by the parser once the class name is known.
    pub qualified_name: String,
    pub parameters: Vec<Parameter>,
    pub body: SubroutineBody,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(Type),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub var_type: Type,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubroutineBody {
    pub var_decs: Vec<VarDec>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDec {
    pub var_type: Type,
    pub names: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(LetStatement),
    If(IfStatement),
    While(WhileStatement),
    Do(DoStatement),
    Return(ReturnStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub var_name: String,
    /// Present for `let x[i] = ...` array assignment.
    pub index: Option<Expression>,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_statements: Vec<Statement>,
    pub else_statements: Option<Vec<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoStatement {
    pub call: SubroutineCall,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    IntegerLiteral(u16, Span),
    StringLiteral(String, Span),
    KeywordLiteral(KeywordLiteral, Span),
    /// A variable reference, with an array index when subscripted.
    Variable {
        name: String,
        index: Option<Box<Expression>>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },
    /// Both operands are always present; the parser folds `a op b op c`
    /// into `Binary(Binary(a, op, b), op, c)`.
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
        span: Span,
    },
    Call(SubroutineCall),
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::IntegerLiteral(_, span)
            | Expression::StringLiteral(_, span)
            | Expression::KeywordLiteral(_, span)
            | Expression::Variable { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. } => span,
            Expression::Call(call) => &call.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordLiteral {
    True,
    False,
    Null,
    This,
}

impl KeywordLiteral {
    pub fn from_keyword(kw: Keyword) -> Option<Self> {
        match kw {
            Keyword::True => Some(Self::True),
            Keyword::False => Some(Self::False),
            Keyword::Null => Some(Self::Null),
            Keyword::This => Some(Self::This),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Lt,
    Gt,
    Eq,
}

impl BinaryOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '&' => Some(Self::And),
            '|' => Some(Self::Or),
            '<' => Some(Self::Lt),
            '>' => Some(Self::Gt),
            '=' => Some(Self::Eq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(Self::Neg),
            '~' => Some(Self::Not),
            _ => None,
        }
    }
}

/// A subroutine call, either bare (`draw()`) or through a receiver
/// (`obj.move()`, `Math.abs()`). Which of instance/static dispatch the
/// receiver means is decided during semantic analysis, by name.
#[derive(Debug, Clone, PartialEq)]
pub struct SubroutineCall {
    pub receiver: Option<String>,
    pub name: String,
    pub arguments: Vec<Expression>,
    pub span: Span,
}
