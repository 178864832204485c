//! Typed expressions and statement blocks

use crate::ty::Type;
use crate::{ClassId, ConstructorId, ExprId, FunctionId, LocalId, ParamId, PropertyId};
use ql_intern::Name;
use ql_span::FileSpan;

/// Compile-time constant
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Boolean(bool),
    String(String),
    Null,
    Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Eq,
    NotEq,
    Less,
    Greater,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Eq | Self::NotEq | Self::Less | Self::Greater)
    }
}

/// Reference to a value declared in an enclosing scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueRef {
    Parameter(ParamId),
    Local(LocalId),
}

/// Call argument as written at the call site
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// `name = value` arguments
    pub name: Option<Name>,
    pub value: ExprId,
    /// `*array` passed to a vararg parameter
    pub is_spread: bool,
}

impl Argument {
    pub fn positional(value: ExprId) -> Self {
        Self {
            name: None,
            value,
            is_spread: false,
        }
    }

    pub fn named(name: Name, value: ExprId) -> Self {
        Self {
            name: Some(name),
            value,
            is_spread: false,
        }
    }

    pub fn spread(value: ExprId) -> Self {
        Self {
            name: None,
            value,
            is_spread: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const {
        value: Constant,
        ty: Type,
    },
    GetValue(ValueRef),
    This {
        class: ClassId,
    },
    GetProperty {
        receiver: Option<ExprId>,
        property: PropertyId,
    },
    SetProperty {
        receiver: Option<ExprId>,
        property: PropertyId,
        value: ExprId,
    },
    Call {
        function: FunctionId,
        receiver: Option<ExprId>,
        arguments: Vec<Argument>,
    },
    ConstructorCall {
        constructor: ConstructorId,
        ty: Type,
        arguments: Vec<Argument>,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    StringTemplate(Vec<ExprId>),
    Return(Option<ExprId>),
    /// Erroneous code the checker already reported
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(ExprId),
    Local {
        local: LocalId,
        initializer: Option<ExprId>,
    },
}

/// Statement list of a function, constructor or accessor body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: FileSpan,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self {
            statements,
            span: FileSpan::default(),
        }
    }
}
