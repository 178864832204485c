//! Backend expressions and statements

use crate::ty::IrType;
use crate::{IrClassId, IrFieldId, IrFunctionId, IrParamId, IrVariableId};

#[derive(Debug, Clone, PartialEq)]
pub enum IrConst {
    Int(i64),
    Boolean(bool),
    String(String),
    Null,
    Unit,
}

/// A value readable by name inside a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrValueRef {
    Parameter(IrParamId),
    Variable(IrVariableId),
    /// Dispatch receiver of the enclosing member of this class
    This(IrClassId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrBinaryOp {
    Add,
    Sub,
    Mul,
    EqEq,
    NotEq,
    Less,
    Greater,
    /// Reference identity
    Identity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOperator {
    InstanceOf,
    NotInstanceOf,
    Cast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    HashCode,
    ToString,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VarargElement {
    Element(IrExpr),
    Spread(IrExpr),
}

/// Call of a function or constructor
///
/// Argument slots are sized by the callee's parameter lists; an empty slot
/// means the callee's default is used.
#[derive(Debug, Clone, PartialEq)]
pub struct IrCall {
    pub callee: IrFunctionId,
    pub ty: IrType,
    pub type_arguments: Vec<Option<IrType>>,
    pub dispatch_receiver: Option<Box<IrExpr>>,
    pub arguments: Vec<Option<IrExpr>>,
}

impl IrCall {
    pub fn new(callee: IrFunctionId, ty: IrType, type_count: usize, value_count: usize) -> Self {
        Self {
            callee,
            ty,
            type_arguments: vec![None; type_count],
            dispatch_receiver: None,
            arguments: vec![None; value_count],
        }
    }

    /// Set type argument `index`; indices past the callee's type parameters are dropped
    pub fn put_type_argument(&mut self, index: usize, ty: IrType) -> bool {
        match self.type_arguments.get_mut(index) {
            Some(slot) => {
                *slot = Some(ty);
                true
            }
            None => false,
        }
    }

    /// Set value argument `index`; indices past the callee's parameters are dropped
    pub fn put_value_argument(&mut self, index: usize, value: IrExpr) -> bool {
        match self.arguments.get_mut(index) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn with_receiver(mut self, receiver: IrExpr) -> Self {
        self.dispatch_receiver = Some(Box::new(receiver));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrExpr {
    Const {
        value: IrConst,
        ty: IrType,
    },
    GetValue {
        value: IrValueRef,
        ty: IrType,
    },
    GetField {
        receiver: Option<Box<IrExpr>>,
        field: IrFieldId,
        ty: IrType,
    },
    SetField {
        receiver: Option<Box<IrExpr>>,
        field: IrFieldId,
        value: Box<IrExpr>,
    },
    Call(IrCall),
    ConstructorCall(IrCall),
    /// `this(...)`/`super(...)` at the head of a constructor
    DelegatingConstructorCall(IrCall),
    /// Delegation to an enum class constructor
    EnumConstructorCall(IrCall),
    /// Runs field initializers and init blocks of `class`
    InstanceInitializerCall {
        class: IrClassId,
    },
    Return {
        target: IrFunctionId,
        value: Box<IrExpr>,
    },
    Binary {
        op: IrBinaryOp,
        lhs: Box<IrExpr>,
        rhs: Box<IrExpr>,
        ty: IrType,
    },
    TypeOperator {
        op: TypeOperator,
        operand: Box<IrExpr>,
        type_operand: IrType,
    },
    If {
        condition: Box<IrExpr>,
        then_branch: Box<IrExpr>,
        else_branch: Option<Box<IrExpr>>,
        ty: IrType,
    },
    StringConcat(Vec<IrExpr>),
    Vararg {
        element_type: IrType,
        elements: Vec<VarargElement>,
    },
    Intrinsic {
        kind: Intrinsic,
        argument: Box<IrExpr>,
    },
    /// Placeholder for code the front end already reported as erroneous
    ErrorCall {
        description: String,
        ty: IrType,
    },
}

impl IrExpr {
    pub fn int(value: i64) -> Self {
        Self::Const {
            value: IrConst::Int(value),
            ty: IrType::Int,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self::Const {
            value: IrConst::Boolean(value),
            ty: IrType::Boolean,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Const {
            value: IrConst::String(value.into()),
            ty: IrType::String,
        }
    }

    pub fn unit() -> Self {
        Self::Const {
            value: IrConst::Unit,
            ty: IrType::Unit,
        }
    }

    pub fn ty(&self) -> IrType {
        match self {
            Self::Const { ty, .. }
            | Self::GetValue { ty, .. }
            | Self::GetField { ty, .. }
            | Self::Binary { ty, .. }
            | Self::If { ty, .. }
            | Self::ErrorCall { ty, .. } => ty.clone(),
            Self::Call(call) | Self::ConstructorCall(call) => call.ty.clone(),
            Self::SetField { .. }
            | Self::DelegatingConstructorCall(_)
            | Self::EnumConstructorCall(_)
            | Self::InstanceInitializerCall { .. } => IrType::Unit,
            Self::Return { .. } => IrType::Nothing,
            Self::TypeOperator {
                op: TypeOperator::Cast,
                type_operand,
                ..
            } => type_operand.clone(),
            Self::TypeOperator { .. } => IrType::Boolean,
            Self::StringConcat(_) => IrType::String,
            Self::Vararg { element_type, .. } => IrType::Array(Box::new(element_type.clone())),
            Self::Intrinsic {
                kind: Intrinsic::HashCode,
                ..
            } => IrType::Int,
            Self::Intrinsic {
                kind: Intrinsic::ToString,
                ..
            } => IrType::String,
        }
    }

    pub fn is_instance_initializer_call(&self) -> bool {
        matches!(self, Self::InstanceInitializerCall { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrStatement {
    Expr(IrExpr),
    Variable {
        variable: IrVariableId,
        initializer: Option<IrExpr>,
    },
}

impl IrStatement {
    pub fn as_expr(&self) -> Option<&IrExpr> {
        match self {
            Self::Expr(expr) => Some(expr),
            Self::Variable { .. } => None,
        }
    }
}
