//! Backend declarations
//!
//! Declarations are created as empty shells before any body is converted and
//! are filled in place afterwards. Every declaration has exactly one parent;
//! references to other declarations are arena ids, never ownership.

use crate::expr::{IrConst, IrExpr, IrStatement};
use crate::origin::{IrOrigin, SyntheticKind};
use crate::ty::IrType;
use crate::{IrClassId, IrFieldId, IrFunctionId, IrParamId, IrPropertyId};
use ql_intern::Name;
use ql_span::FileSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Object,
}

/// Member of a class or of the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrDeclaration {
    Class(IrClassId),
    Function(IrFunctionId),
    Property(IrPropertyId),
    Field(IrFieldId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrParent {
    Module,
    Class(IrClassId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Constructor { is_primary: bool },
    Simple,
}

impl FunctionKind {
    pub fn is_constructor(self) -> bool {
        matches!(self, Self::Constructor { .. })
    }

    pub fn is_primary_constructor(self) -> bool {
        matches!(self, Self::Constructor { is_primary: true })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrAnnotation {
    pub class: IrClassId,
    pub arguments: Vec<(Name, IrConst)>,
}

/// Body of a function-like declaration
#[derive(Debug, Clone, PartialEq)]
pub enum IrBody {
    Block(Vec<IrStatement>),
    /// Marker body the backend expands (enum `values`/`valueOf`)
    Synthetic(SyntheticKind),
}

impl IrBody {
    pub fn statements(&self) -> &[IrStatement] {
        match self {
            Self::Block(statements) => statements,
            Self::Synthetic(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrClass {
    pub name: Name,
    pub kind: ClassKind,
    pub visibility: Visibility,
    pub is_data: bool,
    pub is_value: bool,
    pub parent: IrParent,
    /// Members in declaration order, including synthesized ones
    pub declarations: Vec<IrDeclaration>,
    pub type_parameters: Vec<Name>,
    pub supertypes: Vec<IrType>,
    pub annotations: Vec<IrAnnotation>,
    pub origin: IrOrigin,
    pub span: FileSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    pub name: Name,
    pub kind: FunctionKind,
    pub visibility: Visibility,
    pub origin: IrOrigin,
    pub parent: IrParent,
    /// Class whose instance is `this` inside the body
    pub dispatch_receiver: Option<IrClassId>,
    pub type_parameters: Vec<Name>,
    pub value_parameters: Vec<IrParamId>,
    pub return_type: IrType,
    pub body: Option<IrBody>,
    /// Members this one directly overrides, deduplicated
    pub overridden: Vec<IrFunctionId>,
    pub annotations: Vec<IrAnnotation>,
    pub is_expect: bool,
    /// Property this function is an accessor of
    pub property: Option<IrPropertyId>,
    pub span: FileSpan,
}

impl IrFunction {
    pub fn is_accessor(&self) -> bool {
        self.property.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrProperty {
    pub name: Name,
    pub visibility: Visibility,
    pub parent: IrParent,
    pub is_var: bool,
    pub origin: IrOrigin,
    pub getter: Option<IrFunctionId>,
    pub setter: Option<IrFunctionId>,
    pub backing_field: Option<IrFieldId>,
    pub annotations: Vec<IrAnnotation>,
    pub span: FileSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrField {
    pub name: Name,
    pub ty: IrType,
    pub parent: IrParent,
    pub property: Option<IrPropertyId>,
    pub initializer: Option<IrExpr>,
    pub origin: IrOrigin,
    pub annotations: Vec<IrAnnotation>,
    pub span: FileSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrValueParameter {
    pub name: Name,
    /// Element type for `vararg` parameters
    pub ty: IrType,
    pub index: usize,
    pub default_value: Option<IrExpr>,
    pub is_vararg: bool,
    pub annotations: Vec<IrAnnotation>,
}

/// Local variable declared in a body
#[derive(Debug, Clone, PartialEq)]
pub struct IrVariable {
    pub name: Name,
    pub ty: IrType,
    pub is_var: bool,
}
