//! Typed declarations

use crate::expr::{Argument, Block, Constant};
use crate::ty::Type;
use crate::{ClassId, ConstructorId, ExprId, FunctionId, ParamId, PropertyId, TypeAliasId};
use ql_intern::Name;
use ql_span::FileSpan;

/// Visibility modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
    /// Declared inside a function body
    Local,
}

/// Kind of class-like declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Object,
}

/// Where a declaration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclOrigin {
    /// Written in source
    Source,
    /// `componentN` member the checker added to a data class (1-based)
    DataComponent(u32),
    /// `copy` member the checker added to a data class
    DataCopy,
    /// `values()` member of an enum class
    EnumValues,
    /// `valueOf(String)` member of an enum class
    EnumValueOf,
}

/// A member of a class body or of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberDecl {
    Class(ClassId),
    Constructor(ConstructorId),
    Function(FunctionId),
    Property(PropertyId),
    TypeAlias(TypeAliasId),
}

/// Which accessor of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Getter,
    Setter,
}

/// Use-site target of an annotation (`@field:Ann`, `@get:Ann`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationUseSite {
    Property,
    Field,
    Getter,
    Setter,
    Param,
}

/// A resolved annotation application
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// The annotation class
    pub class: ClassId,
    /// Named constant arguments, in source order
    pub arguments: Vec<(Name, Constant)>,
    /// Explicit use-site target, if any
    pub use_site: Option<AnnotationUseSite>,
}

/// `Interface by expression` in a class header
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDelegation {
    pub interface: ClassId,
    pub delegate: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedClass {
    pub name: Name,
    pub kind: ClassKind,
    pub visibility: Visibility,
    pub is_data: bool,
    /// Value-wrapper class (`value class`)
    pub is_value: bool,
    pub type_parameters: Vec<Name>,
    pub supertypes: Vec<Type>,
    pub delegations: Vec<InterfaceDelegation>,
    /// Members in source order
    pub declarations: Vec<MemberDecl>,
    pub annotations: Vec<Annotation>,
    /// Enclosing class for nested and local classes
    pub outer: Option<ClassId>,
    pub span: FileSpan,
}

/// What a delegated constructor call refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorCallee {
    Resolved(ConstructorId),
    /// The checker could not resolve the callee; it reported the error itself
    Unresolved(Name),
}

/// `this(...)` or `super(...)` at the head of a constructor
#[derive(Debug, Clone, PartialEq)]
pub struct DelegatedConstructorCall {
    /// `this(...)` rather than `super(...)`
    pub is_this: bool,
    pub callee: ConstructorCallee,
    pub constructed_type: Type,
    /// Explicit outer instance for inner superclasses
    pub dispatch_receiver: Option<ExprId>,
    pub arguments: Vec<Argument>,
    pub span: FileSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedConstructor {
    pub owner: ClassId,
    pub is_primary: bool,
    pub visibility: Visibility,
    pub is_expect: bool,
    /// Type parameters the constructor carries (those of its class)
    pub type_parameters: Vec<Name>,
    pub value_parameters: Vec<ParamId>,
    pub return_type: Type,
    pub delegated_call: Option<DelegatedConstructorCall>,
    pub body: Option<Block>,
    pub annotations: Vec<Annotation>,
    /// Constructor this one was substituted from, for inherited generic constructors
    pub original: Option<ConstructorId>,
    pub span: FileSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedFunction {
    pub name: Name,
    pub owner: Option<ClassId>,
    pub visibility: Visibility,
    pub origin: DeclOrigin,
    pub is_expect: bool,
    pub is_abstract: bool,
    pub type_parameters: Vec<Name>,
    pub value_parameters: Vec<ParamId>,
    pub return_type: Type,
    pub body: Option<Block>,
    pub annotations: Vec<Annotation>,
    pub span: FileSpan,
}

/// Getter or setter of a property
#[derive(Debug, Clone, PartialEq)]
pub struct TypedAccessor {
    /// Compiler-default accessor with no source body
    pub is_default: bool,
    pub visibility: Visibility,
    pub value_parameters: Vec<ParamId>,
    pub body: Option<Block>,
    pub annotations: Vec<Annotation>,
    pub span: FileSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedProperty {
    pub name: Name,
    pub owner: Option<ClassId>,
    pub visibility: Visibility,
    pub ty: Type,
    pub is_var: bool,
    pub initializer: Option<ExprId>,
    /// Delegate expression of `val x by expr`
    pub delegate: Option<ExprId>,
    pub has_backing_field: bool,
    pub getter: Option<TypedAccessor>,
    pub setter: Option<TypedAccessor>,
    /// Primary-constructor parameter this property was declared through
    pub from_parameter: Option<ParamId>,
    pub annotations: Vec<Annotation>,
    pub span: FileSpan,
}

impl TypedProperty {
    pub fn accessor(&self, kind: AccessorKind) -> Option<&TypedAccessor> {
        match kind {
            AccessorKind::Getter => self.getter.as_ref(),
            AccessorKind::Setter => self.setter.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedValueParameter {
    pub name: Name,
    /// Element type for `vararg` parameters
    pub ty: Type,
    pub default_value: Option<ExprId>,
    pub is_vararg: bool,
    pub annotations: Vec<Annotation>,
    pub span: FileSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedTypeAlias {
    pub name: Name,
    pub type_parameters: Vec<Name>,
    pub target: Type,
    pub span: FileSpan,
}

/// `val`/`var` declared in a block
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    pub name: Name,
    pub ty: Type,
    pub is_var: bool,
}
