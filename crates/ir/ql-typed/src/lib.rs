//! Typed tree
//!
//! The typed tree is the output of the type checker: every declaration is
//! resolved, every expression carries enough information to compute its
//! type, and every reference points at a declaration id. Lowering reads it
//! but never mutates it.
//!
//! All nodes live in arenas owned by [`TypedTree`] and refer to each other
//! through `la-arena` indices.

pub mod builder;
pub mod decl;
pub mod expr;
pub mod ty;

pub use builder::TreeBuilder;
pub use decl::{
    AccessorKind, Annotation, AnnotationUseSite, ClassKind, ConstructorCallee, DeclOrigin,
    DelegatedConstructorCall, InterfaceDelegation, LocalVariable, MemberDecl, TypedAccessor,
    TypedClass, TypedConstructor, TypedFunction, TypedProperty, TypedTypeAlias,
    TypedValueParameter, Visibility,
};
pub use expr::{Argument, BinaryOp, Block, Constant, Expr, Stmt, ValueRef};
pub use ty::Type;

use la_arena::{Arena, Idx};
use ql_intern::{Interner, Name};
use rustc_hash::FxHashMap;

pub type ClassId = Idx<TypedClass>;
pub type ConstructorId = Idx<TypedConstructor>;
pub type FunctionId = Idx<TypedFunction>;
pub type PropertyId = Idx<TypedProperty>;
pub type TypeAliasId = Idx<TypedTypeAlias>;
pub type ParamId = Idx<TypedValueParameter>;
pub type LocalId = Idx<LocalVariable>;
pub type ExprId = Idx<Expr>;

/// A fully resolved compilation unit
#[derive(Debug, Default)]
pub struct TypedTree {
    pub classes: Arena<TypedClass>,
    pub constructors: Arena<TypedConstructor>,
    pub functions: Arena<TypedFunction>,
    pub properties: Arena<TypedProperty>,
    pub type_aliases: Arena<TypedTypeAlias>,
    pub parameters: Arena<TypedValueParameter>,
    pub locals: Arena<LocalVariable>,
    pub exprs: Arena<Expr>,
    /// Declarations at file level, in source order
    pub top_level: Vec<MemberDecl>,
    pub interner: Interner,
}

impl TypedTree {
    pub fn new(interner: Interner) -> Self {
        Self {
            interner,
            ..Self::default()
        }
    }

    pub fn name(&self, name: Name) -> &str {
        self.interner.resolve(name)
    }

    /// The primary constructor of `class`, if it declares one
    pub fn primary_constructor(&self, class: ClassId) -> Option<ConstructorId> {
        self.classes[class]
            .declarations
            .iter()
            .find_map(|decl| match *decl {
                MemberDecl::Constructor(ctor) if self.constructors[ctor].is_primary => Some(ctor),
                _ => None,
            })
    }

    /// Properties declared through primary-constructor parameters, in parameter order
    pub fn primary_properties(&self, class: ClassId) -> Vec<PropertyId> {
        let Some(primary) = self.primary_constructor(class) else {
            return Vec::new();
        };
        let by_param: FxHashMap<ParamId, PropertyId> = self.classes[class]
            .declarations
            .iter()
            .filter_map(|decl| match *decl {
                MemberDecl::Property(property) => self.properties[property]
                    .from_parameter
                    .map(|param| (param, property)),
                _ => None,
            })
            .collect();
        self.constructors[primary]
            .value_parameters
            .iter()
            .filter_map(|param| by_param.get(param).copied())
            .collect()
    }

    /// The type `class` has inside its own body: the class applied to its type parameters
    pub fn class_type(&self, class: ClassId) -> Type {
        Type::Class {
            class,
            arguments: self.classes[class]
                .type_parameters
                .iter()
                .map(|param| Type::TypeParameter(*param))
                .collect(),
            nullable: false,
        }
    }

    /// Follow the substitution-override chain to the constructor it was derived from
    pub fn deepest_overridden_constructor(&self, constructor: ConstructorId) -> ConstructorId {
        let mut current = constructor;
        while let Some(original) = self.constructors[current].original {
            if original == current {
                break;
            }
            current = original;
        }
        current
    }

    /// Expand type aliases until the outermost type is not an alias
    pub fn expand_type(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        while let Type::Alias { alias, arguments } = current {
            let alias = &self.type_aliases[alias];
            let substitution: FxHashMap<Name, Type> = alias
                .type_parameters
                .iter()
                .copied()
                .zip(arguments)
                .collect();
            current = alias.target.substitute(&substitution);
        }
        current
    }

    /// Whether `ty` names an enum class after alias expansion
    pub fn is_enum_type(&self, ty: &Type) -> bool {
        self.expand_type(ty)
            .class_id()
            .is_some_and(|class| self.classes[class].kind == ClassKind::Enum)
    }

    /// Type of an expression, as the checker resolved it
    pub fn type_of(&self, expr: ExprId) -> Type {
        match &self.exprs[expr] {
            Expr::Const { ty, .. } => ty.clone(),
            Expr::GetValue(ValueRef::Parameter(param)) => self.parameters[*param].ty.clone(),
            Expr::GetValue(ValueRef::Local(local)) => self.locals[*local].ty.clone(),
            Expr::This { class } => self.class_type(*class),
            Expr::GetProperty { property, .. } => self.properties[*property].ty.clone(),
            Expr::SetProperty { .. } => Type::Unit,
            Expr::Call { function, .. } => self.functions[*function].return_type.clone(),
            Expr::ConstructorCall { ty, .. } => ty.clone(),
            Expr::Binary { op, lhs, .. } => {
                if op.is_comparison() {
                    Type::Boolean
                } else {
                    self.type_of(*lhs)
                }
            }
            Expr::StringTemplate(_) => Type::String,
            Expr::Return(_) => Type::Nothing,
            Expr::Error { .. } => Type::Error,
        }
    }

    /// The class a member is declared in, for any member kind that has one
    pub fn owner_of(&self, decl: MemberDecl) -> Option<ClassId> {
        match decl {
            MemberDecl::Class(class) => self.classes[class].outer,
            MemberDecl::Constructor(ctor) => Some(self.constructors[ctor].owner),
            MemberDecl::Function(function) => self.functions[function].owner,
            MemberDecl::Property(property) => self.properties[property].owner,
            MemberDecl::TypeAlias(_) => None,
        }
    }
}
