//! Backend IR
//!
//! The lower-level representation consumed by optimization and code
//! generation. Unlike the typed tree it is mutable: lowering allocates every
//! declaration as a shell first and then fills bodies, overrides, default
//! values and annotations in place.

pub mod decl;
pub mod dump;
pub mod expr;
pub mod origin;
pub mod ty;

pub use decl::{
    ClassKind, FunctionKind, IrAnnotation, IrBody, IrClass, IrDeclaration, IrField, IrFunction,
    IrParent, IrProperty, IrValueParameter, IrVariable, Visibility,
};
pub use dump::ModuleDump;
pub use expr::{
    Intrinsic, IrBinaryOp, IrCall, IrConst, IrExpr, IrStatement, IrValueRef, TypeOperator,
    VarargElement,
};
pub use origin::{IrOrigin, SyntheticKind};
pub use ty::IrType;

use la_arena::{Arena, Idx};
use ql_intern::{Interner, Name};

pub type IrClassId = Idx<IrClass>;
pub type IrFunctionId = Idx<IrFunction>;
pub type IrPropertyId = Idx<IrProperty>;
pub type IrFieldId = Idx<IrField>;
pub type IrParamId = Idx<IrValueParameter>;
pub type IrVariableId = Idx<IrVariable>;

/// A lowered compilation unit
#[derive(Debug, Default)]
pub struct IrModule {
    pub classes: Arena<IrClass>,
    pub functions: Arena<IrFunction>,
    pub properties: Arena<IrProperty>,
    pub fields: Arena<IrField>,
    pub parameters: Arena<IrValueParameter>,
    pub variables: Arena<IrVariable>,
    /// Module-level declarations in source order
    pub declarations: Vec<IrDeclaration>,
    pub interner: Interner,
}

impl IrModule {
    pub fn new(interner: Interner) -> Self {
        Self {
            interner,
            ..Self::default()
        }
    }

    pub fn name(&self, name: Name) -> &str {
        self.interner.resolve(name)
    }

    /// Append `declaration` to the member list of `parent`
    pub fn add_declaration(&mut self, parent: IrParent, declaration: IrDeclaration) {
        match parent {
            IrParent::Module => self.declarations.push(declaration),
            IrParent::Class(class) => self.classes[class].declarations.push(declaration),
        }
    }

    pub fn declarations_of(&self, parent: IrParent) -> &[IrDeclaration] {
        match parent {
            IrParent::Module => &self.declarations,
            IrParent::Class(class) => &self.classes[class].declarations,
        }
    }

    pub fn declaration_name(&self, declaration: IrDeclaration) -> Name {
        match declaration {
            IrDeclaration::Class(class) => self.classes[class].name,
            IrDeclaration::Function(function) => self.functions[function].name,
            IrDeclaration::Property(property) => self.properties[property].name,
            IrDeclaration::Field(field) => self.fields[field].name,
        }
    }

    /// First class named `name`, searching nested classes too
    pub fn find_class(&self, name: &str) -> Option<IrClassId> {
        let name = self.interner.get(name)?;
        self.classes
            .iter()
            .find(|(_, class)| class.name == name)
            .map(|(id, _)| id)
    }

    /// Simple functions of `class` named `name`, in declaration order
    pub fn functions_named(&self, class: IrClassId, name: &str) -> Vec<IrFunctionId> {
        let Some(name) = self.interner.get(name) else {
            return Vec::new();
        };
        self.classes[class]
            .declarations
            .iter()
            .filter_map(|declaration| match *declaration {
                IrDeclaration::Function(function)
                    if self.functions[function].name == name
                        && !self.functions[function].kind.is_constructor() =>
                {
                    Some(function)
                }
                _ => None,
            })
            .collect()
    }

    pub fn find_function(&self, class: IrClassId, name: &str) -> Option<IrFunctionId> {
        self.functions_named(class, name).into_iter().next()
    }

    pub fn find_property(&self, class: IrClassId, name: &str) -> Option<IrPropertyId> {
        let name = self.interner.get(name)?;
        self.classes[class]
            .declarations
            .iter()
            .find_map(|declaration| match *declaration {
                IrDeclaration::Property(property) if self.properties[property].name == name => {
                    Some(property)
                }
                _ => None,
            })
    }

    pub fn constructors(&self, class: IrClassId) -> Vec<IrFunctionId> {
        self.classes[class]
            .declarations
            .iter()
            .filter_map(|declaration| match *declaration {
                IrDeclaration::Function(function)
                    if self.functions[function].kind.is_constructor() =>
                {
                    Some(function)
                }
                _ => None,
            })
            .collect()
    }

    pub fn primary_constructor(&self, class: IrClassId) -> Option<IrFunctionId> {
        self.constructors(class)
            .into_iter()
            .find(|function| self.functions[*function].kind.is_primary_constructor())
    }

    /// `Class.member` for members, the bare name for module-level functions
    pub fn qualified_name(&self, function: IrFunctionId) -> String {
        let function = &self.functions[function];
        match function.parent {
            IrParent::Module => self.name(function.name).to_owned(),
            IrParent::Class(class) => format!(
                "{}.{}",
                self.name(self.classes[class].name),
                self.name(function.name)
            ),
        }
    }

    /// The type of `this` inside `class`
    pub fn this_type(&self, class: IrClassId) -> IrType {
        IrType::class(
            class,
            self.classes[class]
                .type_parameters
                .iter()
                .map(|param| IrType::TypeParameter(*param))
                .collect(),
        )
    }

    pub fn dump(&self) -> ModuleDump<'_> {
        ModuleDump::new(self)
    }
}
